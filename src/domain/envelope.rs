use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier attached to every reported error, naming the owning domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Domain {
    Permit,
    Payment,
    Rate,
    Topology,
    Cps,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Permit => "PERMIT",
            Domain::Payment => "PAYMENT",
            Domain::Rate => "RATE",
            Domain::Topology => "TOPOLOGY",
            Domain::Cps => "CPS",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub identifier: Domain,
    pub message: String,
}

/// `{responseStatus, errors}` block carried under `status` in every reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEnvelope {
    pub response_status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
}

impl StatusEnvelope {
    pub fn success() -> Self {
        Self {
            response_status: ResponseStatus::Success,
            errors: Vec::new(),
        }
    }

    pub fn failure(identifier: Domain, message: impl Into<String>) -> Self {
        Self {
            response_status: ResponseStatus::Failure,
            errors: vec![ErrorDetail {
                identifier,
                message: message.into(),
            }],
        }
    }
}

/// Reply body: the status envelope plus an optional payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectResponse<T> {
    pub status: StatusEnvelope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<T>,
}

impl<T> ObjectResponse<T> {
    pub fn ok(response: T) -> Self {
        Self {
            status: StatusEnvelope::success(),
            response: Some(response),
        }
    }

    pub fn failed(status: StatusEnvelope) -> Self {
        Self {
            status,
            response: None,
        }
    }
}
