//! Converts orchestrator outcomes into a status class plus a JSON body.

use crate::domain::envelope::{ObjectResponse, StatusEnvelope};
use crate::domain::payment::ThirdPartyPayment;
use crate::domain::transaction::PersistedTransaction;
use crate::error::PermitError;
use serde::{Deserialize, Serialize, Serializer};
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok,
    BadRequest,
    Forbidden,
    NotFound,
    InternalServerError,
}

impl HttpStatus {
    pub fn code(&self) -> u16 {
        match self {
            HttpStatus::Ok => 200,
            HttpStatus::BadRequest => 400,
            HttpStatus::Forbidden => 403,
            HttpStatus::NotFound => 404,
            HttpStatus::InternalServerError => 500,
        }
    }

    /// The status class an error is reported under.
    pub fn of(error: &PermitError) -> Self {
        match error {
            PermitError::Validation { .. }
            | PermitError::Conflict { .. }
            | PermitError::Downstream { .. } => HttpStatus::BadRequest,
            PermitError::NotFound { .. } => HttpStatus::NotFound,
            PermitError::Forbidden { .. } => HttpStatus::Forbidden,
            _ => HttpStatus::InternalServerError,
        }
    }
}

impl Serialize for HttpStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

/// Identity of a newly created transaction, returned on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCreated {
    pub id: u64,
    pub transaction_uuid: Uuid,
    pub customer_id: u32,
}

/// A persisted transaction, enriched with its recorded payments when available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    #[serde(flatten)]
    pub transaction: PersistedTransaction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<ThirdPartyPayment>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
}

impl<T> Page<T> {
    /// Slices one page out of `items`; a page past the end is empty.
    pub fn of(items: Vec<T>, request: PageRequest) -> Self {
        let total_elements = items.len();
        let size = request.size.max(1);
        let content = items
            .into_iter()
            .skip(request.page.saturating_mul(size))
            .take(size)
            .collect();
        Self {
            content,
            page: request.page,
            size,
            total_elements,
        }
    }
}

/// What a caller receives: a status class and an optional JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub http_status: HttpStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl Reply {
    /// `200` with `{status: SUCCESS, response: payload}`.
    pub fn ok<T: Serialize>(payload: T) -> Self {
        Self::json(HttpStatus::Ok, &ObjectResponse::ok(payload))
    }

    /// `200` with `payload` as the whole body.
    pub fn raw<T: Serialize>(payload: &T) -> Self {
        Self::json(HttpStatus::Ok, payload)
    }

    pub fn not_found() -> Self {
        Self {
            http_status: HttpStatus::NotFound,
            body: None,
        }
    }

    pub fn from_error(error: &PermitError) -> Self {
        let envelope = StatusEnvelope::failure(error.domain(), error.message());
        Self::json(HttpStatus::of(error), &ObjectResponse::<()>::failed(envelope))
    }

    fn json<T: Serialize>(http_status: HttpStatus, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self {
                http_status,
                body: Some(body),
            },
            Err(e) => {
                error!(error = %e, "Failed to serialize reply body");
                Self {
                    http_status: HttpStatus::InternalServerError,
                    body: None,
                }
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.http_status == HttpStatus::Ok
    }

    /// `status.responseStatus` of the body, if present.
    pub fn response_status(&self) -> Option<&str> {
        self.body.as_ref()?.pointer("/status/responseStatus")?.as_str()
    }

    /// `status.errors[0].identifier` of the body, if present.
    pub fn error_identifier(&self) -> Option<&str> {
        self.body
            .as_ref()?
            .pointer("/status/errors/0/identifier")?
            .as_str()
    }

    /// `status.errors[0].message` of the body, if present.
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .as_ref()?
            .pointer("/status/errors/0/message")?
            .as_str()
    }
}
