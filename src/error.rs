use crate::domain::envelope::Domain;
use crate::domain::gateway::GatewayFailure;
use crate::domain::transaction::TransactionKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PermitError {
    /// A field-level rule on the inbound request was violated.
    #[error("{domain}: {message}")]
    Validation { domain: Domain, message: String },
    /// A transaction with the same (transaction uuid, customer id) key already exists.
    #[error("{domain}: {message}")]
    Conflict { domain: Domain, message: String },
    /// A reference entity or a persisted record is missing.
    #[error("{domain}: {message}")]
    NotFound { domain: Domain, message: String },
    #[error("{domain}: {message}")]
    Forbidden { domain: Domain, message: String },
    /// A downstream service call failed or answered with a non-success status.
    ///
    /// `cause` is `None` when the call completed but the service rejected it.
    #[error("{domain}: {message}")]
    Downstream {
        domain: Domain,
        message: String,
        cause: Option<GatewayFailure>,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
}

impl PermitError {
    pub fn validation(domain: Domain, message: impl Into<String>) -> Self {
        Self::Validation {
            domain,
            message: message.into(),
        }
    }

    pub fn not_found(domain: Domain, message: impl Into<String>) -> Self {
        Self::NotFound {
            domain,
            message: message.into(),
        }
    }

    /// The conflict reported whenever a (transaction uuid, customer id) key is already taken.
    pub fn duplicate(key: &TransactionKey) -> Self {
        Self::Conflict {
            domain: Domain::Permit,
            message: format!(
                "transaction already exists for customer {}",
                key.customer_id
            ),
        }
    }

    pub fn downstream(
        domain: Domain,
        message: impl Into<String>,
        cause: Option<GatewayFailure>,
    ) -> Self {
        Self::Downstream {
            domain,
            message: message.into(),
            cause,
        }
    }

    /// The domain tag reported in the error envelope.
    pub fn domain(&self) -> Domain {
        match self {
            Self::Validation { domain, .. }
            | Self::Conflict { domain, .. }
            | Self::NotFound { domain, .. }
            | Self::Forbidden { domain, .. }
            | Self::Downstream { domain, .. } => *domain,
            _ => Domain::Permit,
        }
    }

    /// The human-readable message reported in the error envelope.
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::Conflict { message, .. }
            | Self::NotFound { message, .. }
            | Self::Forbidden { message, .. }
            | Self::Downstream { message, .. } => message.clone(),
            _ => "internal error".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PermitError>;
