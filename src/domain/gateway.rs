//! Outcome types shared by every downstream gateway call.
//!
//! A gateway call either completes with a [`Remote`] answer (which may still
//! carry a non-success status) or fails with a [`GatewayFailure`]. Nothing is
//! signalled through panics or unwinding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a gateway call did not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayFailure {
    /// The call exceeded its time budget.
    Timeout(Duration),
    /// The circuit breaker rejected the call without invoking the service.
    CircuitOpen,
    Transport(String),
}

impl fmt::Display for GatewayFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayFailure::Timeout(after) => write!(f, "timed out after {}ms", after.as_millis()),
            GatewayFailure::CircuitOpen => f.write_str("circuit open"),
            GatewayFailure::Transport(reason) => write!(f, "transport error: {reason}"),
        }
    }
}

/// An answer from a downstream service: a status code and an optional body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remote<T> {
    pub status: u16,
    pub body: Option<T>,
}

impl<T> Remote<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub type GatewayResult<T> = std::result::Result<Remote<T>, GatewayFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_success_range() {
        assert!(Remote::ok(()).is_success());
        assert!(Remote::<()>::empty(204).is_success());
        assert!(!Remote::<()>::empty(400).is_success());
        assert!(!Remote::<()>::empty(503).is_success());
    }
}
