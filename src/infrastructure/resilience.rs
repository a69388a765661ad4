//! Timeout and circuit breaker guard for downstream gateways.
//!
//! [`Resilient`] wraps any gateway client and implements the same port, so
//! the orchestrator never sees the difference. A call is failed immediately
//! while the circuit is open; otherwise it runs under `tokio::time::timeout`.
//!
//! ```text
//!   CLOSED --(failure_threshold consecutive failures)--> OPEN
//!   OPEN   --(open_timeout elapsed, next call probes)--> HALF-OPEN
//!   HALF-OPEN --(probe succeeds)--> CLOSED
//!   HALF-OPEN --(probe fails)-----> OPEN
//! ```
//!
//! Only call failures (timeouts, transport errors) count against the circuit.
//! A completed call with a non-success status is a business answer.

use crate::domain::gateway::{GatewayFailure, GatewayResult};
use crate::domain::payment::{ThirdPartyPayment, ThirdPartyPaymentsList};
use crate::domain::ports::{
    LocationValidation, LocationValidationRequest, PaymentClient, RateClient, RateDetails,
    TopologyClient,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CircuitBreakerConfig {
    /// Consecutive call failures before the circuit opens.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a probe is allowed.
    pub open_timeout_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug)]
struct CircuitInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    name: &'static str,
    config: CircuitBreakerConfig,
    inner: Mutex<CircuitInner>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            name,
            config,
            inner: Mutex::new(CircuitInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Returns `false` while the circuit is open and the open timeout has not elapsed.
    pub fn should_allow(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let open_for = Duration::from_millis(self.config.open_timeout_ms);
                match inner.opened_at {
                    Some(opened_at) if opened_at.elapsed() < open_for => false,
                    _ => {
                        info!(gateway = self.name, "Circuit breaker transitioning to half-open");
                        inner.state = CircuitState::HalfOpen;
                        true
                    }
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        if inner.state != CircuitState::Closed {
            info!(gateway = self.name, "Circuit breaker closed");
        }
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures += 1;
        let trip = inner.state == CircuitState::HalfOpen
            || inner.consecutive_failures >= self.config.failure_threshold;
        if trip && inner.state != CircuitState::Open {
            warn!(
                gateway = self.name,
                failures = inner.consecutive_failures,
                "Circuit breaker opened"
            );
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
        }
    }

    /// Runs `call` under the breaker and `timeout`.
    pub async fn call<T, F>(&self, timeout: Duration, call: F) -> GatewayResult<T>
    where
        F: Future<Output = GatewayResult<T>>,
    {
        if !self.should_allow() {
            debug!(gateway = self.name, "Circuit breaker is open, rejecting call");
            return Err(GatewayFailure::CircuitOpen);
        }

        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(GatewayFailure::Timeout(timeout)),
        };

        match &outcome {
            Ok(_) => self.record_success(),
            Err(failure) => {
                debug!(gateway = self.name, %failure, "Gateway call failed");
                self.record_failure();
            }
        }
        outcome
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayPolicy {
    pub timeout_ms: u64,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for GatewayPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Wraps a gateway client with its own timeout and circuit breaker.
pub struct Resilient<C> {
    inner: C,
    timeout: Duration,
    breaker: CircuitBreaker,
}

impl<C> Resilient<C> {
    pub fn new(name: &'static str, inner: C, policy: &GatewayPolicy) -> Self {
        Self {
            inner,
            timeout: Duration::from_millis(policy.timeout_ms),
            breaker: CircuitBreaker::new(name, policy.circuit_breaker.clone()),
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }
}

#[async_trait]
impl<C: RateClient> RateClient for Resilient<C> {
    async fn get_rate_details(
        &self,
        transaction_type_id: u32,
        location_id: u32,
        space_id: i64,
    ) -> GatewayResult<RateDetails> {
        self.breaker
            .call(
                self.timeout,
                self.inner
                    .get_rate_details(transaction_type_id, location_id, space_id),
            )
            .await
    }
}

#[async_trait]
impl<C: TopologyClient> TopologyClient for Resilient<C> {
    async fn validate_customer_relationship(
        &self,
        request: LocationValidationRequest,
    ) -> GatewayResult<LocationValidation> {
        self.breaker
            .call(
                self.timeout,
                self.inner.validate_customer_relationship(request),
            )
            .await
    }
}

#[async_trait]
impl<C: PaymentClient> PaymentClient for Resilient<C> {
    async fn record(&self, payments: ThirdPartyPaymentsList) -> GatewayResult<()> {
        self.breaker
            .call(self.timeout, self.inner.record(payments))
            .await
    }

    async fn get_permits(
        &self,
        transaction_uuid: Uuid,
        customer_id: u32,
    ) -> GatewayResult<Vec<ThirdPartyPayment>> {
        self.breaker
            .call(
                self.timeout,
                self.inner.get_permits(transaction_uuid, customer_id),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateway::Remote;
    use crate::infrastructure::simulated::{Behavior, SimulatedRateClient};

    fn policy(timeout_ms: u64, failure_threshold: u32, open_timeout_ms: u64) -> GatewayPolicy {
        GatewayPolicy {
            timeout_ms,
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold,
                open_timeout_ms,
            },
        }
    }

    #[tokio::test]
    async fn test_hung_call_times_out() {
        let client = Resilient::new(
            "rate",
            SimulatedRateClient::new(Behavior::Hang { millis: 500 }),
            &policy(20, 5, 1_000),
        );

        let result = client.get_rate_details(1, 1, 1).await;
        assert_eq!(result, Err(GatewayFailure::Timeout(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn test_circuit_opens_after_threshold_and_skips_inner_call() {
        let inner = SimulatedRateClient::new(Behavior::Unavailable);
        let calls = inner.call_counter();
        let client = Resilient::new("rate", inner, &policy(100, 2, 60_000));

        for _ in 0..2 {
            assert!(matches!(
                client.get_rate_details(1, 1, 1).await,
                Err(GatewayFailure::Transport(_))
            ));
        }
        assert_eq!(client.circuit_state(), CircuitState::Open);

        let rejected = client.get_rate_details(1, 1, 1).await;
        assert_eq!(rejected, Err(GatewayFailure::CircuitOpen));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_rejection_status_does_not_trip_circuit() {
        let client = Resilient::new(
            "rate",
            SimulatedRateClient::new(Behavior::Reject { status: 400 }),
            &policy(100, 1, 60_000),
        );

        for _ in 0..3 {
            let result = client.get_rate_details(1, 1, 1).await;
            assert_eq!(result, Ok(Remote::empty(400)));
        }
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_probe_closes_circuit() {
        let breaker = CircuitBreaker::new(
            "rate",
            CircuitBreakerConfig {
                failure_threshold: 1,
                open_timeout_ms: 10,
            },
        );
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.should_allow());

        tokio::time::sleep(Duration::from_millis(20)).await;

        let result: GatewayResult<()> = breaker
            .call(Duration::from_millis(100), async { Ok(Remote::ok(())) })
            .await;
        assert!(result.is_ok());
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_failed_probe_reopens_circuit() {
        let breaker = CircuitBreaker::new(
            "topology",
            CircuitBreakerConfig {
                failure_threshold: 3,
                open_timeout_ms: 10,
            },
        );
        for _ in 0..3 {
            breaker.record_failure();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(breaker.should_allow());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
    }
}
