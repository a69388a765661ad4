//! Scripted stand-ins for the Rate, Topology and payment recording services.
//!
//! Each client answers according to a configured [`Behavior`] and counts the
//! calls it receives. The CLI uses them as its offline downstream, and the
//! test suites use them in place of real remote clients.

use crate::domain::gateway::{GatewayFailure, GatewayResult, Remote};
use crate::domain::payment::{ThirdPartyPayment, ThirdPartyPaymentsList};
use crate::domain::ports::{
    LocationValidation, LocationValidationRequest, PaymentClient, RateClient, RateDetails,
    TopologyClient,
};
use crate::domain::transaction::TransactionKey;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// How a simulated service answers a call.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Behavior {
    /// Answer with a success status.
    #[default]
    Succeed,
    /// Complete the call with the given non-success status.
    Reject { status: u16 },
    /// Fail the call as a transport error.
    Unavailable,
    /// Wait `millis` before answering with success.
    Hang { millis: u64 },
}

impl Behavior {
    async fn answer<T>(&self, ok: Remote<T>) -> GatewayResult<T> {
        match self {
            Behavior::Succeed => Ok(ok),
            Behavior::Reject { status } => Ok(Remote::empty(*status)),
            Behavior::Unavailable => Err(GatewayFailure::Transport(
                "service unavailable".to_string(),
            )),
            Behavior::Hang { millis } => {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
                Ok(ok)
            }
        }
    }
}

/// Shared count of calls received by a simulated client.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedRateClient {
    behavior: Behavior,
    calls: CallCounter,
}

impl SimulatedRateClient {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: CallCounter::default(),
        }
    }

    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl RateClient for SimulatedRateClient {
    async fn get_rate_details(
        &self,
        transaction_type_id: u32,
        _location_id: u32,
        _space_id: i64,
    ) -> GatewayResult<RateDetails> {
        self.calls.bump();
        let details = RateDetails {
            rate_id: transaction_type_id,
            name: None,
            amount: None,
        };
        self.behavior.answer(Remote::ok(details)).await
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TopologySimulation {
    pub behavior: Behavior,
    /// `isValid` carried by a successful answer.
    pub valid: bool,
}

impl Default for TopologySimulation {
    fn default() -> Self {
        Self {
            behavior: Behavior::Succeed,
            valid: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedTopologyClient {
    simulation: TopologySimulation,
    calls: CallCounter,
}

impl SimulatedTopologyClient {
    pub fn new(simulation: TopologySimulation) -> Self {
        Self {
            simulation,
            calls: CallCounter::default(),
        }
    }

    pub fn valid() -> Self {
        Self::new(TopologySimulation::default())
    }

    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl TopologyClient for SimulatedTopologyClient {
    async fn validate_customer_relationship(
        &self,
        _request: LocationValidationRequest,
    ) -> GatewayResult<LocationValidation> {
        self.calls.bump();
        let answer = LocationValidation {
            is_valid: self.simulation.valid,
        };
        self.simulation.behavior.answer(Remote::ok(answer)).await
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentSimulation {
    pub record: Behavior,
    pub lookup: Behavior,
}

/// Simulated payment recording service.
///
/// Successfully recorded batches are kept and served back by `get_permits`.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentClient {
    simulation: PaymentSimulation,
    recorded: Arc<RwLock<HashMap<TransactionKey, Vec<ThirdPartyPayment>>>>,
    batches: Arc<RwLock<Vec<ThirdPartyPaymentsList>>>,
    calls: CallCounter,
}

impl SimulatedPaymentClient {
    pub fn new(simulation: PaymentSimulation) -> Self {
        Self {
            simulation,
            recorded: Arc::default(),
            batches: Arc::default(),
            calls: CallCounter::default(),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(PaymentSimulation::default())
    }

    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }

    /// Batches accepted by `record`, in arrival order.
    pub async fn recorded_batches(&self) -> Vec<ThirdPartyPaymentsList> {
        self.batches.read().await.clone()
    }
}

#[async_trait]
impl PaymentClient for SimulatedPaymentClient {
    async fn record(&self, payments: ThirdPartyPaymentsList) -> GatewayResult<()> {
        self.calls.bump();
        let answer = self.simulation.record.answer(Remote::empty(200)).await;
        if matches!(&answer, Ok(remote) if remote.is_success()) {
            let mut recorded = self.recorded.write().await;
            for payment in &payments.payments {
                let key = TransactionKey::new(payment.transaction_uuid, payment.customer_id);
                recorded
                    .entry(key)
                    .or_default()
                    .push(ThirdPartyPayment::from(payment));
            }
            self.batches.write().await.push(payments);
        }
        answer
    }

    async fn get_permits(
        &self,
        transaction_uuid: Uuid,
        customer_id: u32,
    ) -> GatewayResult<Vec<ThirdPartyPayment>> {
        self.calls.bump();
        let key = TransactionKey::new(transaction_uuid, customer_id);
        let payments = self
            .recorded
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default();
        self.simulation.lookup.answer(Remote::ok(payments)).await
    }
}
