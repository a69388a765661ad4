#![allow(dead_code)]

use chrono::Utc;
use permit_service::application::orchestrator::TransactionOrchestrator;
use permit_service::domain::payment::Payment;
use permit_service::domain::transaction::{TransactionRequest, TransactionType};
use permit_service::infrastructure::in_memory::{
    InMemoryPermitTransactionRepository, InMemoryTransactionTypeRepository,
};
use permit_service::infrastructure::resilience::{GatewayPolicy, Resilient};
use permit_service::infrastructure::simulated::{
    Behavior, PaymentSimulation, SimulatedPaymentClient, SimulatedRateClient,
    SimulatedTopologyClient, TopologySimulation,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::{Error, Write};
use std::path::Path;
use uuid::Uuid;

pub const CUSTOMER_ID: u32 = 2;
pub const VENDOR_ID: u32 = 1;

pub fn payment(uuid: Uuid, amount: Decimal) -> Payment {
    Payment {
        amount,
        card_type: Some("Credit".to_string()),
        last4_digits: Some("123".to_string()),
        card_expiry: Some("2020".to_string()),
        authorization_number: Some("1234".to_string()),
        product_type: Some("permit".to_string()),
        payment_type: Some("charge".to_string()),
        transaction_uuid: uuid,
        customer_id: CUSTOMER_ID,
        vendor_id: VENDOR_ID,
        device_id: Some("D121".to_string()),
        processor_transaction_id: Some("12".to_string()),
        purchase_utc: Some(Utc::now()),
    }
}

/// A request that passes every validation rule, paid by one payment.
pub fn request() -> TransactionRequest {
    let uuid = Uuid::new_v4();
    let now = Utc::now();
    TransactionRequest {
        transaction_uuid: uuid,
        linked_transaction_uuid: Some(Uuid::new_v4()),
        customer_id: CUSTOMER_ID,
        vendor_id: VENDOR_ID,
        transaction_type_id: 1,
        permit_number: "P123".to_string(),
        plate_number: "P123".to_string(),
        location_id: 123,
        space_id: 10,
        rate_id: 121,
        amount: dec!(10),
        active_date: Some(now),
        expiry_date: Some(now),
        transaction_date: Some(now),
        payments: Some(vec![payment(uuid, dec!(10))]),
    }
}

/// Downstream behaviour for one test service.
#[derive(Clone, Default)]
pub struct Downstream {
    pub rate: Behavior,
    pub topology: TopologySimulation,
    pub payments: PaymentSimulation,
    pub policy: GatewayPolicy,
}

/// An orchestrator over in-memory stores and simulated gateways, with handles
/// to inspect what each collaborator saw.
pub struct Service {
    pub orchestrator: TransactionOrchestrator,
    pub transactions: InMemoryPermitTransactionRepository,
    pub rate: SimulatedRateClient,
    pub topology: SimulatedTopologyClient,
    pub payments: SimulatedPaymentClient,
}

pub fn service(downstream: Downstream) -> Service {
    let transactions = InMemoryPermitTransactionRepository::new();
    let rate = SimulatedRateClient::new(downstream.rate);
    let topology = SimulatedTopologyClient::new(downstream.topology);
    let payments = SimulatedPaymentClient::new(downstream.payments);

    let orchestrator = TransactionOrchestrator::new(
        Box::new(InMemoryTransactionTypeRepository::seeded([
            TransactionType::new(1, "CHARGE", "CHARGE Test"),
            TransactionType::new(2, "REFUND", "REFUND Test"),
        ])),
        Box::new(transactions.clone()),
        Box::new(Resilient::new("rate", rate.clone(), &downstream.policy)),
        Box::new(Resilient::new("topology", topology.clone(), &downstream.policy)),
        Box::new(Resilient::new("payments", payments.clone(), &downstream.policy)),
    );

    Service {
        orchestrator,
        transactions,
        rate,
        topology,
        payments,
    }
}

pub fn healthy_service() -> Service {
    service(Downstream::default())
}

/// Writes `requests` as newline-delimited JSON.
pub fn write_requests(path: &Path, requests: &[TransactionRequest]) -> Result<(), Error> {
    let mut file = std::fs::File::create(path)?;
    for request in requests {
        serde_json::to_writer(&mut file, request)?;
        writeln!(file)?;
    }
    file.flush()
}
