use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single payment attached to a transaction request.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: Decimal,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub last4_digits: Option<String>,
    #[serde(default)]
    pub card_expiry: Option<String>,
    #[serde(default)]
    pub authorization_number: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    pub transaction_uuid: Uuid,
    pub customer_id: u32,
    pub vendor_id: u32,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub processor_transaction_id: Option<String>,
    #[serde(default)]
    pub purchase_utc: Option<DateTime<Utc>>,
}

/// Batch sent to the payment recording service after the transaction is persisted.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyPaymentsList {
    pub permit_transaction_id: u64,
    pub payments: Vec<Payment>,
}

/// A payment as reported back by the payment recording service.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyPayment {
    pub amount: Decimal,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub last4_digits: Option<String>,
    #[serde(default)]
    pub processor_transaction_id: Option<String>,
    #[serde(default)]
    pub purchase_utc: Option<DateTime<Utc>>,
}

impl From<&Payment> for ThirdPartyPayment {
    fn from(payment: &Payment) -> Self {
        Self {
            amount: payment.amount,
            card_type: payment.card_type.clone(),
            last4_digits: payment.last4_digits.clone(),
            processor_transaction_id: payment.processor_transaction_id.clone(),
            purchase_utc: payment.purchase_utc,
        }
    }
}
