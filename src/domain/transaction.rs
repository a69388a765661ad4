use super::payment::Payment;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference entity describing what kind of permit transaction is being made.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct TransactionType {
    pub id: u32,
    pub label: String,
    pub description: String,
}

impl TransactionType {
    pub fn new(id: u32, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Inbound request to create a permit transaction.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub transaction_uuid: Uuid,
    #[serde(default)]
    pub linked_transaction_uuid: Option<Uuid>,
    pub customer_id: u32,
    #[serde(default)]
    pub vendor_id: u32,
    pub transaction_type_id: u32,
    #[serde(default)]
    pub permit_number: String,
    #[serde(default)]
    pub plate_number: String,
    #[serde(default)]
    pub location_id: u32,
    #[serde(default)]
    pub space_id: i64,
    #[serde(default)]
    pub rate_id: u32,
    pub amount: Decimal,
    #[serde(default)]
    pub active_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payments: Option<Vec<Payment>>,
}

impl TransactionRequest {
    pub fn key(&self) -> TransactionKey {
        TransactionKey {
            transaction_uuid: self.transaction_uuid,
            customer_id: self.customer_id,
        }
    }

    /// Payments that must be recorded downstream, if any.
    pub fn recordable_payments(&self) -> Option<&[Payment]> {
        self.payments.as_deref().filter(|p| !p.is_empty())
    }
}

/// Composite uniqueness key of a persisted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionKey {
    pub transaction_uuid: Uuid,
    pub customer_id: u32,
}

impl TransactionKey {
    pub fn new(transaction_uuid: Uuid, customer_id: u32) -> Self {
        Self {
            transaction_uuid,
            customer_id,
        }
    }

    /// Big-endian `uuid || customer_id`, used as a storage key.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut bytes = [0u8; 20];
        bytes[..16].copy_from_slice(self.transaction_uuid.as_bytes());
        bytes[16..].copy_from_slice(&self.customer_id.to_be_bytes());
        bytes
    }
}

/// A validated transaction ready to be written; the store assigns its id.
#[derive(Debug, PartialEq, Clone)]
pub struct NewTransaction {
    pub request: TransactionRequest,
    pub transaction_type: TransactionType,
    pub created_by: Option<u64>,
}

impl NewTransaction {
    pub fn key(&self) -> TransactionKey {
        self.request.key()
    }

    /// Builds the durable record once the store has allocated an id.
    pub fn into_persisted(self, id: u64, created_at: DateTime<Utc>) -> PersistedTransaction {
        let r = self.request;
        PersistedTransaction {
            id,
            transaction_uuid: r.transaction_uuid,
            linked_transaction_uuid: r.linked_transaction_uuid,
            customer_id: r.customer_id,
            vendor_id: r.vendor_id,
            transaction_type: self.transaction_type,
            permit_number: r.permit_number,
            plate_number: r.plate_number,
            location_id: r.location_id,
            space_id: r.space_id,
            rate_id: r.rate_id,
            amount: r.amount,
            active_date: r.active_date,
            expiry_date: r.expiry_date,
            transaction_date: r.transaction_date,
            created_by: self.created_by,
            created_at,
        }
    }
}

/// The durable record, unique per (transaction uuid, customer id).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTransaction {
    pub id: u64,
    pub transaction_uuid: Uuid,
    pub linked_transaction_uuid: Option<Uuid>,
    pub customer_id: u32,
    pub vendor_id: u32,
    pub transaction_type: TransactionType,
    pub permit_number: String,
    pub plate_number: String,
    pub location_id: u32,
    pub space_id: i64,
    pub rate_id: u32,
    pub amount: Decimal,
    pub active_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub created_by: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl PersistedTransaction {
    pub fn key(&self) -> TransactionKey {
        TransactionKey::new(self.transaction_uuid, self.customer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_request_deserialization_defaults() {
        let uuid = Uuid::new_v4();
        let json = format!(
            r#"{{"transactionUuid":"{uuid}","customerId":2,"transactionTypeId":1,"amount":"10"}}"#
        );
        let request: TransactionRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(request.transaction_uuid, uuid);
        assert_eq!(request.amount, dec!(10));
        assert_eq!(request.space_id, 0);
        assert!(request.payments.is_none());
        assert!(request.recordable_payments().is_none());
    }

    #[test]
    fn test_key_bytes_are_distinct_per_customer() {
        let uuid = Uuid::new_v4();
        let a = TransactionKey::new(uuid, 1).to_bytes();
        let b = TransactionKey::new(uuid, 2).to_bytes();

        assert_ne!(a, b);
        assert_eq!(&a[..16], uuid.as_bytes());
    }
}
