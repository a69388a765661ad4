use super::gateway::GatewayResult;
use super::payment::{ThirdPartyPayment, ThirdPartyPaymentsList};
use super::transaction::{NewTransaction, PersistedTransaction, TransactionType};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[async_trait]
pub trait TransactionTypeRepository: Send + Sync {
    async fn store(&self, transaction_type: TransactionType) -> Result<()>;
    async fn find_by_id(&self, id: u32) -> Result<Option<TransactionType>>;
    /// All transaction types, ordered by id.
    async fn find_all(&self) -> Result<Vec<TransactionType>>;
}

#[async_trait]
pub trait PermitTransactionRepository: Send + Sync {
    async fn find_by_transaction_uuid_and_customer_id(
        &self,
        transaction_uuid: Uuid,
        customer_id: u32,
    ) -> Result<Option<PersistedTransaction>>;

    /// Inserts a new record and returns it with its generated id.
    ///
    /// Fails with `PermitError::Conflict` if the key is already taken; never overwrites.
    async fn save(&self, transaction: NewTransaction) -> Result<PersistedTransaction>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateDetails {
    pub rate_id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationValidationRequest {
    pub location_id: u32,
    pub customer_id: u32,
    pub space_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationValidation {
    pub is_valid: bool,
}

#[async_trait]
pub trait RateClient: Send + Sync {
    async fn get_rate_details(
        &self,
        transaction_type_id: u32,
        location_id: u32,
        space_id: i64,
    ) -> GatewayResult<RateDetails>;
}

#[async_trait]
pub trait TopologyClient: Send + Sync {
    async fn validate_customer_relationship(
        &self,
        request: LocationValidationRequest,
    ) -> GatewayResult<LocationValidation>;
}

#[async_trait]
pub trait PaymentClient: Send + Sync {
    async fn record(&self, payments: ThirdPartyPaymentsList) -> GatewayResult<()>;
    async fn get_permits(
        &self,
        transaction_uuid: Uuid,
        customer_id: u32,
    ) -> GatewayResult<Vec<ThirdPartyPayment>>;
}

pub type TransactionTypeRepositoryBox = Box<dyn TransactionTypeRepository>;
pub type PermitTransactionRepositoryBox = Box<dyn PermitTransactionRepository>;
pub type RateClientBox = Box<dyn RateClient>;
pub type TopologyClientBox = Box<dyn TopologyClient>;
pub type PaymentClientBox = Box<dyn PaymentClient>;
