use crate::domain::ports::{PermitTransactionRepository, TransactionTypeRepository};
use crate::domain::transaction::{
    NewTransaction, PersistedTransaction, TransactionKey, TransactionType,
};
use crate::error::{PermitError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory store for transaction type reference data.
///
/// Backed by a `BTreeMap` so `find_all` comes back ordered by id.
#[derive(Default, Clone)]
pub struct InMemoryTransactionTypeRepository {
    types: Arc<RwLock<BTreeMap<u32, TransactionType>>>,
}

impl InMemoryTransactionTypeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `types`.
    pub fn seeded(types: impl IntoIterator<Item = TransactionType>) -> Self {
        let map = types.into_iter().map(|t| (t.id, t)).collect();
        Self {
            types: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl TransactionTypeRepository for InMemoryTransactionTypeRepository {
    async fn store(&self, transaction_type: TransactionType) -> Result<()> {
        let mut types = self.types.write().await;
        types.insert(transaction_type.id, transaction_type);
        Ok(())
    }

    async fn find_by_id(&self, id: u32) -> Result<Option<TransactionType>> {
        let types = self.types.read().await;
        Ok(types.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<TransactionType>> {
        let types = self.types.read().await;
        Ok(types.values().cloned().collect())
    }
}

#[derive(Default)]
struct TransactionTable {
    next_id: u64,
    rows: HashMap<TransactionKey, PersistedTransaction>,
}

/// A thread-safe in-memory store for permit transactions.
///
/// The uniqueness check and the insert happen under one write lock, so two
/// concurrent saves of the same key cannot both succeed.
#[derive(Default, Clone)]
pub struct InMemoryPermitTransactionRepository {
    table: Arc<RwLock<TransactionTable>>,
}

impl InMemoryPermitTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PermitTransactionRepository for InMemoryPermitTransactionRepository {
    async fn find_by_transaction_uuid_and_customer_id(
        &self,
        transaction_uuid: Uuid,
        customer_id: u32,
    ) -> Result<Option<PersistedTransaction>> {
        let table = self.table.read().await;
        let key = TransactionKey::new(transaction_uuid, customer_id);
        Ok(table.rows.get(&key).cloned())
    }

    async fn save(&self, transaction: NewTransaction) -> Result<PersistedTransaction> {
        let mut table = self.table.write().await;
        let key = transaction.key();
        if table.rows.contains_key(&key) {
            return Err(PermitError::duplicate(&key));
        }

        table.next_id += 1;
        let persisted = transaction.into_persisted(table.next_id, Utc::now());
        table.rows.insert(key, persisted.clone());
        Ok(persisted)
    }
}
