use crate::domain::ports::{PermitTransactionRepository, TransactionTypeRepository};
use crate::domain::transaction::{
    NewTransaction, PersistedTransaction, TransactionKey, TransactionType,
};
use crate::error::{PermitError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for persisted permit transactions, keyed by `uuid || customer_id`.
pub const CF_PERMIT_TRANSACTIONS: &str = "permit_transactions";
/// Column Family for transaction type reference data, keyed by big-endian id.
pub const CF_TRANSACTION_TYPES: &str = "transaction_types";
/// Column Family holding the id sequence.
pub const CF_SEQUENCE: &str = "sequence";

const SEQUENCE_KEY: &[u8] = b"permit_transaction_id";

/// A persistent store implementation using RocksDB.
///
/// `Clone` shares the underlying `Arc<DB>`. Saves are serialized through a
/// writer lock so the key check, id allocation and insert form one step.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writer: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path`, creating missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_PERMIT_TRANSACTIONS, CF_TRANSACTION_TYPES, CF_SEQUENCE]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PermitError::Storage(format!("column family {name} not found")))
    }

    fn read<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(self.cf(cf)?, key, bytes)?;
        Ok(())
    }

    fn next_id(&self) -> Result<u64> {
        let cf = self.cf(CF_SEQUENCE)?;
        let current = match self.db.get_pinned_cf(cf, SEQUENCE_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_ref().try_into().map_err(|_| {
                    PermitError::Storage("corrupt permit transaction sequence".to_string())
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };
        let next = current + 1;
        self.db.put_cf(cf, SEQUENCE_KEY, next.to_be_bytes())?;
        Ok(next)
    }
}

#[async_trait]
impl TransactionTypeRepository for RocksDBStore {
    async fn store(&self, transaction_type: TransactionType) -> Result<()> {
        self.write(
            CF_TRANSACTION_TYPES,
            &transaction_type.id.to_be_bytes(),
            &transaction_type,
        )
    }

    async fn find_by_id(&self, id: u32) -> Result<Option<TransactionType>> {
        self.read(CF_TRANSACTION_TYPES, &id.to_be_bytes())
    }

    async fn find_all(&self) -> Result<Vec<TransactionType>> {
        // Big-endian keys iterate in id order.
        let iter = self
            .db
            .iterator_cf(self.cf(CF_TRANSACTION_TYPES)?, IteratorMode::Start);

        let mut types = Vec::new();
        for item in iter {
            let (_key, value) = item?;
            types.push(serde_json::from_slice(&value)?);
        }
        Ok(types)
    }
}

#[async_trait]
impl PermitTransactionRepository for RocksDBStore {
    async fn find_by_transaction_uuid_and_customer_id(
        &self,
        transaction_uuid: Uuid,
        customer_id: u32,
    ) -> Result<Option<PersistedTransaction>> {
        let key = TransactionKey::new(transaction_uuid, customer_id);
        self.read(CF_PERMIT_TRANSACTIONS, &key.to_bytes())
    }

    async fn save(&self, transaction: NewTransaction) -> Result<PersistedTransaction> {
        let _guard = self.writer.lock().await;

        let key = transaction.key();
        let cf = self.cf(CF_PERMIT_TRANSACTIONS)?;
        if self.db.get_pinned_cf(cf, key.to_bytes())?.is_some() {
            return Err(PermitError::duplicate(&key));
        }

        let persisted = transaction.into_persisted(self.next_id()?, Utc::now());
        self.write(CF_PERMIT_TRANSACTIONS, &key.to_bytes(), &persisted)?;
        Ok(persisted)
    }
}
