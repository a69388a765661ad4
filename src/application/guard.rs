use crate::domain::ports::PermitTransactionRepository;
use crate::domain::transaction::TransactionKey;
use crate::error::{PermitError, Result};

/// Optimistic pre-insert check on the (transaction uuid, customer id) key.
///
/// The store's own constraint still decides a race between this check and
/// the insert; both surface the same conflict.
pub struct UniquenessGuard<'a> {
    repository: &'a dyn PermitTransactionRepository,
}

impl<'a> UniquenessGuard<'a> {
    pub fn new(repository: &'a dyn PermitTransactionRepository) -> Self {
        Self { repository }
    }

    pub async fn exists(&self, key: &TransactionKey) -> Result<bool> {
        let existing = self
            .repository
            .find_by_transaction_uuid_and_customer_id(key.transaction_uuid, key.customer_id)
            .await?;
        Ok(existing.is_some())
    }

    /// Fails with a conflict when a transaction with `key` was already persisted.
    pub async fn ensure_unique(&self, key: &TransactionKey) -> Result<()> {
        if self.exists(key).await? {
            return Err(PermitError::duplicate(key));
        }
        Ok(())
    }
}
