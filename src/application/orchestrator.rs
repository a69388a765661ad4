use super::guard::UniquenessGuard;
use super::response::{Page, PageRequest, Reply, TransactionCreated, TransactionDetails};
use crate::domain::context::{AuthType, CallerContext, Permission};
use crate::domain::envelope::Domain;
use crate::domain::payment::{Payment, ThirdPartyPayment, ThirdPartyPaymentsList};
use crate::domain::ports::{
    LocationValidationRequest, PaymentClientBox, PermitTransactionRepositoryBox, RateClientBox,
    TopologyClientBox, TransactionTypeRepositoryBox,
};
use crate::domain::transaction::{
    NewTransaction, PersistedTransaction, TransactionRequest, TransactionType,
};
use crate::domain::validation;
use crate::error::{PermitError, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const INVALID_TRANSACTION_TYPE: &str = "invalid transaction type";
pub const INVALID_RATE_ID: &str = "invalid rate id";
pub const INVALID_LOCATION_ID: &str = "invalid location id";
pub const TOPOLOGY_ERROR: &str = "topology error";
pub const PAYMENT_SAVE_ERROR: &str = "payment save error for customer ";
pub const ACCESS_DENIED: &str = "access denied";

/// Sequences validation, downstream checks and persistence for permit transactions.
///
/// Every call runs strictly in order and stops at the first failing stage:
/// validation, uniqueness, transaction type, rate, topology, persistence and
/// finally payment recording. The `*_transaction` methods recover every
/// error into a [`Reply`]; nothing escapes as a fault.
pub struct TransactionOrchestrator {
    transaction_types: TransactionTypeRepositoryBox,
    transactions: PermitTransactionRepositoryBox,
    rate_client: RateClientBox,
    topology_client: TopologyClientBox,
    payment_client: PaymentClientBox,
}

impl TransactionOrchestrator {
    /// Creates a new `TransactionOrchestrator`.
    ///
    /// # Arguments
    ///
    /// * `transaction_types` - Reference data for transaction types.
    /// * `transactions` - The store of persisted permit transactions.
    /// * `rate_client` - Rate lookup gateway.
    /// * `topology_client` - Location/customer relationship gateway.
    /// * `payment_client` - Third-party payment recording gateway.
    pub fn new(
        transaction_types: TransactionTypeRepositoryBox,
        transactions: PermitTransactionRepositoryBox,
        rate_client: RateClientBox,
        topology_client: TopologyClientBox,
        payment_client: PaymentClientBox,
    ) -> Self {
        Self {
            transaction_types,
            transactions,
            rate_client,
            topology_client,
            payment_client,
        }
    }

    /// Handles a create request and maps its outcome to a reply.
    pub async fn create_transaction(
        &self,
        ctx: &CallerContext,
        request: TransactionRequest,
    ) -> Reply {
        match self.create(ctx, request).await {
            Ok(created) => Reply::ok(created),
            Err(e) => Reply::from_error(&e),
        }
    }

    /// Handles a retrieval request. A missing record is a bodiless `404`.
    pub async fn get_transaction(
        &self,
        ctx: &CallerContext,
        transaction_uuid: Uuid,
        customer_id: u32,
    ) -> Reply {
        match self.get(ctx, transaction_uuid, customer_id).await {
            Ok(Some(details)) => Reply::raw(&details),
            Ok(None) => Reply::not_found(),
            Err(e) => Reply::from_error(&e),
        }
    }

    pub async fn list_transaction_types(&self, ctx: &CallerContext, page: PageRequest) -> Reply {
        match self.transaction_types_page(ctx, page).await {
            Ok(page) => Reply::ok(page),
            Err(e) => Reply::from_error(&e),
        }
    }

    /// Runs the creation pipeline and returns the identity of the new record.
    pub async fn create(
        &self,
        ctx: &CallerContext,
        request: TransactionRequest,
    ) -> Result<TransactionCreated> {
        let key = request.key();
        debug!(
            transaction_uuid = %key.transaction_uuid,
            customer_id = key.customer_id,
            user_id = ?ctx.user_id,
            "Creating permit transaction"
        );

        if let Err(e) = validation::validate(&request) {
            warn!(transaction_uuid = %key.transaction_uuid, error = %e, "Rejected invalid request");
            return Err(e);
        }

        if let Err(e) = UniquenessGuard::new(self.transactions.as_ref())
            .ensure_unique(&key)
            .await
        {
            warn!(transaction_uuid = %key.transaction_uuid, error = %e, "Rejected duplicate request");
            return Err(e);
        }

        let transaction_type = self.resolve_transaction_type(request.transaction_type_id).await?;
        self.check_rate(&request).await?;
        self.check_topology(&request).await?;

        let persisted = self
            .transactions
            .save(NewTransaction {
                request: request.clone(),
                transaction_type,
                created_by: ctx.user_id,
            })
            .await?;
        info!(
            id = persisted.id,
            transaction_uuid = %persisted.transaction_uuid,
            customer_id = persisted.customer_id,
            "Persisted permit transaction"
        );

        if let Some(payments) = request.recordable_payments() {
            self.record_payments(&persisted, payments.to_vec()).await?;
        }

        Ok(TransactionCreated {
            id: persisted.id,
            transaction_uuid: persisted.transaction_uuid,
            customer_id: persisted.customer_id,
        })
    }

    /// Looks up a transaction and enriches it with its recorded payments.
    ///
    /// A failed payment lookup leaves `payments` empty instead of failing the read.
    pub async fn get(
        &self,
        ctx: &CallerContext,
        transaction_uuid: Uuid,
        customer_id: u32,
    ) -> Result<Option<TransactionDetails>> {
        debug!(%transaction_uuid, customer_id, user_id = ?ctx.user_id, "Retrieving permit transaction");
        let Some(transaction) = self
            .transactions
            .find_by_transaction_uuid_and_customer_id(transaction_uuid, customer_id)
            .await?
        else {
            debug!(%transaction_uuid, customer_id, "Permit transaction not found");
            return Ok(None);
        };

        let payments = self.fetch_payments(transaction_uuid, customer_id).await;
        Ok(Some(TransactionDetails {
            transaction,
            payments,
        }))
    }

    /// Pages through transaction types; requires the MICROSERVICE scope or
    /// the VIEW_PERMIT_TRANSACTION permission.
    pub async fn transaction_types_page(
        &self,
        ctx: &CallerContext,
        page: PageRequest,
    ) -> Result<Page<TransactionType>> {
        if !ctx.allows(AuthType::Microservice, Permission::ViewPermitTransaction) {
            warn!(user_id = ?ctx.user_id, "Denied transaction type listing");
            return Err(PermitError::Forbidden {
                domain: Domain::Permit,
                message: ACCESS_DENIED.to_string(),
            });
        }
        let all = self.transaction_types.find_all().await?;
        Ok(Page::of(all, page))
    }

    async fn resolve_transaction_type(&self, id: u32) -> Result<TransactionType> {
        match self.transaction_types.find_by_id(id).await? {
            Some(transaction_type) => Ok(transaction_type),
            None => {
                warn!(transaction_type_id = id, "Transaction type not found");
                Err(PermitError::not_found(
                    Domain::Permit,
                    INVALID_TRANSACTION_TYPE,
                ))
            }
        }
    }

    async fn check_rate(&self, request: &TransactionRequest) -> Result<()> {
        let outcome = self
            .rate_client
            .get_rate_details(
                request.transaction_type_id,
                request.location_id,
                request.space_id,
            )
            .await;

        match outcome {
            Ok(remote) if remote.is_success() => {
                debug!(rate = ?remote.body, "Rate lookup succeeded");
                Ok(())
            }
            Ok(remote) => {
                warn!(domain = %Domain::Rate, status = remote.status, "Rate lookup rejected");
                Err(PermitError::downstream(Domain::Rate, INVALID_RATE_ID, None))
            }
            Err(failure) => {
                warn!(domain = %Domain::Rate, %failure, "Rate lookup failed");
                Err(PermitError::downstream(
                    Domain::Rate,
                    INVALID_RATE_ID,
                    Some(failure),
                ))
            }
        }
    }

    async fn check_topology(&self, request: &TransactionRequest) -> Result<()> {
        let outcome = self
            .topology_client
            .validate_customer_relationship(LocationValidationRequest {
                location_id: request.location_id,
                customer_id: request.customer_id,
                space_id: request.space_id,
            })
            .await;

        match outcome {
            Ok(remote) => {
                let valid = remote.is_success() && remote.body.is_some_and(|b| b.is_valid);
                if valid {
                    Ok(())
                } else {
                    warn!(
                        domain = %Domain::Topology,
                        status = remote.status,
                        location_id = request.location_id,
                        "Topology rejected customer relationship"
                    );
                    Err(PermitError::downstream(Domain::Topology, TOPOLOGY_ERROR, None))
                }
            }
            Err(failure) => {
                warn!(domain = %Domain::Topology, %failure, "Topology validation failed");
                Err(PermitError::downstream(
                    Domain::Topology,
                    INVALID_LOCATION_ID,
                    Some(failure),
                ))
            }
        }
    }

    /// Records payments for an already persisted transaction. The transaction
    /// stays persisted when this fails.
    async fn record_payments(
        &self,
        persisted: &PersistedTransaction,
        payments: Vec<Payment>,
    ) -> Result<()> {
        let count = payments.len();
        let outcome = self
            .payment_client
            .record(ThirdPartyPaymentsList {
                permit_transaction_id: persisted.id,
                payments,
            })
            .await;

        let message = format!("{PAYMENT_SAVE_ERROR}{}", persisted.customer_id);
        match outcome {
            Ok(remote) if remote.is_success() => {
                info!(id = persisted.id, payments = count, "Recorded payments");
                Ok(())
            }
            Ok(remote) => {
                warn!(
                    domain = %Domain::Cps,
                    id = persisted.id,
                    status = remote.status,
                    "Payment recording rejected; transaction left persisted"
                );
                Err(PermitError::downstream(Domain::Cps, message, None))
            }
            Err(failure) => {
                warn!(
                    domain = %Domain::Cps,
                    id = persisted.id,
                    %failure,
                    "Payment recording failed; transaction left persisted"
                );
                Err(PermitError::downstream(Domain::Cps, message, Some(failure)))
            }
        }
    }

    async fn fetch_payments(
        &self,
        transaction_uuid: Uuid,
        customer_id: u32,
    ) -> Option<Vec<ThirdPartyPayment>> {
        match self
            .payment_client
            .get_permits(transaction_uuid, customer_id)
            .await
        {
            Ok(remote) if remote.is_success() => remote.body,
            Ok(remote) => {
                warn!(%transaction_uuid, status = remote.status, "Payment lookup rejected; returning without payments");
                None
            }
            Err(failure) => {
                warn!(%transaction_uuid, %failure, "Payment lookup failed; returning without payments");
                None
            }
        }
    }
}
