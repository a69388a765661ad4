//! Field-level rules applied to a [`TransactionRequest`] before any lookup.
//!
//! Rules run in a fixed order and the first violation wins, so a request that
//! breaks several rules always reports the same single error.

use super::envelope::Domain;
use super::transaction::TransactionRequest;
use crate::error::{PermitError, Result};
use rust_decimal::Decimal;

pub const TRANSACTION_DATE_ERROR: &str = "transaction date before active date";
pub const ACTIVE_DATE_ERROR: &str = "active date error";
pub const INVALID_PLATE_NUMBER: &str = "invalid plate number";
pub const INVALID_SPACE_ID: &str = "invalid space id";
pub const INVALID_TOTAL_AMOUNT: &str = "invalid total amount";
pub const EMPTY_PAYMENTS: &str = "empty payments";
pub const INVALID_TOTAL_AMOUNT_SUM: &str = "invalid total amount sum";
pub const VENDOR_ID_MISMATCH: &str = "vendor id mismatch";
pub const INVALID_TRANSACTION_UUID: &str = "invalid transaction uuid: ";
pub const INVALID_CUSTOMER_ID: &str = "invalid customer id: ";

/// Returns the first violated rule, or `Ok(())` when the request is well formed.
pub fn validate(request: &TransactionRequest) -> Result<()> {
    // The two dates must match; a mismatch is reported against the later one.
    match (request.transaction_date, request.active_date) {
        (None, _) => return Err(permit(TRANSACTION_DATE_ERROR)),
        (Some(_), None) => return Err(permit(ACTIVE_DATE_ERROR)),
        (Some(transaction), Some(active)) if transaction > active => {
            return Err(permit(TRANSACTION_DATE_ERROR));
        }
        (Some(transaction), Some(active)) if active > transaction => {
            return Err(permit(ACTIVE_DATE_ERROR));
        }
        _ => {}
    }

    if request.plate_number.trim().is_empty() {
        return Err(permit(INVALID_PLATE_NUMBER));
    }
    if request.space_id <= 0 {
        return Err(permit(INVALID_SPACE_ID));
    }
    if request.amount <= Decimal::ZERO {
        return Err(permit(INVALID_TOTAL_AMOUNT));
    }

    let Some(payments) = request.payments.as_deref() else {
        return Ok(());
    };
    if payments.is_empty() {
        return Err(payment(EMPTY_PAYMENTS));
    }

    let sum: Decimal = payments.iter().map(|p| p.amount).sum();
    if sum != request.amount {
        return Err(payment(INVALID_TOTAL_AMOUNT_SUM));
    }
    if payments.iter().any(|p| p.vendor_id != request.vendor_id) {
        return Err(payment(VENDOR_ID_MISMATCH));
    }
    if let Some(p) = payments
        .iter()
        .find(|p| p.transaction_uuid != request.transaction_uuid)
    {
        return Err(payment(format!(
            "{INVALID_TRANSACTION_UUID}{}",
            p.transaction_uuid
        )));
    }
    if let Some(p) = payments
        .iter()
        .find(|p| p.customer_id != request.customer_id)
    {
        return Err(payment(format!("{INVALID_CUSTOMER_ID}{}", p.customer_id)));
    }

    Ok(())
}

fn permit(message: impl Into<String>) -> PermitError {
    PermitError::validation(Domain::Permit, message)
}

fn payment(message: impl Into<String>) -> PermitError {
    PermitError::validation(Domain::Payment, message)
}
