//! Reconciliation error types.

use rust_decimal::Decimal;
use thiserror::Error;

use cartage_shared::types::VoucherId;

use crate::voucher::types::{TransactionType, VoucherStatus};

/// Errors that can occur while grouping statements and reconciling
/// collections.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Statement generation was given no vouchers.
    #[error("A statement requires at least one billing voucher")]
    EmptyStatement,

    /// Item is not a billing voucher.
    #[error("Voucher {voucher_id} is not a billing voucher")]
    NotBilling {
        /// The offending voucher.
        voucher_id: VoucherId,
    },

    /// Item is not in Draft status.
    #[error("Voucher {voucher_id} is not in draft status: {status}")]
    NotDraft {
        /// The offending voucher.
        voucher_id: VoucherId,
        /// Its current status.
        status: VoucherStatus,
    },

    /// Item already belongs to a statement.
    #[error("Voucher {voucher_id} already belongs to statement {statement_reference}")]
    AlreadyClaimed {
        /// The offending voucher.
        voucher_id: VoucherId,
        /// The statement it belongs to.
        statement_reference: String,
    },

    /// Referenced voucher does not exist.
    #[error("Voucher {0} not found")]
    NotFound(VoucherId),

    /// Referenced voucher has the wrong transaction type.
    #[error("Voucher {voucher_id} is a {actual}, expected {expected}")]
    TypeMismatch {
        /// The referenced voucher.
        voucher_id: VoucherId,
        /// The type the operation requires.
        expected: TransactionType,
        /// The type found.
        actual: TransactionType,
    },

    /// Allocation exceeds the billing's remaining balance.
    #[error(
        "Allocation of {requested} against billing {billing_id} exceeds remaining balance {remaining}"
    )]
    OverAllocation {
        /// The billing being paid down.
        billing_id: VoucherId,
        /// The requested allocation.
        requested: Decimal,
        /// The balance still available.
        remaining: Decimal,
    },

    /// A collection's allocations may only be applied once.
    #[error("Collection {collection_id} has already been allocated")]
    AlreadyAllocated {
        /// The collection voucher.
        collection_id: VoucherId,
    },

    /// Statement has already been finalized to the ledger.
    #[error("Statement {statement_reference} has already been posted to the ledger")]
    AlreadyPosted {
        /// The statement reference.
        statement_reference: String,
    },

    /// No vouchers reference the statement.
    #[error("Statement {statement_reference} not found")]
    StatementNotFound {
        /// The statement reference.
        statement_reference: String,
    },
}

impl ReconciliationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EmptyStatement | Self::AlreadyAllocated { .. } => 400,
            Self::NotBilling { .. }
            | Self::NotDraft { .. }
            | Self::AlreadyClaimed { .. }
            | Self::AlreadyPosted { .. } => 409,
            Self::NotFound(_) | Self::StatementNotFound { .. } => 404,
            Self::TypeMismatch { .. } => 400,
            Self::OverAllocation { .. } => 422,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyStatement | Self::AlreadyAllocated { .. } => "VALIDATION_ERROR",
            Self::NotBilling { .. } | Self::NotDraft { .. } | Self::AlreadyClaimed { .. } => {
                "INELIGIBLE_ITEM"
            }
            Self::NotFound(_) | Self::StatementNotFound { .. } => "NOT_FOUND",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::OverAllocation { .. } => "OVER_ALLOCATION",
            Self::AlreadyPosted { .. } => "ALREADY_POSTED",
        }
    }
}
