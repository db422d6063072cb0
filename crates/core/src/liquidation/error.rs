//! Liquidation error types.

use rust_decimal::Decimal;
use thiserror::Error;

use cartage_shared::types::VoucherId;

use crate::voucher::types::{TransactionType, VoucherStatus};

/// Errors that can occur while liquidating against an advance.
#[derive(Debug, Error)]
pub enum LiquidationError {
    /// The referenced parent voucher does not exist.
    #[error("Liquidation parent {0} not found")]
    ParentNotFound(VoucherId),

    /// The parent voucher has not been posted.
    #[error("Liquidation parent {parent_id} is not posted: {status}")]
    ParentNotPosted {
        /// The parent voucher.
        parent_id: VoucherId,
        /// Its current status.
        status: VoucherStatus,
    },

    /// The parent voucher is not a budget request or cash advance.
    #[error("Liquidation parent {parent_id} is a {actual}, not an advance")]
    ParentWrongType {
        /// The parent voucher.
        parent_id: VoucherId,
        /// The type found.
        actual: TransactionType,
    },

    /// A liquidation needs at least one expense entry.
    #[error("Liquidation requires at least one expense entry")]
    NoEntries,

    /// Expense entry amounts must be positive.
    #[error("Expense entry amount must be positive: {amount}")]
    NonPositiveEntry {
        /// The offending amount.
        amount: Decimal,
    },
}

impl LiquidationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ParentNotFound(_)
            | Self::ParentNotPosted { .. }
            | Self::ParentWrongType { .. } => 422,
            Self::NoEntries | Self::NonPositiveEntry { .. } => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ParentNotFound(_)
            | Self::ParentNotPosted { .. }
            | Self::ParentWrongType { .. } => "INVALID_PARENT",
            Self::NoEntries | Self::NonPositiveEntry { .. } => "VALIDATION_ERROR",
        }
    }
}
