//! The unified engine error.
//!
//! Component errors converge here so callers see one taxonomy. Only
//! `ConcurrentModification` (and store unavailability) is worth an
//! automatic retry; everything else needs different input or a different
//! target.

use thiserror::Error;

use cartage_core::liquidation::error::LiquidationError;
use cartage_core::reconciliation::error::ReconciliationError;
use cartage_core::voucher::validation::VoucherValidationError;
use cartage_core::workflow::error::WorkflowError;
use cartage_shared::types::VoucherId;
use cartage_store::error::StoreError;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by the orchestrator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Workflow transition or authority failure.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Statement grouping or allocation failure.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Liquidation failure.
    #[error(transparent)]
    Liquidation(#[from] LiquidationError),

    /// Referenced voucher does not exist.
    #[error("Voucher {0} not found")]
    NotFound(VoucherId),

    /// An optimistic-lock conflict; the caller should re-read and retry.
    #[error("Voucher {voucher_id} was modified concurrently")]
    ConcurrentModification {
        /// The contested voucher.
        voucher_id: VoucherId,
    },

    /// The store is unavailable.
    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::VersionConflict { voucher_id, .. } => {
                Self::ConcurrentModification { voucher_id }
            }
            StoreError::DuplicateId(id) => Self::Store(format!("duplicate voucher id {id}")),
            StoreError::Unavailable(msg) => Self::Store(msg),
        }
    }
}

impl From<VoucherValidationError> for EngineError {
    fn from(err: VoucherValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl EngineError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Workflow(e) => e.status_code(),
            Self::Reconciliation(e) => e.status_code(),
            Self::Liquidation(e) => e.status_code(),
            Self::NotFound(_) => 404,
            Self::ConcurrentModification { .. } => 409,
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Workflow(e) => e.error_code(),
            Self::Reconciliation(e) => e.error_code(),
            Self::Liquidation(e) => e.error_code(),
            Self::NotFound(_) => "NOT_FOUND",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns true if the caller may retry the operation automatically.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. } | Self::Store(_))
    }
}
