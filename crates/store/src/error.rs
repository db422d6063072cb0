//! Store error types.

use thiserror::Error;

use cartage_shared::types::VoucherId;

/// Errors surfaced by a voucher store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No voucher exists under the given id.
    #[error("Voucher {0} not found")]
    NotFound(VoucherId),

    /// A voucher with this id already exists.
    #[error("Voucher {0} already exists")]
    DuplicateId(VoucherId),

    /// A conditional write lost against a concurrent writer.
    #[error("Voucher {voucher_id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        /// The contested voucher.
        voucher_id: VoucherId,
        /// The version the writer read.
        expected: u64,
        /// The version actually stored.
        actual: u64,
    },

    /// The backing store is unavailable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if the operation may be retried as-is after a re-read.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. } | Self::Unavailable(_))
    }
}
