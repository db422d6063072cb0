//! The voucher store contract.

use async_trait::async_trait;

use cartage_core::voucher::types::{TransactionType, Voucher};
use cartage_shared::types::VoucherId;

use crate::error::StoreError;

/// Durable keyed storage for voucher records with optimistic-concurrency
/// versioning.
///
/// Every mutating call is conditional on the version the writer read; a
/// mismatch fails with [`StoreError::VersionConflict`] and must never
/// silently apply a stale write. [`VoucherStore::update_batch`] is the
/// multi-record variant: all writes commit together or none do.
///
/// Counters behind [`VoucherStore::next_sequence`] are serialized per key
/// and never hand out the same value twice, even to concurrent callers;
/// values are not reclaimed when the requesting operation later fails.
#[async_trait]
pub trait VoucherStore: Send + Sync {
    /// Inserts a new voucher. The stored record gets version 1.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if the id is already present.
    async fn insert(&self, voucher: Voucher) -> Result<Voucher, StoreError>;

    /// Loads a voucher by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if absent.
    async fn get(&self, id: VoucherId) -> Result<Voucher, StoreError>;

    /// Conditionally replaces a voucher.
    ///
    /// Succeeds only while the stored version equals `expected_version`;
    /// the stored record's version becomes `expected_version + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] or [`StoreError::VersionConflict`].
    async fn update(&self, voucher: Voucher, expected_version: u64)
    -> Result<Voucher, StoreError>;

    /// Conditionally replaces several vouchers in one atomic step.
    ///
    /// Either every record passes its version check and all are written,
    /// or nothing is written at all.
    ///
    /// # Errors
    ///
    /// Returns the first failing record's [`StoreError::NotFound`] or
    /// [`StoreError::VersionConflict`]; the store is left unchanged.
    async fn update_batch(
        &self,
        updates: Vec<(Voucher, u64)>,
    ) -> Result<Vec<Voucher>, StoreError>;

    /// Lists vouchers of a transaction type, in creation order.
    async fn find_by_type(
        &self,
        transaction_type: TransactionType,
    ) -> Result<Vec<Voucher>, StoreError>;

    /// Lists billing vouchers belonging to a statement, in creation order.
    async fn find_by_statement(&self, statement_reference: &str)
    -> Result<Vec<Voucher>, StoreError>;

    /// Lists expense vouchers liquidating a parent, in creation order.
    async fn find_by_parent(&self, parent_id: VoucherId) -> Result<Vec<Voucher>, StoreError>;

    /// Returns the next value of the counter behind `key`, starting at 1.
    async fn next_sequence(&self, key: &str) -> Result<u64, StoreError>;
}
