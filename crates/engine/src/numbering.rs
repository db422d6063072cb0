//! Identifier generation bound to the store's counters.

use std::sync::Arc;

use chrono::NaiveDate;

use cartage_core::numbering::format::{NumberKind, format_identifier};
use cartage_shared::config::NumberingConfig;
use cartage_store::error::StoreError;
use cartage_store::store::VoucherStore;

/// Generates collision-free, human-readable identifiers.
///
/// Uniqueness comes from the store's serialized counter per
/// `(kind, period)` key; a consumed value is never reissued, even when the
/// request that consumed it later fails.
#[derive(Debug, Clone)]
pub struct NumberingService<S> {
    store: Arc<S>,
    config: NumberingConfig,
}

impl<S: VoucherStore> NumberingService<S> {
    /// Creates a numbering service over a store.
    pub fn new(store: Arc<S>, config: NumberingConfig) -> Self {
        Self { store, config }
    }

    /// Produces the next identifier of the given kind for a date.
    ///
    /// # Errors
    ///
    /// Fails only on store unavailability.
    pub async fn next(&self, kind: NumberKind, date: NaiveDate) -> Result<String, StoreError> {
        let key = kind.sequence_key(date);
        let seq = self.store.next_sequence(&key).await?;
        let width = match kind {
            NumberKind::Voucher(_) => self.config.voucher_seq_width,
            NumberKind::Statement => self.config.statement_seq_width,
        };
        Ok(format_identifier(kind, date, seq, width))
    }
}
