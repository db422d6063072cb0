//! In-memory voucher store.
//!
//! Reference implementation of [`VoucherStore`]: a single record table
//! behind an async `RwLock` for conditional single and batch writes, and a
//! `DashMap` of per-key counters for sequence generation. Real backends
//! must preserve these semantics, in particular the all-or-nothing batch
//! write and the never-reused counters.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;

use cartage_core::voucher::types::{TransactionType, Voucher};
use cartage_shared::types::VoucherId;

use crate::error::StoreError;
use crate::store::VoucherStore;

/// In-memory implementation of [`VoucherStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    vouchers: RwLock<HashMap<VoucherId, Voucher>>,
    sequences: DashMap<String, u64>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored vouchers.
    pub async fn len(&self) -> usize {
        self.vouchers.read().await.len()
    }

    /// Returns true if the store holds no vouchers.
    pub async fn is_empty(&self) -> bool {
        self.vouchers.read().await.is_empty()
    }

    fn sorted(mut vouchers: Vec<Voucher>) -> Vec<Voucher> {
        // UUIDv7 ids are time-ordered, which gives creation order.
        vouchers.sort_by_key(|v| v.id.into_inner());
        vouchers
    }
}

#[async_trait]
impl VoucherStore for MemoryStore {
    async fn insert(&self, mut voucher: Voucher) -> Result<Voucher, StoreError> {
        let mut map = self.vouchers.write().await;
        if map.contains_key(&voucher.id) {
            return Err(StoreError::DuplicateId(voucher.id));
        }
        voucher.version = 1;
        map.insert(voucher.id, voucher.clone());
        Ok(voucher)
    }

    async fn get(&self, id: VoucherId) -> Result<Voucher, StoreError> {
        self.vouchers
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(
        &self,
        mut voucher: Voucher,
        expected_version: u64,
    ) -> Result<Voucher, StoreError> {
        let mut map = self.vouchers.write().await;
        let stored = map
            .get(&voucher.id)
            .ok_or(StoreError::NotFound(voucher.id))?;

        if stored.version != expected_version {
            tracing::warn!(
                voucher_id = %voucher.id,
                expected = expected_version,
                actual = stored.version,
                "conditional write lost against a concurrent writer"
            );
            return Err(StoreError::VersionConflict {
                voucher_id: voucher.id,
                expected: expected_version,
                actual: stored.version,
            });
        }

        voucher.version = expected_version + 1;
        map.insert(voucher.id, voucher.clone());
        Ok(voucher)
    }

    async fn update_batch(
        &self,
        updates: Vec<(Voucher, u64)>,
    ) -> Result<Vec<Voucher>, StoreError> {
        let mut map = self.vouchers.write().await;

        // Stage every write first; nothing lands in the table until all
        // version checks have passed.
        let ids: Vec<VoucherId> = updates.iter().map(|(v, _)| v.id).collect();
        let mut staged: HashMap<VoucherId, Voucher> = HashMap::new();

        for (mut voucher, expected_version) in updates {
            let current_version = staged
                .get(&voucher.id)
                .or_else(|| map.get(&voucher.id))
                .map(|v| v.version)
                .ok_or(StoreError::NotFound(voucher.id))?;

            if current_version != expected_version {
                tracing::warn!(
                    voucher_id = %voucher.id,
                    expected = expected_version,
                    actual = current_version,
                    "batch write lost against a concurrent writer"
                );
                return Err(StoreError::VersionConflict {
                    voucher_id: voucher.id,
                    expected: expected_version,
                    actual: current_version,
                });
            }

            voucher.version = expected_version + 1;
            staged.insert(voucher.id, voucher);
        }

        for voucher in staged.into_values() {
            map.insert(voucher.id, voucher);
        }

        ids.into_iter()
            .map(|id| map.get(&id).cloned().ok_or(StoreError::NotFound(id)))
            .collect()
    }

    async fn find_by_type(
        &self,
        transaction_type: TransactionType,
    ) -> Result<Vec<Voucher>, StoreError> {
        let map = self.vouchers.read().await;
        Ok(Self::sorted(
            map.values()
                .filter(|v| v.transaction_type() == transaction_type)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_statement(
        &self,
        statement_reference: &str,
    ) -> Result<Vec<Voucher>, StoreError> {
        let map = self.vouchers.read().await;
        Ok(Self::sorted(
            map.values()
                .filter(|v| {
                    v.billing()
                        .and_then(|d| d.statement_reference.as_deref())
                        == Some(statement_reference)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_parent(&self, parent_id: VoucherId) -> Result<Vec<Voucher>, StoreError> {
        let map = self.vouchers.read().await;
        Ok(Self::sorted(
            map.values()
                .filter(|v| v.parent_voucher_id() == Some(parent_id))
                .cloned()
                .collect(),
        ))
    }

    async fn next_sequence(&self, key: &str) -> Result<u64, StoreError> {
        let mut counter = self.sequences.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
