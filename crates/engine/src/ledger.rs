//! General-ledger posting seam.
//!
//! Finalizing a statement emits one ledger-posting side effect. The ledger
//! itself is an external collaborator; the engine only guarantees the call
//! happens exactly once per statement. Implementations must accept the
//! posting durably (e.g. enqueue it) rather than fail, since the member
//! records are already committed when the call is made.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use cartage_core::voucher::types::Voucher;

/// Receiver for finalized statements.
#[async_trait]
pub trait GeneralLedger: Send + Sync {
    /// Accepts the one-time posting of a finalized statement.
    async fn post_statement(&self, statement_reference: &str, members: &[Voucher]);
}

/// Ledger that drops postings, for wiring the engine without one.
#[derive(Debug, Default)]
pub struct NullLedger;

#[async_trait]
impl GeneralLedger for NullLedger {
    async fn post_statement(&self, statement_reference: &str, members: &[Voucher]) {
        tracing::debug!(
            statement_reference,
            member_count = members.len(),
            "dropping ledger posting (null ledger)"
        );
    }
}

/// Ledger that records postings, for asserting exactly-once behavior.
#[derive(Debug, Default)]
pub struct RecordingLedger {
    posts: AtomicUsize,
    references: Mutex<Vec<String>>,
}

impl RecordingLedger {
    /// Creates an empty recording ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of statements posted so far.
    #[must_use]
    pub fn post_count(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }

    /// References posted so far, in order.
    #[must_use]
    pub fn references(&self) -> Vec<String> {
        self.references
            .lock()
            .map(|refs| refs.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GeneralLedger for RecordingLedger {
    async fn post_statement(&self, statement_reference: &str, _members: &[Voucher]) {
        self.posts.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut refs) = self.references.lock() {
            refs.push(statement_reference.to_string());
        }
    }
}
