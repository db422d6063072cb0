//! Statement grouping and collection reconciliation.
//!
//! Billing vouchers are grouped into statements of account, collections are
//! allocated against their remaining balances, and finalized statements are
//! posted to the general ledger exactly once.
//!
//! # Modules
//!
//! - `types` - Allocation outcomes
//! - `error` - Reconciliation-specific error types
//! - `service` - Eligibility, claiming, allocation, and finalize logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod allocation_props;

pub use error::ReconciliationError;
pub use service::ReconciliationService;
pub use types::AllocationOutcome;
