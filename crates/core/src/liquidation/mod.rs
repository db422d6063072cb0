//! Liquidation of expenses against approved advances.
//!
//! # Modules
//!
//! - `types` - Expense entries and the derived usage summary
//! - `error` - Liquidation-specific error types
//! - `service` - Parent validation and usage derivation

pub mod error;
pub mod service;
pub mod types;

pub use error::LiquidationError;
pub use service::LiquidationService;
pub use types::{ExpenseEntry, LiquidationSummary};
