//! Liquidation domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartage_shared::types::{Money, VoucherId};

/// One expense line to be created against an advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    /// The expense amount.
    pub amount: Decimal,
    /// Free-text purpose.
    pub purpose: String,
    /// Vendor, if any.
    pub vendor_name: Option<String>,
    /// Project reference, if any.
    pub project_number: Option<String>,
}

/// Derived usage of an advance, never stored.
///
/// `over_liquidated` is positive when more has been posted against the
/// parent than it granted, negative while the advance is under-used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationSummary {
    /// The budget request or cash advance.
    pub parent_id: VoucherId,
    /// The granted amount.
    pub parent_amount: Money,
    /// Sum of posted expenses referencing the parent.
    pub total_liquidated: Money,
    /// `total_liquidated - parent_amount`.
    pub over_liquidated: Money,
    /// Number of posted expenses counted.
    pub posted_expense_count: usize,
}

impl LiquidationSummary {
    /// Returns true if posted expenses exceed the granted amount.
    #[must_use]
    pub fn is_overspent(&self) -> bool {
        self.over_liquidated.amount > Decimal::ZERO
    }
}
