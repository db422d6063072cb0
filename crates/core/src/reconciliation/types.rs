//! Reconciliation domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::voucher::types::BillingStatus;

/// The result of applying one allocation step to a billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    /// The billing's balance after the allocation.
    pub remaining_balance: Decimal,
    /// The billing's recomputed payment status.
    pub billing_status: BillingStatus,
}
