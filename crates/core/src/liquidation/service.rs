//! Liquidation logic: matching expenses against approved advances.

use rust_decimal::Decimal;

use cartage_shared::types::Money;

use crate::liquidation::error::LiquidationError;
use crate::liquidation::types::{ExpenseEntry, LiquidationSummary};
use crate::voucher::types::{Voucher, VoucherStatus};

/// Stateless service for liquidation checks and derived usage.
pub struct LiquidationService;

impl LiquidationService {
    /// Validates that a voucher can anchor a liquidation.
    ///
    /// # Errors
    ///
    /// * `LiquidationError::ParentNotPosted` if the parent is not Posted
    /// * `LiquidationError::ParentWrongType` if it is not a budget request
    ///   or cash advance
    pub fn validate_parent(parent: &Voucher) -> Result<(), LiquidationError> {
        if !parent.transaction_type().is_liquidation_parent() {
            return Err(LiquidationError::ParentWrongType {
                parent_id: parent.id,
                actual: parent.transaction_type(),
            });
        }

        if parent.status != VoucherStatus::Posted {
            return Err(LiquidationError::ParentNotPosted {
                parent_id: parent.id,
                status: parent.status,
            });
        }

        Ok(())
    }

    /// Validates the expense entries of a liquidation request.
    ///
    /// # Errors
    ///
    /// * `LiquidationError::NoEntries` for an empty request
    /// * `LiquidationError::NonPositiveEntry` for a zero or negative amount
    pub fn validate_entries(entries: &[ExpenseEntry]) -> Result<(), LiquidationError> {
        if entries.is_empty() {
            return Err(LiquidationError::NoEntries);
        }

        for entry in entries {
            if entry.amount <= Decimal::ZERO {
                return Err(LiquidationError::NonPositiveEntry {
                    amount: entry.amount,
                });
            }
        }

        Ok(())
    }

    /// Derives the liquidation usage of a parent from its expense vouchers.
    ///
    /// Only Posted expenses referencing the parent count; drafts and
    /// pending liquidations are invisible here until they post.
    #[must_use]
    pub fn summarize(parent: &Voucher, expenses: &[Voucher]) -> LiquidationSummary {
        let posted: Vec<&Voucher> = expenses
            .iter()
            .filter(|e| {
                e.status == VoucherStatus::Posted && e.parent_voucher_id() == Some(parent.id)
            })
            .collect();

        let total_liquidated: Decimal = posted.iter().map(|e| e.amount).sum();

        LiquidationSummary {
            parent_id: parent.id,
            parent_amount: Money::new(parent.amount, parent.currency),
            total_liquidated: Money::new(total_liquidated, parent.currency),
            over_liquidated: Money::new(total_liquidated - parent.amount, parent.currency),
            posted_expense_count: posted.len(),
        }
    }
}
