//! Business rule validation for newly created vouchers.

use rust_decimal::Decimal;
use thiserror::Error;

use cartage_shared::types::VoucherId;

use super::types::{Voucher, VoucherKind};

/// Validation errors for voucher creation.
#[derive(Debug, Error)]
pub enum VoucherValidationError {
    /// Amount must be non-negative.
    #[error("Voucher amount must not be negative: {0}")]
    NegativeAmount(Decimal),

    /// A collection allocation must be positive.
    #[error("Allocation against billing {billing_id} must be positive: {amount}")]
    NonPositiveAllocation {
        /// The billing the allocation targets.
        billing_id: VoucherId,
        /// The offending amount.
        amount: Decimal,
    },

    /// A billing's remaining balance can never exceed its amount.
    #[error("Billing remaining balance {remaining} exceeds amount {amount}")]
    RemainingExceedsAmount {
        /// The stored remaining balance.
        remaining: Decimal,
        /// The voucher amount.
        amount: Decimal,
    },
}

/// Validates a voucher at creation time.
///
/// # Errors
///
/// Returns an error if the record violates the creation-time rules.
pub fn validate_new_voucher(voucher: &Voucher) -> Result<(), VoucherValidationError> {
    if voucher.amount < Decimal::ZERO {
        return Err(VoucherValidationError::NegativeAmount(voucher.amount));
    }

    match &voucher.kind {
        VoucherKind::Collection(detail) => {
            for link in &detail.linked_billings {
                if link.amount <= Decimal::ZERO {
                    return Err(VoucherValidationError::NonPositiveAllocation {
                        billing_id: link.billing_id,
                        amount: link.amount,
                    });
                }
            }
        }
        VoucherKind::Billing(detail) => {
            if detail.remaining_balance > voucher.amount {
                return Err(VoucherValidationError::RemainingExceedsAmount {
                    remaining: detail.remaining_balance,
                    amount: voucher.amount,
                });
            }
        }
        _ => {}
    }

    Ok(())
}
