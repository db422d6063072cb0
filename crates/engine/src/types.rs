//! Request and response shapes for the engine operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartage_core::voucher::types::{LinkedBilling, TransactionType, Voucher};
use cartage_shared::types::{Currency, CustomerId, VoucherId};

/// Input for creating a voucher.
///
/// The caller names the transaction type; the engine folds the
/// axis-specific fields into the record's tagged payload and rejects
/// fields that do not belong to the chosen type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVoucherInput {
    /// The transaction type to create.
    pub transaction_type: TransactionType,
    /// Origin system tag, informational only.
    pub source_module: String,
    /// Monetary amount, non-negative.
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: Currency,
    /// Free-text purpose.
    pub purpose: String,
    /// Vendor, if any.
    #[serde(default)]
    pub vendor_name: Option<String>,
    /// Customer, if any.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    /// Customer display name, if any.
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Project reference, if any.
    #[serde(default)]
    pub project_number: Option<String>,
    /// Allocations against billings; collections only.
    #[serde(default)]
    pub linked_billings: Vec<LinkedBilling>,
}

impl CreateVoucherInput {
    /// A minimal input with only the required fields set.
    #[must_use]
    pub fn new(
        transaction_type: TransactionType,
        source_module: impl Into<String>,
        amount: Decimal,
        currency: Currency,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            transaction_type,
            source_module: source_module.into(),
            amount,
            currency,
            purpose: purpose.into(),
            vendor_name: None,
            customer_id: None,
            customer_name: None,
            project_number: None,
            linked_billings: Vec::new(),
        }
    }
}

/// Result of generating a statement of account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementResult {
    /// The newly allocated statement reference.
    pub statement_reference: String,
    /// The member vouchers, as persisted.
    pub members: Vec<Voucher>,
}

/// Result of finalizing a statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeResult {
    /// The finalized statement.
    pub statement_reference: String,
    /// Always true on success; the operation is terminal.
    pub posted: bool,
}

/// Result of an auto-approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoApproveResult {
    /// The voucher, already Posted.
    pub voucher: Voucher,
    /// Set when the posted voucher is an expense.
    pub posted_expense_id: Option<VoucherId>,
}
