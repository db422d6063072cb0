//! Voucher domain types.
//!
//! This module defines the single polymorphic transaction record and the
//! enums spanning its approval and billing axes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use cartage_shared::types::{ActorId, Currency, CustomerId, Money, UserRole, VoucherId};

/// Transaction type classification.
///
/// Determines which axis-specific payload a voucher carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Operating expense, possibly liquidating an advance.
    Expense,
    /// Budget request awaiting release.
    BudgetRequest,
    /// Cash advance to an employee.
    CashAdvance,
    /// Customer payment allocated against billings.
    Collection,
    /// Receivable billed to a customer.
    Billing,
    /// Manual adjustment entry.
    Adjustment,
    /// Employee reimbursement.
    Reimbursement,
}

impl TransactionType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::BudgetRequest => "budget_request",
            Self::CashAdvance => "cash_advance",
            Self::Collection => "collection",
            Self::Billing => "billing",
            Self::Adjustment => "adjustment",
            Self::Reimbursement => "reimbursement",
        }
    }

    /// Parses a transaction type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "expense" => Some(Self::Expense),
            "budget_request" => Some(Self::BudgetRequest),
            "cash_advance" => Some(Self::CashAdvance),
            "collection" => Some(Self::Collection),
            "billing" => Some(Self::Billing),
            "adjustment" => Some(Self::Adjustment),
            "reimbursement" => Some(Self::Reimbursement),
            _ => None,
        }
    }

    /// Returns true if vouchers of this type can anchor a liquidation.
    #[must_use]
    pub fn is_liquidation_parent(&self) -> bool {
        matches!(self, Self::BudgetRequest | Self::CashAdvance)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Voucher status on the approval axis.
///
/// Vouchers progress through these states from creation to posting.
/// The valid transitions are:
/// - Draft → Pending (submit, generate-statement)
/// - Draft → Posted (auto-approve)
/// - Pending → Posted (approve, finalize-statement)
/// - Pending → Rejected (reject)
/// - Draft/Pending → Cancelled (cancel)
///
/// Posted, Rejected, and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Voucher is being drafted and can be modified.
    Draft,
    /// Voucher has been submitted for approval.
    Pending,
    /// Voucher has been approved and posted (immutable approval axis).
    Posted,
    /// Voucher was rejected by an approver (terminal).
    Rejected,
    /// Voucher was cancelled before posting (terminal).
    Cancelled,
}

impl VoucherStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Posted => "posted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    ///
    /// Accepts the legacy aliases still emitted by older screens
    /// ("approved", "for_approval", "void").
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" | "new" => Some(Self::Draft),
            "pending" | "for_approval" => Some(Self::Pending),
            "posted" | "approved" => Some(Self::Posted),
            "rejected" | "disapproved" => Some(Self::Rejected),
            "cancelled" | "canceled" | "void" | "voided" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further status transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Posted | Self::Rejected | Self::Cancelled)
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment progress of a billing voucher (independent of the approval axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingStatus {
    /// Not yet grouped into a statement.
    Unbilled,
    /// Grouped into a statement, nothing collected.
    Billed,
    /// Partially collected.
    Partial,
    /// Fully collected (within the settlement tolerance).
    Paid,
}

impl BillingStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unbilled => "unbilled",
            Self::Billed => "billed",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The action recorded by a workflow history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherAction {
    /// Draft submitted for approval.
    Submit,
    /// Approval signed (may or may not post, depending on the chain).
    Approve,
    /// Draft approved and posted in one step.
    AutoApprove,
    /// Pending voucher rejected.
    Reject,
    /// Draft or pending voucher cancelled.
    Cancel,
    /// Billing claimed by a statement (Draft → Pending).
    GenerateStatement,
    /// Statement finalized to the ledger (Pending → Posted).
    FinalizeStatement,
}

impl VoucherAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::AutoApprove => "auto_approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::GenerateStatement => "generate_statement",
            Self::FinalizeStatement => "finalize_statement",
        }
    }
}

impl fmt::Display for VoucherAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable entry in a voucher's append-only workflow history.
///
/// Written in the same conditional store write as the status change it
/// records; this is the sole audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the transition occurred.
    pub occurred_at: DateTime<Utc>,
    /// Status before the transition.
    pub from_status: VoucherStatus,
    /// Status after the transition.
    pub to_status: VoucherStatus,
    /// The actor who performed the transition.
    pub actor_id: ActorId,
    /// The actor's display name at the time of the transition.
    pub actor_name: String,
    /// The action performed.
    pub action: VoucherAction,
    /// Optional remarks (required for rejections).
    pub remarks: Option<String>,
}

/// A registered approval on a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    /// The approver's id.
    pub id: ActorId,
    /// The approver's display name.
    pub name: String,
    /// The role the approver signed under.
    pub role: UserRole,
    /// When the approval was signed.
    pub approved_at: DateTime<Utc>,
    /// Optional remarks.
    pub remarks: Option<String>,
}

/// One allocation of a collection against a billing voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedBilling {
    /// The billing voucher being paid down.
    pub billing_id: VoucherId,
    /// Allocated amount, always positive.
    pub amount: Decimal,
}

/// Billing-axis fields, present only on billing vouchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetail {
    /// Payment progress.
    pub billing_status: BillingStatus,
    /// Statement this billing belongs to, once grouped.
    pub statement_reference: Option<String>,
    /// Amount still owed after all collection allocations.
    pub remaining_balance: Decimal,
    /// Set once the owning statement has been finalized to the ledger.
    pub posted_to_ledger: bool,
}

impl BillingDetail {
    /// A fresh, ungrouped billing detail for the given voucher amount.
    #[must_use]
    pub fn unbilled(amount: Decimal) -> Self {
        Self {
            billing_status: BillingStatus::Unbilled,
            statement_reference: None,
            remaining_balance: amount,
            posted_to_ledger: false,
        }
    }
}

/// Collection-axis fields, present only on collection vouchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDetail {
    /// Ordered allocations against billing vouchers.
    pub linked_billings: Vec<LinkedBilling>,
    /// When the allocations were applied; a collection allocates once.
    pub allocated_at: Option<DateTime<Utc>>,
}

impl CollectionDetail {
    /// A new, unallocated collection detail.
    #[must_use]
    pub fn new(linked_billings: Vec<LinkedBilling>) -> Self {
        Self {
            linked_billings,
            allocated_at: None,
        }
    }
}

/// Axis-specific payload, keyed by transaction type.
///
/// Modeled as a tagged variant rather than nullable columns so that a
/// collection's allocations can never appear on an expense, and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transaction_type", rename_all = "snake_case")]
pub enum VoucherKind {
    /// Operating expense; `parent_voucher_id` links a liquidation to its
    /// approved advance and is immutable once set.
    Expense {
        /// The posted budget request or cash advance being liquidated.
        parent_voucher_id: Option<VoucherId>,
    },
    /// Budget request.
    BudgetRequest,
    /// Cash advance.
    CashAdvance,
    /// Customer billing with its payment axis.
    Billing(BillingDetail),
    /// Customer collection with its allocations.
    Collection(CollectionDetail),
    /// Manual adjustment.
    Adjustment,
    /// Employee reimbursement.
    Reimbursement,
}

impl VoucherKind {
    /// Returns the transaction type this payload belongs to.
    #[must_use]
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Expense { .. } => TransactionType::Expense,
            Self::BudgetRequest => TransactionType::BudgetRequest,
            Self::CashAdvance => TransactionType::CashAdvance,
            Self::Billing(_) => TransactionType::Billing,
            Self::Collection(_) => TransactionType::Collection,
            Self::Adjustment => TransactionType::Adjustment,
            Self::Reimbursement => TransactionType::Reimbursement,
        }
    }
}

/// The single polymorphic transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Opaque identity.
    pub id: VoucherId,
    /// Human-readable identifier, immutable once assigned.
    pub voucher_number: String,
    /// Origin system tag, informational only.
    pub source_module: String,
    /// Monetary amount, non-negative.
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: Currency,
    /// The requestor (owner) of the voucher.
    pub requestor_id: ActorId,
    /// The requestor's display name.
    pub requestor_name: String,
    /// Vendor, if any.
    pub vendor_name: Option<String>,
    /// Customer, if any.
    pub customer_id: Option<CustomerId>,
    /// Customer display name, if any.
    pub customer_name: Option<String>,
    /// Project reference, if any.
    pub project_number: Option<String>,
    /// Free-text purpose.
    pub purpose: String,
    /// Approval-axis status.
    pub status: VoucherStatus,
    /// Ordered list of registered approvals.
    pub approvers: Vec<Approver>,
    /// Append-only audit log; one entry per successful transition.
    pub workflow_history: Vec<HistoryEntry>,
    /// Axis-specific payload.
    #[serde(flatten)]
    pub kind: VoucherKind,
    /// Optimistic-concurrency version, bumped by the store on every write.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Voucher {
    /// Returns the voucher's transaction type.
    #[must_use]
    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    /// Returns the amount and currency as a `Money` value.
    #[must_use]
    pub fn money(&self) -> Money {
        Money::new(self.amount, self.currency)
    }

    /// Returns the billing axis, if this is a billing voucher.
    #[must_use]
    pub fn billing(&self) -> Option<&BillingDetail> {
        match &self.kind {
            VoucherKind::Billing(detail) => Some(detail),
            _ => None,
        }
    }

    /// Returns the mutable billing axis, if this is a billing voucher.
    pub fn billing_mut(&mut self) -> Option<&mut BillingDetail> {
        match &mut self.kind {
            VoucherKind::Billing(detail) => Some(detail),
            _ => None,
        }
    }

    /// Returns the collection axis, if this is a collection voucher.
    #[must_use]
    pub fn collection(&self) -> Option<&CollectionDetail> {
        match &self.kind {
            VoucherKind::Collection(detail) => Some(detail),
            _ => None,
        }
    }

    /// Returns the mutable collection axis, if this is a collection voucher.
    pub fn collection_mut(&mut self) -> Option<&mut CollectionDetail> {
        match &mut self.kind {
            VoucherKind::Collection(detail) => Some(detail),
            _ => None,
        }
    }

    /// Returns the liquidated parent, if this is an expense consuming one.
    #[must_use]
    pub fn parent_voucher_id(&self) -> Option<VoucherId> {
        match &self.kind {
            VoucherKind::Expense { parent_voucher_id } => *parent_voucher_id,
            _ => None,
        }
    }
}
