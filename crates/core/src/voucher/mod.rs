//! The polymorphic voucher record.
//!
//! Every financial event in the company (expense, budget request, cash
//! advance, billing, collection, adjustment, reimbursement) is one voucher
//! record. Axis-specific fields live in a `transaction_type`-keyed payload so
//! illegal combinations (e.g. linked billings on an expense) are
//! unrepresentable.
//!
//! # Modules
//!
//! - `types` - Voucher record, status enums, audit entries
//! - `validation` - Creation-time business rule checks

pub mod types;
pub mod validation;

pub use types::{
    Approver, BillingDetail, BillingStatus, CollectionDetail, HistoryEntry, LinkedBilling,
    TransactionType, Voucher, VoucherAction, VoucherKind, VoucherStatus,
};
pub use validation::{VoucherValidationError, validate_new_voucher};
