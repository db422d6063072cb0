//! Identifier prefixes, sequence keys, and rendering.

use chrono::{Datelike, NaiveDate};

use crate::voucher::types::TransactionType;

/// The kind of identifier being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    /// A voucher number for the given transaction type.
    Voucher(TransactionType),
    /// A statement-of-account reference.
    Statement,
}

impl NumberKind {
    /// Returns the identifier prefix.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Voucher(TransactionType::Expense) => "EXP",
            Self::Voucher(TransactionType::BudgetRequest) => "BRQ",
            Self::Voucher(TransactionType::CashAdvance) => "CAV",
            Self::Voucher(TransactionType::Collection) => "COL",
            Self::Voucher(TransactionType::Billing) => "BIL",
            Self::Voucher(TransactionType::Adjustment) => "ADJ",
            Self::Voucher(TransactionType::Reimbursement) => "RMB",
            Self::Statement => "SOA",
        }
    }

    /// Returns the counter key for this kind and date.
    ///
    /// Voucher counters roll over per year, statement counters per day.
    /// A key is never shared between two kinds.
    #[must_use]
    pub fn sequence_key(&self, date: NaiveDate) -> String {
        match self {
            Self::Voucher(_) => format!("{}-{}", self.prefix(), date.year()),
            Self::Statement => format!("{}-{}", self.prefix(), date.format("%Y%m%d")),
        }
    }
}

/// Renders an identifier from its parts.
///
/// The sequence is zero-padded to `seq_width` digits; sequences that
/// outgrow the width keep all their digits rather than truncate.
#[must_use]
pub fn format_identifier(kind: NumberKind, date: NaiveDate, seq: u64, seq_width: usize) -> String {
    match kind {
        NumberKind::Voucher(_) => {
            format!("{}-{}-{:0width$}", kind.prefix(), date.year(), seq, width = seq_width)
        }
        NumberKind::Statement => format!(
            "{}-{}-{:0width$}",
            kind.prefix(),
            date.format("%Y%m%d"),
            seq,
            width = seq_width
        ),
    }
}
