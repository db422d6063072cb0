//! Approval authority policy.
//!
//! Authority is a capability lookup over configured rules, not a hard-coded
//! department check: rules are matched by transaction type and amount band,
//! and resolve to an ordered chain of roles that must sign before a voucher
//! posts. When multiple rules match, the one with lowest priority value wins.

use rust_decimal::Decimal;

use cartage_shared::types::UserRole;

use crate::voucher::types::TransactionType;

/// An approval rule mapping a category of vouchers to a role chain.
#[derive(Debug, Clone)]
pub struct ApprovalRule {
    /// Human-readable name for the rule.
    pub name: String,
    /// Transaction types this rule applies to (empty = all types).
    pub transaction_types: Vec<TransactionType>,
    /// Minimum amount for this rule to apply (inclusive, None = no minimum).
    pub min_amount: Option<Decimal>,
    /// Maximum amount for this rule to apply (inclusive, None = no maximum).
    pub max_amount: Option<Decimal>,
    /// Ordered roles that must sign, in sequence.
    pub approval_chain: Vec<UserRole>,
    /// Priority for rule selection (lower = higher priority).
    pub priority: i16,
}

impl ApprovalRule {
    fn matches(&self, transaction_type: TransactionType, amount: Decimal) -> bool {
        let type_ok = self.transaction_types.is_empty()
            || self.transaction_types.contains(&transaction_type);
        let above_min = self.min_amount.is_none_or(|min| amount >= min);
        let below_max = self.max_amount.is_none_or(|max| amount <= max);
        type_ok && above_min && below_max
    }
}

/// Capability lookup deciding who can approve which voucher category.
#[derive(Debug, Clone)]
pub struct ApprovalPolicy {
    rules: Vec<ApprovalRule>,
}

impl ApprovalPolicy {
    /// Creates a policy from a set of rules.
    #[must_use]
    pub fn new(rules: Vec<ApprovalRule>) -> Self {
        Self { rules }
    }

    /// The default policy: one Accounting approval for every category.
    #[must_use]
    pub fn default_policy() -> Self {
        Self::new(vec![ApprovalRule {
            name: "Default".to_string(),
            transaction_types: vec![],
            min_amount: None,
            max_amount: None,
            approval_chain: vec![UserRole::Accounting],
            priority: 100,
        }])
    }

    /// Resolves the ordered role chain required for a voucher.
    ///
    /// Falls back to a single Accounting approval when no rule matches.
    #[must_use]
    pub fn required_chain(
        &self,
        transaction_type: TransactionType,
        amount: Decimal,
    ) -> Vec<UserRole> {
        let mut applicable: Vec<_> = self
            .rules
            .iter()
            .filter(|r| r.matches(transaction_type, amount))
            .collect();

        // Sort by priority (lower = higher priority)
        applicable.sort_by_key(|r| r.priority);
        let chain = applicable
            .first()
            .map_or_else(Vec::new, |r| r.approval_chain.clone());

        // A rule with an empty chain still needs one signature.
        if chain.is_empty() {
            vec![UserRole::Accounting]
        } else {
            chain
        }
    }

    /// The role required for the next signature, given how many have signed.
    ///
    /// A voucher with a fully signed chain has no next role.
    #[must_use]
    pub fn next_required_role(
        &self,
        transaction_type: TransactionType,
        amount: Decimal,
        approvals_so_far: usize,
    ) -> Option<UserRole> {
        self.required_chain(transaction_type, amount)
            .get(approvals_so_far)
            .copied()
    }

    /// Returns true if a single actor of `role` could satisfy the whole
    /// chain alone (required for auto-approval).
    #[must_use]
    pub fn satisfies_chain(
        &self,
        role: UserRole,
        transaction_type: TransactionType,
        amount: Decimal,
    ) -> bool {
        self.required_chain(transaction_type, amount)
            .iter()
            .all(|required| role >= *required)
    }
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self::default_policy()
    }
}
