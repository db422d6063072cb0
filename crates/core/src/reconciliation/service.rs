//! Reconciliation logic for statements and collections.
//!
//! Pure record-level operations: the orchestrator loads the vouchers,
//! applies these functions, and persists the results in one conditional
//! batch write. Nothing here touches storage.

use chrono::Utc;
use rust_decimal::Decimal;

use cartage_shared::types::Actor;

use crate::reconciliation::error::ReconciliationError;
use crate::reconciliation::types::AllocationOutcome;
use crate::voucher::types::{
    BillingStatus, HistoryEntry, TransactionType, Voucher, VoucherAction, VoucherKind,
    VoucherStatus,
};

/// Stateless service for statement grouping and collection allocation.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Checks whether a voucher can join a new statement.
    ///
    /// Eligibility is exactly: billing type, Draft status, and no existing
    /// statement reference.
    ///
    /// # Errors
    ///
    /// Returns the specific ineligibility as an error.
    pub fn check_statement_eligibility(voucher: &Voucher) -> Result<(), ReconciliationError> {
        let detail = match &voucher.kind {
            VoucherKind::Billing(detail) => detail,
            _ => {
                return Err(ReconciliationError::NotBilling {
                    voucher_id: voucher.id,
                });
            }
        };

        if voucher.status != VoucherStatus::Draft {
            return Err(ReconciliationError::NotDraft {
                voucher_id: voucher.id,
                status: voucher.status,
            });
        }

        if let Some(reference) = &detail.statement_reference {
            return Err(ReconciliationError::AlreadyClaimed {
                voucher_id: voucher.id,
                statement_reference: reference.clone(),
            });
        }

        Ok(())
    }

    /// Claims a billing voucher for a statement.
    ///
    /// Sets the statement reference, marks the billing axis billed with the
    /// full amount outstanding, and moves the approval axis Draft → Pending
    /// with one audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher is not eligible (see
    /// [`Self::check_statement_eligibility`]).
    pub fn claim_for_statement(
        voucher: &mut Voucher,
        statement_reference: &str,
        actor: &Actor,
    ) -> Result<(), ReconciliationError> {
        Self::check_statement_eligibility(voucher)?;

        let amount = voucher.amount;
        if let VoucherKind::Billing(detail) = &mut voucher.kind {
            detail.statement_reference = Some(statement_reference.to_string());
            detail.billing_status = BillingStatus::Billed;
            detail.remaining_balance = amount;
        }

        let now = Utc::now();
        voucher.workflow_history.push(HistoryEntry {
            occurred_at: now,
            from_status: VoucherStatus::Draft,
            to_status: VoucherStatus::Pending,
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            action: VoucherAction::GenerateStatement,
            remarks: Some(statement_reference.to_string()),
        });
        voucher.status = VoucherStatus::Pending;
        voucher.updated_at = now;

        Ok(())
    }

    /// Applies one allocation step against a billing voucher.
    ///
    /// Decrements the remaining balance and recomputes the payment status:
    /// `paid` once the residual is within the settlement tolerance,
    /// `partial` while something has been collected, unchanged otherwise.
    ///
    /// # Errors
    ///
    /// * `ReconciliationError::TypeMismatch` if the voucher is not a billing
    /// * `ReconciliationError::OverAllocation` if the amount exceeds the
    ///   remaining balance
    pub fn apply_allocation(
        billing: &mut Voucher,
        amount: Decimal,
        settlement_tolerance: Decimal,
    ) -> Result<AllocationOutcome, ReconciliationError> {
        let total = billing.amount;
        let billing_id = billing.id;

        let detail = match &mut billing.kind {
            VoucherKind::Billing(detail) => detail,
            other => {
                return Err(ReconciliationError::TypeMismatch {
                    voucher_id: billing_id,
                    expected: TransactionType::Billing,
                    actual: other.transaction_type(),
                });
            }
        };

        if amount > detail.remaining_balance {
            return Err(ReconciliationError::OverAllocation {
                billing_id,
                requested: amount,
                remaining: detail.remaining_balance,
            });
        }

        detail.remaining_balance -= amount;
        let remaining = detail.remaining_balance;

        if remaining <= settlement_tolerance {
            detail.billing_status = BillingStatus::Paid;
        } else if remaining < total {
            detail.billing_status = BillingStatus::Partial;
        }

        let outcome = AllocationOutcome {
            remaining_balance: remaining,
            billing_status: detail.billing_status,
        };

        billing.updated_at = Utc::now();
        Ok(outcome)
    }

    /// Checks that a statement can be finalized.
    ///
    /// # Errors
    ///
    /// * `ReconciliationError::StatementNotFound` if no members exist
    /// * `ReconciliationError::AlreadyPosted` if any member has already been
    ///   posted to the ledger
    pub fn check_finalizable(
        members: &[Voucher],
        statement_reference: &str,
    ) -> Result<(), ReconciliationError> {
        if members.is_empty() {
            return Err(ReconciliationError::StatementNotFound {
                statement_reference: statement_reference.to_string(),
            });
        }

        let already_posted = members
            .iter()
            .any(|m| m.billing().is_some_and(|d| d.posted_to_ledger));
        if already_posted {
            return Err(ReconciliationError::AlreadyPosted {
                statement_reference: statement_reference.to_string(),
            });
        }

        Ok(())
    }

    /// Finalizes one statement member.
    ///
    /// Marks the billing posted to the ledger and, if the approval axis is
    /// still Pending, moves it to Posted with one audit entry.
    ///
    /// # Errors
    ///
    /// Returns `ReconciliationError::NotBilling` if the voucher carries no
    /// billing axis.
    pub fn finalize_member(
        voucher: &mut Voucher,
        actor: &Actor,
    ) -> Result<(), ReconciliationError> {
        let voucher_id = voucher.id;
        match &mut voucher.kind {
            VoucherKind::Billing(detail) => detail.posted_to_ledger = true,
            _ => return Err(ReconciliationError::NotBilling { voucher_id }),
        }

        let now = Utc::now();
        if voucher.status == VoucherStatus::Pending {
            voucher.workflow_history.push(HistoryEntry {
                occurred_at: now,
                from_status: VoucherStatus::Pending,
                to_status: VoucherStatus::Posted,
                actor_id: actor.id,
                actor_name: actor.name.clone(),
                action: VoucherAction::FinalizeStatement,
                remarks: None,
            });
            voucher.status = VoucherStatus::Posted;
        }
        voucher.updated_at = now;

        Ok(())
    }
}
