//! Voucher workflow state machine.
//!
//! This module implements the core state machine for moving vouchers
//! through the approval workflow. Methods validate a requested transition
//! against the current record and actor, returning a `WorkflowAction`
//! that [`WorkflowService::apply`] turns into exactly one status change
//! plus one audit entry.

use chrono::Utc;

use cartage_shared::types::Actor;

use crate::voucher::types::{
    Approver, HistoryEntry, Voucher, VoucherAction, VoucherStatus,
};
use crate::workflow::error::WorkflowError;
use crate::workflow::policy::ApprovalPolicy;
use crate::workflow::types::WorkflowAction;

/// Stateless service for validating and applying workflow transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Submit a draft voucher for approval.
    ///
    /// Only the requestor (owner) may submit.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InvalidTransition` if the voucher is not in Draft
    /// * `WorkflowError::NotRequestor` if the actor does not own the voucher
    pub fn submit(voucher: &Voucher, actor: &Actor) -> Result<WorkflowAction, WorkflowError> {
        if voucher.status != VoucherStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                from: voucher.status,
                to: VoucherStatus::Pending,
            });
        }

        if actor.id != voucher.requestor_id {
            return Err(WorkflowError::NotRequestor { actor_id: actor.id });
        }

        Ok(WorkflowAction::Submit {
            new_status: VoucherStatus::Pending,
            submitted_by: actor.id,
            submitted_by_name: actor.name.clone(),
            submitted_at: Utc::now(),
        })
    }

    /// Sign one approval on a pending voucher.
    ///
    /// The policy resolves the ordered role chain for the voucher's
    /// category and amount; the voucher posts when the last required role
    /// signs, and stays Pending while earlier signatures accumulate.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InvalidTransition` if the voucher is not Pending
    /// * `WorkflowError::DuplicateApprover` if the actor already signed
    /// * `WorkflowError::InsufficientRole` if the actor cannot sign the
    ///   next step of the chain
    pub fn approve(
        voucher: &Voucher,
        actor: &Actor,
        policy: &ApprovalPolicy,
        remarks: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        if voucher.status != VoucherStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: voucher.status,
                to: VoucherStatus::Posted,
            });
        }

        if voucher.approvers.iter().any(|a| a.id == actor.id) {
            return Err(WorkflowError::DuplicateApprover { actor_id: actor.id });
        }

        let chain = policy.required_chain(voucher.transaction_type(), voucher.amount);
        let step = voucher.approvers.len().min(chain.len() - 1);
        let required_role = chain[step];

        if actor.role < required_role {
            return Err(WorkflowError::InsufficientRole {
                actor_role: actor.role,
                required_role,
            });
        }

        let completes_chain = voucher.approvers.len() + 1 >= chain.len();
        let new_status = if completes_chain {
            VoucherStatus::Posted
        } else {
            VoucherStatus::Pending
        };

        Ok(WorkflowAction::Approve {
            new_status,
            approver: Approver {
                id: actor.id,
                name: actor.name.clone(),
                role: actor.role,
                approved_at: Utc::now(),
                remarks,
            },
        })
    }

    /// Approve and post a draft voucher in one compound step.
    ///
    /// The actor is registered as the sole approver and must be able to
    /// satisfy the whole approval chain alone; the voucher is never
    /// observable in Pending.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InvalidTransition` if the voucher is not in Draft
    /// * `WorkflowError::InsufficientRole` if the actor cannot satisfy the
    ///   chain alone
    pub fn auto_approve(
        voucher: &Voucher,
        actor: &Actor,
        policy: &ApprovalPolicy,
        remarks: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        if voucher.status != VoucherStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                from: voucher.status,
                to: VoucherStatus::Posted,
            });
        }

        let chain = policy.required_chain(voucher.transaction_type(), voucher.amount);
        if let Some(unmet) = chain.iter().find(|required| actor.role < **required) {
            return Err(WorkflowError::InsufficientRole {
                actor_role: actor.role,
                required_role: *unmet,
            });
        }

        Ok(WorkflowAction::AutoApprove {
            new_status: VoucherStatus::Posted,
            approver: Approver {
                id: actor.id,
                name: actor.name.clone(),
                role: actor.role,
                approved_at: Utc::now(),
                remarks,
            },
        })
    }

    /// Reject a pending voucher.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::RejectionReasonRequired` if the reason is empty
    ///   (checked before any state inspection, so nothing mutates)
    /// * `WorkflowError::InvalidTransition` if the voucher is not Pending
    /// * `WorkflowError::InsufficientRole` if the actor lacks approval
    ///   authority for the voucher's category
    pub fn reject(
        voucher: &Voucher,
        actor: &Actor,
        policy: &ApprovalPolicy,
        rejection_reason: String,
    ) -> Result<WorkflowAction, WorkflowError> {
        if rejection_reason.trim().is_empty() {
            return Err(WorkflowError::RejectionReasonRequired);
        }

        if voucher.status != VoucherStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: voucher.status,
                to: VoucherStatus::Rejected,
            });
        }

        let chain = policy.required_chain(voucher.transaction_type(), voucher.amount);
        let step = voucher.approvers.len().min(chain.len() - 1);
        let required_role = chain[step];

        if actor.role < required_role {
            return Err(WorkflowError::InsufficientRole {
                actor_role: actor.role,
                required_role,
            });
        }

        Ok(WorkflowAction::Reject {
            new_status: VoucherStatus::Rejected,
            rejected_by: actor.id,
            rejected_by_name: actor.name.clone(),
            rejected_at: Utc::now(),
            rejection_reason,
        })
    }

    /// Cancel a draft or pending voucher.
    ///
    /// Permitted for the requestor and for administrative actors.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InvalidTransition` if the voucher is terminal
    /// * `WorkflowError::NotAuthorizedToCancel` otherwise
    pub fn cancel(
        voucher: &Voucher,
        actor: &Actor,
        remarks: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        if !matches!(
            voucher.status,
            VoucherStatus::Draft | VoucherStatus::Pending
        ) {
            return Err(WorkflowError::InvalidTransition {
                from: voucher.status,
                to: VoucherStatus::Cancelled,
            });
        }

        if actor.id != voucher.requestor_id && !actor.role.is_administrative() {
            return Err(WorkflowError::NotAuthorizedToCancel { actor_id: actor.id });
        }

        Ok(WorkflowAction::Cancel {
            new_status: VoucherStatus::Cancelled,
            cancelled_by: actor.id,
            cancelled_by_name: actor.name.clone(),
            cancelled_at: Utc::now(),
            remarks,
        })
    }

    /// Apply a validated action to a voucher.
    ///
    /// Appends exactly one history entry and updates the approval axis in
    /// the same in-memory mutation, so the caller persists both in one
    /// conditional write.
    pub fn apply(voucher: &mut Voucher, action: WorkflowAction) {
        let from_status = voucher.status;
        let new_status = action.new_status();

        let entry = match action {
            WorkflowAction::Submit {
                submitted_by,
                submitted_by_name,
                submitted_at,
                ..
            } => HistoryEntry {
                occurred_at: submitted_at,
                from_status,
                to_status: new_status,
                actor_id: submitted_by,
                actor_name: submitted_by_name,
                action: VoucherAction::Submit,
                remarks: None,
            },
            WorkflowAction::Approve { approver, .. } => {
                let entry = HistoryEntry {
                    occurred_at: approver.approved_at,
                    from_status,
                    to_status: new_status,
                    actor_id: approver.id,
                    actor_name: approver.name.clone(),
                    action: VoucherAction::Approve,
                    remarks: approver.remarks.clone(),
                };
                voucher.approvers.push(approver);
                entry
            }
            WorkflowAction::AutoApprove { approver, .. } => {
                let entry = HistoryEntry {
                    occurred_at: approver.approved_at,
                    from_status,
                    to_status: new_status,
                    actor_id: approver.id,
                    actor_name: approver.name.clone(),
                    action: VoucherAction::AutoApprove,
                    remarks: approver.remarks.clone(),
                };
                voucher.approvers.push(approver);
                entry
            }
            WorkflowAction::Reject {
                rejected_by,
                rejected_by_name,
                rejected_at,
                rejection_reason,
                ..
            } => HistoryEntry {
                occurred_at: rejected_at,
                from_status,
                to_status: new_status,
                actor_id: rejected_by,
                actor_name: rejected_by_name,
                action: VoucherAction::Reject,
                remarks: Some(rejection_reason),
            },
            WorkflowAction::Cancel {
                cancelled_by,
                cancelled_by_name,
                cancelled_at,
                remarks,
                ..
            } => HistoryEntry {
                occurred_at: cancelled_at,
                from_status,
                to_status: new_status,
                actor_id: cancelled_by,
                actor_name: cancelled_by_name,
                action: VoucherAction::Cancel,
                remarks,
            },
        };

        voucher.updated_at = entry.occurred_at;
        voucher.workflow_history.push(entry);
        voucher.status = new_status;
    }

    /// Check if a status transition is in the table.
    ///
    /// Valid transitions:
    /// - Draft → Pending (submit, generate-statement)
    /// - Draft → Posted (auto-approve)
    /// - Draft → Cancelled (cancel)
    /// - Pending → Posted (approve, finalize-statement)
    /// - Pending → Rejected (reject)
    /// - Pending → Cancelled (cancel)
    #[must_use]
    pub fn is_valid_transition(from: VoucherStatus, to: VoucherStatus) -> bool {
        matches!(
            (from, to),
            (
                VoucherStatus::Draft,
                VoucherStatus::Pending | VoucherStatus::Posted | VoucherStatus::Cancelled
            ) | (
                VoucherStatus::Pending,
                VoucherStatus::Posted | VoucherStatus::Rejected | VoucherStatus::Cancelled
            )
        )
    }
}
