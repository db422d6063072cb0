//! Workflow action types for the voucher lifecycle.
//!
//! Each action captures a validated transition together with the audit data
//! that will be written into the voucher's history in the same store write.

use chrono::{DateTime, Utc};

use cartage_shared::types::ActorId;

use crate::voucher::types::{Approver, VoucherStatus};

/// A validated state transition with audit data.
///
/// Produced by `WorkflowService`; applied to a voucher with
/// [`WorkflowService::apply`](crate::workflow::service::WorkflowService::apply).
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Submit a draft voucher for approval.
    Submit {
        /// The new status after submission.
        new_status: VoucherStatus,
        /// The requestor submitting the voucher.
        submitted_by: ActorId,
        /// The requestor's display name.
        submitted_by_name: String,
        /// When the voucher was submitted.
        submitted_at: DateTime<Utc>,
    },
    /// Sign one approval on a pending voucher.
    Approve {
        /// The new status: Posted if this signature completes the chain,
        /// Pending if further approvals are still required.
        new_status: VoucherStatus,
        /// The registered approval.
        approver: Approver,
    },
    /// Approve and post a draft voucher in a single compound step.
    AutoApprove {
        /// The new status (always Posted).
        new_status: VoucherStatus,
        /// The sole registered approval.
        approver: Approver,
    },
    /// Reject a pending voucher.
    Reject {
        /// The new status (Rejected).
        new_status: VoucherStatus,
        /// The actor rejecting the voucher.
        rejected_by: ActorId,
        /// The actor's display name.
        rejected_by_name: String,
        /// When the rejection occurred.
        rejected_at: DateTime<Utc>,
        /// The reason for rejection.
        rejection_reason: String,
    },
    /// Cancel a draft or pending voucher.
    Cancel {
        /// The new status (Cancelled).
        new_status: VoucherStatus,
        /// The actor cancelling the voucher.
        cancelled_by: ActorId,
        /// The actor's display name.
        cancelled_by_name: String,
        /// When the cancellation occurred.
        cancelled_at: DateTime<Utc>,
        /// Optional remarks.
        remarks: Option<String>,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> VoucherStatus {
        match self {
            Self::Submit { new_status, .. }
            | Self::Approve { new_status, .. }
            | Self::AutoApprove { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Cancel { new_status, .. } => *new_status,
        }
    }
}
