//! Workflow error types for the voucher lifecycle.
//!
//! This module defines all error types that can occur during
//! status transitions and approval checks.

use thiserror::Error;

use cartage_shared::types::{ActorId, UserRole};

use crate::voucher::types::VoucherStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Attempted a status transition outside the table.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: VoucherStatus,
        /// The attempted target status.
        to: VoucherStatus,
    },

    /// Only the requestor may submit their own voucher.
    #[error("Actor {actor_id} is not the requestor of this voucher")]
    NotRequestor {
        /// The actor who attempted the submission.
        actor_id: ActorId,
    },

    /// Only the requestor or an administrative actor may cancel.
    #[error("Actor {actor_id} is not permitted to cancel this voucher")]
    NotAuthorizedToCancel {
        /// The actor who attempted the cancellation.
        actor_id: ActorId,
    },

    /// Actor's role does not meet the required approval role.
    #[error("Actor role {actor_role} does not meet required role {required_role}")]
    InsufficientRole {
        /// The actor's role.
        actor_role: UserRole,
        /// The role required for this approval step.
        required_role: UserRole,
    },

    /// The same actor cannot sign a voucher twice.
    #[error("Actor {actor_id} has already approved this voucher")]
    DuplicateApprover {
        /// The actor who attempted the second approval.
        actor_id: ActorId,
    },

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. }
            | Self::DuplicateApprover { .. }
            | Self::RejectionReasonRequired => 400,

            Self::NotRequestor { .. }
            | Self::NotAuthorizedToCancel { .. }
            | Self::InsufficientRole { .. } => 403,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotRequestor { .. } | Self::NotAuthorizedToCancel { .. } => "UNAUTHORIZED",
            Self::InsufficientRole { .. } => "UNAUTHORIZED",
            Self::DuplicateApprover { .. } | Self::RejectionReasonRequired => "VALIDATION_ERROR",
        }
    }
}
