//! Property-based tests for the workflow state machine.
//!
//! Validates the transition-table closure and audit-trail properties with
//! randomized inputs.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use cartage_shared::types::{Actor, ActorId, Currency, UserRole, VoucherId};

use crate::voucher::types::{Voucher, VoucherKind, VoucherStatus};
use crate::workflow::error::WorkflowError;
use crate::workflow::policy::ApprovalPolicy;
use crate::workflow::service::WorkflowService;

/// Strategy for generating random voucher statuses.
fn arb_status() -> impl Strategy<Value = VoucherStatus> {
    prop_oneof![
        Just(VoucherStatus::Draft),
        Just(VoucherStatus::Pending),
        Just(VoucherStatus::Posted),
        Just(VoucherStatus::Rejected),
        Just(VoucherStatus::Cancelled),
    ]
}

/// Strategy for generating random roles.
fn arb_role() -> impl Strategy<Value = UserRole> {
    prop_oneof![
        Just(UserRole::Viewer),
        Just(UserRole::Requestor),
        Just(UserRole::Accounting),
        Just(UserRole::Executive),
        Just(UserRole::Admin),
    ]
}

/// Strategy for generating non-empty reason strings.
fn arb_reason() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,60}".prop_map(|s| s.trim().to_string())
}

fn voucher_with_status(requestor: &Actor, status: VoucherStatus) -> Voucher {
    let now = Utc::now();
    Voucher {
        id: VoucherId::new(),
        voucher_number: "EXP-2026-00042".to_string(),
        source_module: "expenses".to_string(),
        amount: Decimal::new(50_000, 2),
        currency: Currency::Php,
        requestor_id: requestor.id,
        requestor_name: requestor.name.clone(),
        vendor_name: None,
        customer_id: None,
        customer_name: None,
        project_number: None,
        purpose: "prop test".to_string(),
        status,
        approvers: vec![],
        workflow_history: vec![],
        kind: VoucherKind::Expense {
            parent_voucher_id: None,
        },
        version: 0,
        created_at: now,
        updated_at: now,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Submit succeeds only from Draft, and only for the requestor.
    #[test]
    fn prop_submit_only_from_draft(status in arb_status()) {
        let requestor = Actor::new(ActorId::new(), "R", UserRole::Requestor);
        let voucher = voucher_with_status(&requestor, status);
        let result = WorkflowService::submit(&voucher, &requestor);

        if status == VoucherStatus::Draft {
            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap().new_status(), VoucherStatus::Pending);
        } else {
            prop_assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })), "expected InvalidTransition");
        }
    }

    /// Approve succeeds only from Pending, and never for roles below the
    /// required chain step.
    #[test]
    fn prop_approve_gated_by_status_and_role(
        status in arb_status(),
        role in arb_role()
    ) {
        let requestor = Actor::new(ActorId::new(), "R", UserRole::Requestor);
        let approver = Actor::new(ActorId::new(), "A", role);
        let policy = ApprovalPolicy::default_policy();
        let voucher = voucher_with_status(&requestor, status);

        let result = WorkflowService::approve(&voucher, &approver, &policy, None);

        if status != VoucherStatus::Pending {
            prop_assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })), "expected InvalidTransition");
        } else if role < UserRole::Accounting {
            prop_assert!(matches!(result, Err(WorkflowError::InsufficientRole { .. })), "expected InsufficientRole");
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap().new_status(), VoucherStatus::Posted);
        }
    }

    /// Rejection always fails on an empty reason, regardless of status,
    /// before any status check can report a different error.
    #[test]
    fn prop_reject_requires_reason(status in arb_status(), role in arb_role()) {
        let requestor = Actor::new(ActorId::new(), "R", UserRole::Requestor);
        let rejector = Actor::new(ActorId::new(), "A", role);
        let policy = ApprovalPolicy::default_policy();
        let voucher = voucher_with_status(&requestor, status);

        let result = WorkflowService::reject(&voucher, &rejector, &policy, "   ".to_string());
        prop_assert!(matches!(result, Err(WorkflowError::RejectionReasonRequired)));
    }

    /// Reject with a reason succeeds exactly from Pending with authority.
    #[test]
    fn prop_reject_gated_by_status_and_role(
        status in arb_status(),
        role in arb_role(),
        reason in arb_reason()
    ) {
        prop_assume!(!reason.trim().is_empty());

        let requestor = Actor::new(ActorId::new(), "R", UserRole::Requestor);
        let rejector = Actor::new(ActorId::new(), "A", role);
        let policy = ApprovalPolicy::default_policy();
        let voucher = voucher_with_status(&requestor, status);

        let result = WorkflowService::reject(&voucher, &rejector, &policy, reason);

        if status != VoucherStatus::Pending {
            prop_assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })), "expected InvalidTransition");
        } else if role < UserRole::Accounting {
            prop_assert!(matches!(result, Err(WorkflowError::InsufficientRole { .. })), "expected InsufficientRole");
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// Cancel succeeds exactly from Draft/Pending for owner or admin.
    #[test]
    fn prop_cancel_gated(status in arb_status(), role in arb_role()) {
        let requestor = Actor::new(ActorId::new(), "R", UserRole::Requestor);
        let other = Actor::new(ActorId::new(), "A", role);
        let voucher = voucher_with_status(&requestor, status);

        let result = WorkflowService::cancel(&voucher, &other, None);

        if status.is_terminal() {
            prop_assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })), "expected InvalidTransition");
        } else if role.is_administrative() {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(WorkflowError::NotAuthorizedToCancel { .. })), "expected NotAuthorizedToCancel");
        }
    }

    /// Applying any successful action appends exactly one history entry
    /// and never shrinks the log.
    #[test]
    fn prop_apply_appends_one_entry(reason in arb_reason()) {
        prop_assume!(!reason.trim().is_empty());

        let requestor = Actor::new(ActorId::new(), "R", UserRole::Requestor);
        let accounting = Actor::new(ActorId::new(), "A", UserRole::Accounting);
        let policy = ApprovalPolicy::default_policy();

        let mut voucher = voucher_with_status(&requestor, VoucherStatus::Draft);
        let mut transitions = 0usize;

        let action = WorkflowService::submit(&voucher, &requestor).unwrap();
        WorkflowService::apply(&mut voucher, action);
        transitions += 1;
        prop_assert_eq!(voucher.workflow_history.len(), transitions);

        let action = WorkflowService::reject(&voucher, &accounting, &policy, reason).unwrap();
        WorkflowService::apply(&mut voucher, action);
        transitions += 1;
        prop_assert_eq!(voucher.workflow_history.len(), transitions);
        prop_assert_eq!(voucher.status, VoucherStatus::Rejected);
    }

    /// The transition table is closed: posted/rejected/cancelled vouchers
    /// admit no further transition through any entry point.
    #[test]
    fn prop_terminal_states_are_closed(role in arb_role(), reason in arb_reason()) {
        prop_assume!(!reason.trim().is_empty());

        let requestor = Actor::new(ActorId::new(), "R", UserRole::Requestor);
        let anyone = Actor::new(ActorId::new(), "A", role);
        let policy = ApprovalPolicy::default_policy();

        for status in [
            VoucherStatus::Posted,
            VoucherStatus::Rejected,
            VoucherStatus::Cancelled,
        ] {
            let voucher = voucher_with_status(&requestor, status);

            prop_assert!(WorkflowService::submit(&voucher, &requestor).is_err());
            prop_assert!(WorkflowService::approve(&voucher, &anyone, &policy, None).is_err());
            prop_assert!(WorkflowService::auto_approve(&voucher, &anyone, &policy, None).is_err());
            prop_assert!(
                WorkflowService::reject(&voucher, &anyone, &policy, reason.clone()).is_err()
            );
            prop_assert!(WorkflowService::cancel(&voucher, &requestor, None).is_err());
        }
    }
}
