//! Property-based tests for collection allocation.
//!
//! Validates money conservation across arbitrary allocation sequences: a
//! billing's remaining balance plus everything allocated against it always
//! equals its amount, and the balance never goes negative.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use cartage_shared::types::{ActorId, Currency, VoucherId};

use crate::reconciliation::error::ReconciliationError;
use crate::reconciliation::service::ReconciliationService;
use crate::voucher::types::{
    BillingDetail, BillingStatus, Voucher, VoucherKind, VoucherStatus,
};

fn billing(amount: Decimal) -> Voucher {
    let now = Utc::now();
    Voucher {
        id: VoucherId::new(),
        voucher_number: "BIL-2026-00099".to_string(),
        source_module: "billing".to_string(),
        amount,
        currency: Currency::Php,
        requestor_id: ActorId::new(),
        requestor_name: "A. Cruz".to_string(),
        vendor_name: None,
        customer_id: None,
        customer_name: None,
        project_number: None,
        purpose: "prop".to_string(),
        status: VoucherStatus::Draft,
        approvers: vec![],
        workflow_history: vec![],
        kind: VoucherKind::Billing(BillingDetail::unbilled(amount)),
        version: 0,
        created_at: now,
        updated_at: now,
    }
}

/// Amounts in centavos, kept small enough to stay readable in failures.
fn arb_centavos() -> impl Strategy<Value = Decimal> {
    (1i64..=2_000_000).prop_map(|c| Decimal::new(c, 2))
}

fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// remaining + sum(applied allocations) == amount, and remaining >= 0,
    /// across any sequence of allocation attempts.
    #[test]
    fn prop_allocation_conserves_money(
        total in arb_centavos(),
        requests in prop::collection::vec(arb_centavos(), 1..12)
    ) {
        let mut voucher = billing(total);
        let mut applied = Decimal::ZERO;

        for request in requests {
            let remaining_before = voucher.billing().unwrap().remaining_balance;
            match ReconciliationService::apply_allocation(&mut voucher, request, tolerance()) {
                Ok(outcome) => {
                    prop_assert!(request <= remaining_before);
                    applied += request;
                    prop_assert_eq!(outcome.remaining_balance, remaining_before - request);
                }
                Err(ReconciliationError::OverAllocation { .. }) => {
                    // A refused step must not have mutated the balance.
                    prop_assert!(request > remaining_before);
                    prop_assert_eq!(
                        voucher.billing().unwrap().remaining_balance,
                        remaining_before
                    );
                }
                Err(e) => prop_assert!(false, "unexpected error: {e}"),
            }

            let remaining = voucher.billing().unwrap().remaining_balance;
            prop_assert!(remaining >= Decimal::ZERO);
            prop_assert_eq!(remaining + applied, total);
        }
    }

    /// The recomputed billing status always reflects the balance.
    #[test]
    fn prop_billing_status_tracks_balance(
        total in arb_centavos(),
        requests in prop::collection::vec(arb_centavos(), 1..12)
    ) {
        let mut voucher = billing(total);

        for request in requests {
            let _ = ReconciliationService::apply_allocation(&mut voucher, request, tolerance());
            let detail = voucher.billing().unwrap();
            let remaining = detail.remaining_balance;

            if remaining <= tolerance() {
                if detail.billing_status != BillingStatus::Unbilled {
                    prop_assert_eq!(detail.billing_status, BillingStatus::Paid);
                }
            } else if remaining < total {
                prop_assert_eq!(detail.billing_status, BillingStatus::Partial);
            } else {
                // Nothing collected yet.
                prop_assert_eq!(detail.billing_status, BillingStatus::Unbilled);
            }
        }
    }
}
