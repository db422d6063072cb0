//! Integration tests for statement generation, collection allocation, and
//! statement finalization.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use cartage_core::voucher::types::{
    BillingStatus, LinkedBilling, TransactionType, VoucherStatus,
};
use cartage_engine::error::EngineError;
use cartage_engine::ledger::RecordingLedger;
use cartage_engine::orchestrator::Orchestrator;
use cartage_engine::types::CreateVoucherInput;
use cartage_shared::types::{Actor, ActorId, Currency, UserRole, VoucherId};
use cartage_store::memory::MemoryStore;

struct Fixture {
    engine: Orchestrator<MemoryStore, RecordingLedger>,
    ledger: Arc<RecordingLedger>,
    accountant: Actor,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let ledger = Arc::new(RecordingLedger::new());
    Fixture {
        engine: Orchestrator::new(store, Arc::clone(&ledger)),
        ledger,
        accountant: Actor::new(ActorId::new(), "M. Reyes", UserRole::Accounting),
    }
}

fn billing_input(amount: Decimal) -> CreateVoucherInput {
    let mut input = CreateVoucherInput::new(
        TransactionType::Billing,
        "billing",
        amount,
        Currency::Php,
        "March hauling",
    );
    input.customer_name = Some("Acme Freight".to_string());
    input
}

fn collection_input(links: Vec<LinkedBilling>) -> CreateVoucherInput {
    let total: Decimal = links.iter().map(|l| l.amount).sum();
    let mut input = CreateVoucherInput::new(
        TransactionType::Collection,
        "collections",
        total,
        Currency::Php,
        "OR #4417",
    );
    input.linked_billings = links;
    input
}

async fn draft_billing(fx: &Fixture, amount: Decimal) -> VoucherId {
    fx.engine
        .create_voucher(billing_input(amount), &fx.accountant)
        .await
        .unwrap()
        .id
}

async fn allocate(fx: &Fixture, links: Vec<LinkedBilling>) -> Result<(), EngineError> {
    let collection = fx
        .engine
        .create_voucher(collection_input(links), &fx.accountant)
        .await?;
    fx.engine.allocate_collection(collection.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_generate_statement_claims_members() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(10000)).await;
    let b = draft_billing(&fx, dec!(5000)).await;

    let result = fx
        .engine
        .generate_statement(&[a, b], &fx.accountant)
        .await
        .unwrap();

    assert!(result.statement_reference.starts_with("SOA-"));
    assert_eq!(result.members.len(), 2);
    for member in &result.members {
        assert_eq!(member.status, VoucherStatus::Pending);
        let detail = member.billing().unwrap();
        assert_eq!(detail.billing_status, BillingStatus::Billed);
        assert_eq!(detail.remaining_balance, member.amount);
        assert_eq!(
            detail.statement_reference.as_deref(),
            Some(result.statement_reference.as_str())
        );
    }
}

#[tokio::test]
async fn test_generate_statement_is_all_or_nothing() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(10000)).await;

    // A non-billing voucher poisons the whole batch.
    let expense = fx
        .engine
        .create_voucher(
            CreateVoucherInput::new(
                TransactionType::Expense,
                "expenses",
                dec!(100),
                Currency::Php,
                "fuel",
            ),
            &fx.accountant,
        )
        .await
        .unwrap();

    let result = fx
        .engine
        .generate_statement(&[a, expense.id], &fx.accountant)
        .await;
    match result {
        Err(err) => assert_eq!(err.error_code(), "INELIGIBLE_ITEM"),
        Ok(_) => panic!("expected ineligible item"),
    }

    // The eligible billing was not claimed.
    let untouched = fx.engine.voucher(a).await.unwrap();
    assert_eq!(untouched.status, VoucherStatus::Draft);
    assert!(
        untouched
            .billing()
            .unwrap()
            .statement_reference
            .is_none()
    );
}

#[tokio::test]
async fn test_generate_statement_rejects_claimed_billing() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(10000)).await;
    fx.engine
        .generate_statement(&[a], &fx.accountant)
        .await
        .unwrap();

    let result = fx.engine.generate_statement(&[a], &fx.accountant).await;
    match result {
        Err(err) => assert_eq!(err.error_code(), "INELIGIBLE_ITEM"),
        Ok(_) => panic!("expected ineligible item"),
    }
}

#[tokio::test]
async fn test_generate_statement_rejects_duplicates_and_empty() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(100)).await;

    let result = fx.engine.generate_statement(&[a, a], &fx.accountant).await;
    assert!(matches!(result, Err(EngineError::Validation(_))));

    let result = fx.engine.generate_statement(&[], &fx.accountant).await;
    match result {
        Err(err) => assert_eq!(err.error_code(), "VALIDATION_ERROR"),
        Ok(_) => panic!("expected validation error"),
    }
}

#[tokio::test]
async fn test_allocation_scenario_partial_paid_over() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(10000)).await;
    let b = draft_billing(&fx, dec!(5000)).await;
    fx.engine
        .generate_statement(&[a, b], &fx.accountant)
        .await
        .unwrap();

    // First collection: 6,000 against A.
    allocate(
        &fx,
        vec![LinkedBilling {
            billing_id: a,
            amount: dec!(6000),
        }],
    )
    .await
    .unwrap();

    let billing_a = fx.engine.voucher(a).await.unwrap();
    let detail = billing_a.billing().unwrap();
    assert_eq!(detail.remaining_balance, dec!(4000));
    assert_eq!(detail.billing_status, BillingStatus::Partial);

    // Second collection: the remaining 4,000.
    allocate(
        &fx,
        vec![LinkedBilling {
            billing_id: a,
            amount: dec!(4000),
        }],
    )
    .await
    .unwrap();

    let billing_a = fx.engine.voucher(a).await.unwrap();
    let detail = billing_a.billing().unwrap();
    assert_eq!(detail.remaining_balance, dec!(0));
    assert_eq!(detail.billing_status, BillingStatus::Paid);

    // A third collection of even 1 peso over-allocates.
    let result = allocate(
        &fx,
        vec![LinkedBilling {
            billing_id: a,
            amount: dec!(1),
        }],
    )
    .await;
    match result {
        Err(err) => assert_eq!(err.error_code(), "OVER_ALLOCATION"),
        Ok(()) => panic!("expected over-allocation"),
    }

    // B is untouched throughout.
    let billing_b = fx.engine.voucher(b).await.unwrap();
    assert_eq!(billing_b.billing().unwrap().remaining_balance, dec!(5000));
}

#[tokio::test]
async fn test_allocation_rolls_back_across_entries() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(1000)).await;
    let b = draft_billing(&fx, dec!(1000)).await;
    fx.engine
        .generate_statement(&[a, b], &fx.accountant)
        .await
        .unwrap();

    // Second entry over-allocates; the first must not stick.
    let result = allocate(
        &fx,
        vec![
            LinkedBilling {
                billing_id: a,
                amount: dec!(500),
            },
            LinkedBilling {
                billing_id: b,
                amount: dec!(2000),
            },
        ],
    )
    .await;
    assert!(result.is_err());

    let billing_a = fx.engine.voucher(a).await.unwrap();
    assert_eq!(billing_a.billing().unwrap().remaining_balance, dec!(1000));
    assert_eq!(
        billing_a.billing().unwrap().billing_status,
        BillingStatus::Billed
    );
}

#[tokio::test]
async fn test_repeated_links_run_against_running_balance() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(1000)).await;
    fx.engine
        .generate_statement(&[a], &fx.accountant)
        .await
        .unwrap();

    allocate(
        &fx,
        vec![
            LinkedBilling {
                billing_id: a,
                amount: dec!(600),
            },
            LinkedBilling {
                billing_id: a,
                amount: dec!(400),
            },
        ],
    )
    .await
    .unwrap();

    let billing_a = fx.engine.voucher(a).await.unwrap();
    assert_eq!(billing_a.billing().unwrap().remaining_balance, dec!(0));
    assert_eq!(
        billing_a.billing().unwrap().billing_status,
        BillingStatus::Paid
    );
}

#[tokio::test]
async fn test_collection_allocates_only_once() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(1000)).await;
    fx.engine
        .generate_statement(&[a], &fx.accountant)
        .await
        .unwrap();

    let collection = fx
        .engine
        .create_voucher(
            collection_input(vec![LinkedBilling {
                billing_id: a,
                amount: dec!(300),
            }]),
            &fx.accountant,
        )
        .await
        .unwrap();

    fx.engine.allocate_collection(collection.id).await.unwrap();
    let result = fx.engine.allocate_collection(collection.id).await;
    match result {
        Err(err) => assert_eq!(err.error_code(), "VALIDATION_ERROR"),
        Ok(_) => panic!("expected validation error"),
    }

    // Balance reflects a single application.
    let billing_a = fx.engine.voucher(a).await.unwrap();
    assert_eq!(billing_a.billing().unwrap().remaining_balance, dec!(700));
}

#[tokio::test]
async fn test_allocation_against_missing_billing() {
    let fx = fixture();
    let result = allocate(
        &fx,
        vec![LinkedBilling {
            billing_id: VoucherId::new(),
            amount: dec!(100),
        }],
    )
    .await;
    match result {
        Err(err) => assert_eq!(err.error_code(), "NOT_FOUND"),
        Ok(()) => panic!("expected not found"),
    }
}

#[tokio::test]
async fn test_allocation_against_non_billing_is_type_mismatch() {
    let fx = fixture();
    let expense = fx
        .engine
        .create_voucher(
            CreateVoucherInput::new(
                TransactionType::Expense,
                "expenses",
                dec!(100),
                Currency::Php,
                "fuel",
            ),
            &fx.accountant,
        )
        .await
        .unwrap();

    let result = allocate(
        &fx,
        vec![LinkedBilling {
            billing_id: expense.id,
            amount: dec!(50),
        }],
    )
    .await;
    match result {
        Err(err) => assert_eq!(err.error_code(), "TYPE_MISMATCH"),
        Ok(()) => panic!("expected type mismatch"),
    }
}

#[tokio::test]
async fn test_finalize_posts_members_and_ledger_once() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(10000)).await;
    let b = draft_billing(&fx, dec!(5000)).await;
    let statement = fx
        .engine
        .generate_statement(&[a, b], &fx.accountant)
        .await
        .unwrap();

    let result = fx
        .engine
        .finalize_statement(&statement.statement_reference, &fx.accountant)
        .await
        .unwrap();
    assert!(result.posted);
    assert_eq!(fx.ledger.post_count(), 1);

    for id in [a, b] {
        let member = fx.engine.voucher(id).await.unwrap();
        assert_eq!(member.status, VoucherStatus::Posted);
        assert!(member.billing().unwrap().posted_to_ledger);
    }
}

#[tokio::test]
async fn test_refinalize_is_rejected_without_side_effects() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(10000)).await;
    let statement = fx
        .engine
        .generate_statement(&[a], &fx.accountant)
        .await
        .unwrap();

    fx.engine
        .finalize_statement(&statement.statement_reference, &fx.accountant)
        .await
        .unwrap();

    // Partial payment after finalization.
    allocate(
        &fx,
        vec![LinkedBilling {
            billing_id: a,
            amount: dec!(2500),
        }],
    )
    .await
    .unwrap();

    let result = fx
        .engine
        .finalize_statement(&statement.statement_reference, &fx.accountant)
        .await;
    match result {
        Err(err) => assert_eq!(err.error_code(), "ALREADY_POSTED"),
        Ok(_) => panic!("expected already posted"),
    }

    // No second ledger post, no balance disturbance.
    assert_eq!(fx.ledger.post_count(), 1);
    let member = fx.engine.voucher(a).await.unwrap();
    assert_eq!(member.billing().unwrap().remaining_balance, dec!(7500));
}

#[tokio::test]
async fn test_finalize_unknown_statement() {
    let fx = fixture();
    let result = fx
        .engine
        .finalize_statement("SOA-20260101-9999", &fx.accountant)
        .await;
    match result {
        Err(err) => assert_eq!(err.error_code(), "NOT_FOUND"),
        Ok(_) => panic!("expected not found"),
    }
}

#[tokio::test]
async fn test_statement_members_read() {
    let fx = fixture();
    let a = draft_billing(&fx, dec!(100)).await;
    let statement = fx
        .engine
        .generate_statement(&[a], &fx.accountant)
        .await
        .unwrap();

    let members = fx
        .engine
        .statement_members(&statement.statement_reference)
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, a);

    assert!(fx.engine.statement_members("SOA-20000101-0001").await.is_err());
}
