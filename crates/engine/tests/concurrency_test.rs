//! Concurrency tests: overlapping statement generation, racing
//! finalizations, and racing allocations must never lose or double-apply
//! money.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use cartage_core::voucher::types::{LinkedBilling, TransactionType, VoucherStatus};
use cartage_engine::ledger::RecordingLedger;
use cartage_engine::orchestrator::Orchestrator;
use cartage_engine::types::CreateVoucherInput;
use cartage_shared::types::{Actor, ActorId, Currency, UserRole, VoucherId};
use cartage_store::memory::MemoryStore;

type Engine = Orchestrator<MemoryStore, RecordingLedger>;

fn fixture() -> (Arc<Engine>, Arc<RecordingLedger>, Actor) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let store = Arc::new(MemoryStore::new());
    let ledger = Arc::new(RecordingLedger::new());
    let engine = Arc::new(Orchestrator::new(store, Arc::clone(&ledger)));
    let accountant = Actor::new(ActorId::new(), "M. Reyes", UserRole::Accounting);
    (engine, ledger, accountant)
}

async fn draft_billing(engine: &Engine, actor: &Actor, amount: Decimal) -> VoucherId {
    engine
        .create_voucher(
            CreateVoucherInput::new(
                TransactionType::Billing,
                "billing",
                amount,
                Currency::Php,
                "hauling",
            ),
            actor,
        )
        .await
        .unwrap()
        .id
}

#[tokio::test(flavor = "multi_thread")]
async fn test_overlapping_statements_claim_each_billing_once() {
    let (engine, _ledger, accountant) = fixture();

    let mut pool = Vec::new();
    for _ in 0..6 {
        pool.push(draft_billing(&engine, &accountant, dec!(1000)).await);
    }

    // Two accountants grab overlapping slices of the unbilled pool.
    let first_ids: Vec<VoucherId> = pool[0..4].to_vec();
    let second_ids: Vec<VoucherId> = pool[2..6].to_vec();

    let first = {
        let engine = Arc::clone(&engine);
        let actor = accountant.clone();
        tokio::spawn(async move { engine.generate_statement(&first_ids, &actor).await })
    };
    let second = {
        let engine = Arc::clone(&engine);
        let actor = accountant.clone();
        tokio::spawn(async move { engine.generate_statement(&second_ids, &actor).await })
    };

    let first = first.await.unwrap();
    let second = second.await.unwrap();

    // At most one can win; the loser fails without claiming anything.
    let winners: Vec<_> = [&first, &second].into_iter().filter(|r| r.is_ok()).collect();
    assert!(winners.len() <= 1, "overlapping statements cannot both win");

    for result in [first, second] {
        if let Err(err) = result {
            assert!(
                matches!(
                    err.error_code(),
                    "INELIGIBLE_ITEM" | "CONCURRENT_MODIFICATION"
                ),
                "unexpected loser error: {err}"
            );
        }
    }

    // Every billing belongs to at most one statement, and each claimed
    // billing carries exactly one generate-statement history entry.
    let mut references = std::collections::HashSet::new();
    for id in &pool {
        let voucher = engine.voucher(*id).await.unwrap();
        if let Some(reference) = voucher
            .billing()
            .and_then(|d| d.statement_reference.clone())
        {
            references.insert(reference);
            assert_eq!(voucher.workflow_history.len(), 1);
            assert_eq!(voucher.status, VoucherStatus::Pending);
        } else {
            assert_eq!(voucher.status, VoucherStatus::Draft);
            assert!(voucher.workflow_history.is_empty());
        }
    }
    assert!(references.len() <= 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disjoint_statements_both_succeed() {
    let (engine, _ledger, accountant) = fixture();

    let a = draft_billing(&engine, &accountant, dec!(1000)).await;
    let b = draft_billing(&engine, &accountant, dec!(2000)).await;

    let first = {
        let engine = Arc::clone(&engine);
        let actor = accountant.clone();
        tokio::spawn(async move { engine.generate_statement(&[a], &actor).await })
    };
    let second = {
        let engine = Arc::clone(&engine);
        let actor = accountant.clone();
        tokio::spawn(async move { engine.generate_statement(&[b], &actor).await })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_ne!(first.statement_reference, second.statement_reference);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_racing_finalize_posts_ledger_once() {
    let (engine, ledger, accountant) = fixture();

    let a = draft_billing(&engine, &accountant, dec!(1000)).await;
    let statement = engine
        .generate_statement(&[a], &accountant)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        let actor = accountant.clone();
        let reference = statement.statement_reference.clone();
        handles.push(tokio::spawn(async move {
            engine.finalize_statement(&reference, &actor).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1, "exactly one finalize must win");
    assert_eq!(ledger.post_count(), 1, "ledger posted exactly once");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_racing_collections_never_overdraw_a_billing() {
    let (engine, _ledger, accountant) = fixture();

    let a = draft_billing(&engine, &accountant, dec!(1000)).await;
    engine.generate_statement(&[a], &accountant).await.unwrap();

    // Six racing collections of 300 against a 1,000 billing: at most
    // three can land.
    let mut collections = Vec::new();
    for _ in 0..6 {
        let mut input = CreateVoucherInput::new(
            TransactionType::Collection,
            "collections",
            dec!(300),
            Currency::Php,
            "racing OR",
        );
        input.linked_billings = vec![LinkedBilling {
            billing_id: a,
            amount: dec!(300),
        }];
        collections.push(
            engine
                .create_voucher(input, &accountant)
                .await
                .unwrap()
                .id,
        );
    }

    let mut handles = Vec::new();
    for id in collections {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(
            async move { engine.allocate_collection(id).await },
        ));
    }

    let mut applied = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => applied += 1,
            Err(err) => assert!(
                matches!(
                    err.error_code(),
                    "OVER_ALLOCATION" | "CONCURRENT_MODIFICATION"
                ),
                "unexpected loser error: {err}"
            ),
        }
    }

    assert!(applied <= 3, "at most three 300s fit into 1,000");

    let billing = engine.voucher(a).await.unwrap();
    let remaining = billing.billing().unwrap().remaining_balance;
    assert_eq!(
        remaining,
        dec!(1000) - dec!(300) * Decimal::from(applied),
        "remaining balance must account exactly for the applied collections"
    );
    assert!(remaining >= Decimal::ZERO);
}

#[tokio::test]
async fn test_stale_writer_surfaces_retryable_conflict() {
    let (engine, _ledger, accountant) = fixture();
    let requestor = Actor::new(ActorId::new(), "A. Cruz", UserRole::Requestor);

    let voucher = engine
        .create_voucher(
            CreateVoucherInput::new(
                TransactionType::Expense,
                "expenses",
                dec!(100),
                Currency::Php,
                "fuel",
            ),
            &requestor,
        )
        .await
        .unwrap();

    // The requestor cancels while an approval screen still shows Draft;
    // the later submit must fail the transition table, not resurrect it.
    engine.cancel(voucher.id, &requestor, None).await.unwrap();
    let result = engine.submit(voucher.id, &requestor).await;
    match result {
        Err(err) => {
            assert_eq!(err.error_code(), "INVALID_TRANSITION");
            assert!(!err.is_retryable());
        }
        Ok(_) => panic!("expected failure"),
    }
}
