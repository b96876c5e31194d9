mod common;

use merchant_settlement::error::AppError;
use merchant_settlement::models::MovementType;
use merchant_settlement::services::LedgerService;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_apply_delta_writes_balance_and_log_atomically() {
    let Some(pool) = common::try_setup_db().await else { return };
    common::cleanup_test_data(&pool).await;

    let merchant_id = common::create_merchant(&pool, dec!(1000.00)).await;
    let ledger = LedgerService::new(pool.clone());

    let mut tx = pool.begin().await.unwrap();
    let entry = LedgerService::apply_delta(
        &mut tx,
        merchant_id,
        dec!(-100.00),
        MovementType::Withdraw,
        "S-TEST-1",
        "withdrawal applied",
    )
    .await
    .expect("Failed to apply delta");
    tx.commit().await.unwrap();

    assert_eq!(entry.before_balance, dec!(1000.00));
    assert_eq!(entry.after_balance, dec!(900.00));
    assert_eq!(entry.amount, dec!(-100.00));
    assert_eq!(common::merchant_balance(&pool, merchant_id).await, dec!(900.00));

    assert_eq!(ledger.sum_deltas(merchant_id).await.unwrap(), dec!(-100.00));
    assert!(ledger.verify_chain(merchant_id).await.unwrap());

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn test_apply_delta_rejects_overdraft() {
    let Some(pool) = common::try_setup_db().await else { return };
    common::cleanup_test_data(&pool).await;

    let merchant_id = common::create_merchant(&pool, dec!(50.00)).await;
    let ledger = LedgerService::new(pool.clone());

    let mut tx = pool.begin().await.unwrap();
    let err = LedgerService::apply_delta(
        &mut tx,
        merchant_id,
        dec!(-100.00),
        MovementType::Withdraw,
        "S-TEST-2",
        "withdrawal applied",
    )
    .await
    .unwrap_err();
    drop(tx);

    assert!(matches!(err, AppError::InsufficientBalance(_)));
    assert_eq!(common::merchant_balance(&pool, merchant_id).await, dec!(50.00));
    assert_eq!(ledger.count_entries(merchant_id).await.unwrap(), 0);

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn test_rollback_discards_balance_and_log_together() {
    let Some(pool) = common::try_setup_db().await else { return };
    common::cleanup_test_data(&pool).await;

    let merchant_id = common::create_merchant(&pool, dec!(500.00)).await;
    let ledger = LedgerService::new(pool.clone());

    let mut tx = pool.begin().await.unwrap();
    LedgerService::apply_delta(
        &mut tx,
        merchant_id,
        dec!(-200.00),
        MovementType::Withdraw,
        "S-TEST-3",
        "withdrawal applied",
    )
    .await
    .expect("Failed to apply delta");
    tx.rollback().await.unwrap();

    assert_eq!(common::merchant_balance(&pool, merchant_id).await, dec!(500.00));
    assert_eq!(ledger.count_entries(merchant_id).await.unwrap(), 0);

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn test_subcent_delta_rounds_once() {
    let Some(pool) = common::try_setup_db().await else { return };
    common::cleanup_test_data(&pool).await;

    let merchant_id = common::create_merchant(&pool, dec!(1000.00)).await;
    let ledger = LedgerService::new(pool.clone());

    // A midpoint sub-cent delta: the logged amount is the rounded delta and
    // the new balance is derived from it, so after = before + amount holds.
    let mut tx = pool.begin().await.unwrap();
    let entry = LedgerService::apply_delta(
        &mut tx,
        merchant_id,
        dec!(-0.005),
        MovementType::RefundDeduct,
        "R-SUBCENT",
        "",
    )
    .await
    .expect("Failed to apply delta");
    tx.commit().await.unwrap();

    assert_eq!(entry.amount, dec!(-0.01));
    assert_eq!(entry.before_balance, dec!(1000.00));
    assert_eq!(entry.after_balance, dec!(999.99));
    assert!(entry.is_consistent());

    assert_eq!(common::merchant_balance(&pool, merchant_id).await, dec!(999.99));
    assert!(ledger.verify_chain(merchant_id).await.unwrap());

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn test_chain_holds_across_mixed_movements() {
    let Some(pool) = common::try_setup_db().await else { return };
    common::cleanup_test_data(&pool).await;

    let merchant_id = common::create_merchant(&pool, dec!(1000.00)).await;
    let ledger = LedgerService::new(pool.clone());

    let movements = [
        (dec!(-300.00), MovementType::Withdraw, "S-A"),
        (dec!(300.00), MovementType::WithdrawCancel, "S-A"),
        (dec!(-47.50), MovementType::RefundDeduct, "R-B"),
    ];

    for (delta, movement_type, related_no) in movements {
        let mut tx = pool.begin().await.unwrap();
        LedgerService::apply_delta(&mut tx, merchant_id, delta, movement_type, related_no, "")
            .await
            .expect("Failed to apply delta");
        tx.commit().await.unwrap();
    }

    assert_eq!(common::merchant_balance(&pool, merchant_id).await, dec!(952.50));
    assert_eq!(ledger.sum_deltas(merchant_id).await.unwrap(), dec!(-47.50));
    assert!(ledger.verify_chain(merchant_id).await.unwrap());

    let entries = ledger.entries(merchant_id, 10, 0).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].after_balance, entries[1].before_balance);
    assert_eq!(entries[1].after_balance, entries[2].before_balance);

    common::cleanup_test_data(&pool).await;
}
