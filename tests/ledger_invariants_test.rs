mod common;

use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{assert_projection_invariant, reload_item, seed_item, setup};
use fieldops_api::{
    entities::inventory_transaction::TransactionType,
    errors::ServiceError,
    services::ledger::{AppendTransaction, TransferRequest},
};

#[tokio::test]
async fn receipt_and_issue_maintain_projection() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "PIPE-10", dec!(0), dec!(5)).await;

    let mut receipt = AppendTransaction::new(item.id, TransactionType::Receipt, dec!(40));
    receipt.unit_cost = Some(dec!(8));
    receipt.performed_by = ctx.user_id;
    let row = ctx.services.ledger.append(receipt).await.unwrap();
    assert_eq!(row.quantity, dec!(40));
    assert_eq!(row.balance_after, dec!(40));

    let mut issue = AppendTransaction::new(item.id, TransactionType::Issue, dec!(15));
    issue.performed_by = ctx.user_id;
    let row = ctx.services.ledger.append(issue).await.unwrap();
    assert_eq!(row.quantity, dec!(-15));
    assert_eq!(row.balance_after, dec!(25));

    let item = reload_item(&ctx, item.id).await;
    assert_eq!(item.quantity_on_hand, dec!(25));
    assert_eq!(item.quantity_available, dec!(25));
    assert_projection_invariant(&item);
}

#[tokio::test]
async fn negative_application_fails_with_insufficient_stock() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "WIRE-12", dec!(10), dec!(5)).await;

    let mut issue = AppendTransaction::new(item.id, TransactionType::Issue, dec!(11));
    issue.performed_by = ctx.user_id;
    let err = ctx.services.ledger.append(issue).await.unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    // Nothing was written: projection untouched, ledger holds only the
    // opening balance row.
    let item = reload_item(&ctx, item.id).await;
    assert_eq!(item.quantity_on_hand, dec!(10));
    let (rows, total) = ctx.services.ledger.list_for_item(item.id, 1, 50).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].transaction_type, "initial_stock");
}

#[tokio::test]
async fn adjustment_carries_explicit_sign() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "CLAMP-3", dec!(20), dec!(5)).await;

    let mut down = AppendTransaction::new(item.id, TransactionType::Adjustment, dec!(-4));
    down.performed_by = ctx.user_id;
    ctx.services.ledger.append(down).await.unwrap();

    let mut up = AppendTransaction::new(item.id, TransactionType::Adjustment, dec!(2));
    up.performed_by = ctx.user_id;
    ctx.services.ledger.append(up).await.unwrap();

    let item = reload_item(&ctx, item.id).await;
    assert_eq!(item.quantity_on_hand, dec!(18));
    assert_projection_invariant(&item);
}

#[tokio::test]
async fn write_off_cannot_cross_zero_by_default() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "GASKET-7", dec!(3), dec!(1)).await;

    let mut write_off = AppendTransaction::new(item.id, TransactionType::WriteOff, dec!(5));
    write_off.performed_by = ctx.user_id;
    let err = ctx.services.ledger.append(write_off).await.unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));
}

#[tokio::test]
async fn zero_quantity_is_rejected() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "BOLT-M8", dec!(10), dec!(2)).await;

    let mut append = AppendTransaction::new(item.id, TransactionType::Receipt, dec!(0));
    append.performed_by = ctx.user_id;
    let err = ctx.services.ledger.append(append).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn unknown_item_is_not_found() {
    let ctx = setup().await;
    let mut append = AppendTransaction::new(Uuid::new_v4(), TransactionType::Receipt, dec!(1));
    append.performed_by = ctx.user_id;
    let err = ctx.services.ledger.append(append).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn transfer_writes_two_linked_rows_and_preserves_totals() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "HOSE-25", dec!(30), dec!(5)).await;
    let from = Uuid::new_v4();
    let to = Uuid::new_v4();

    let rows = ctx
        .services
        .ledger
        .transfer(TransferRequest {
            item_id: item.id,
            from_location_id: from,
            to_location_id: to,
            quantity: dec!(12),
            reason: None,
            notes: None,
            performed_by: ctx.user_id,
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].quantity, dec!(-12));
    assert_eq!(rows[1].quantity, dec!(12));
    assert_eq!(rows[0].transfer_group_id, rows[1].transfer_group_id);
    assert!(rows[0].transfer_group_id.is_some());
    assert_eq!(rows[0].from_location_id, Some(from));
    assert_eq!(rows[1].to_location_id, Some(to));

    // Net effect on the item is zero.
    let item = reload_item(&ctx, item.id).await;
    assert_eq!(item.quantity_on_hand, dec!(30));
    assert_projection_invariant(&item);
}

#[tokio::test]
async fn transfer_exceeding_on_hand_fails_atomically() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "VALVE-2", dec!(5), dec!(1)).await;

    let err = ctx
        .services
        .ledger
        .transfer(TransferRequest {
            item_id: item.id,
            from_location_id: Uuid::new_v4(),
            to_location_id: Uuid::new_v4(),
            quantity: dec!(6),
            reason: None,
            notes: None,
            performed_by: ctx.user_id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    let (_, total) = ctx.services.ledger.list_for_item(item.id, 1, 50).await.unwrap();
    assert_eq!(total, 1, "no partial transfer row may survive");
}

#[tokio::test]
async fn ledger_replay_matches_projection() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "FILTER-9", dec!(10), dec!(3)).await;

    for (ty, qty) in [
        (TransactionType::Receipt, dec!(25)),
        (TransactionType::Issue, dec!(8)),
        (TransactionType::Adjustment, dec!(-2)),
        (TransactionType::Return, dec!(3)),
    ] {
        let mut append = AppendTransaction::new(item.id, ty, qty);
        append.performed_by = ctx.user_id;
        ctx.services.ledger.append(append).await.unwrap();
    }

    let report = ctx.services.items.reconcile(item.id).await.unwrap();
    assert!(report.matches, "replayed balance must equal projection");
    assert_eq!(report.ledger_balance, dec!(28));
    assert_eq!(report.projected_on_hand, dec!(28));
    assert_eq!(report.transaction_count, 5);
}

#[tokio::test]
async fn status_follows_quantities() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "FUSE-30", dec!(0), dec!(10)).await;
    assert_eq!(item.status, "out_of_stock");

    let mut receipt = AppendTransaction::new(item.id, TransactionType::Receipt, dec!(6));
    receipt.performed_by = ctx.user_id;
    ctx.services.ledger.append(receipt).await.unwrap();
    assert_eq!(reload_item(&ctx, item.id).await.status, "low_stock");

    let mut receipt = AppendTransaction::new(item.id, TransactionType::Receipt, dec!(20));
    receipt.performed_by = ctx.user_id;
    ctx.services.ledger.append(receipt).await.unwrap();
    assert_eq!(reload_item(&ctx, item.id).await.status, "in_stock");
}
