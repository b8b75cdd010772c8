mod common;

use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{reload_item, seed_item, setup, TestContext};
use fieldops_api::{
    entities::inventory_count::Model as CountModel, errors::ServiceError,
    services::counts::CreateCountRequest,
};

async fn started_count(ctx: &TestContext) -> CountModel {
    let count = ctx
        .services
        .counts
        .create_count(CreateCountRequest {
            count_type: "cycle".to_string(),
            location_id: None,
            scheduled_date: None,
            notes: None,
            created_by: ctx.user_id,
        })
        .await
        .expect("Failed to create count");
    ctx.services
        .counts
        .start_count(count.id)
        .await
        .expect("Failed to start count")
}

#[tokio::test]
async fn start_snapshots_system_quantities() {
    let ctx = setup().await;
    let item_a = seed_item(&ctx, "SNAP-1", dec!(30), dec!(5)).await;
    let item_b = seed_item(&ctx, "SNAP-2", dec!(12), dec!(5)).await;

    let count = started_count(&ctx).await;
    assert_eq!(count.status, "in_progress");
    assert!(count.started_at.is_some());

    let lines = ctx.services.counts.list_count_items(count.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    let line_a = lines.iter().find(|l| l.item_id == item_a.id).unwrap();
    let line_b = lines.iter().find(|l| l.item_id == item_b.id).unwrap();
    assert_eq!(line_a.system_quantity, dec!(30));
    assert_eq!(line_b.system_quantity, dec!(12));
    assert!(line_a.counted_quantity.is_none());
}

#[tokio::test]
async fn record_computes_variance_and_cost() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "VAR-1", dec!(30), dec!(5)).await;
    let count = started_count(&ctx).await;

    let line = ctx
        .services
        .counts
        .record_count(count.id, item.id, dec!(28), ctx.user_id)
        .await
        .unwrap();
    assert_eq!(line.counted_quantity, Some(dec!(28)));
    assert_eq!(line.variance, Some(dec!(-2)));
    // Seed items cost 10 a unit.
    assert_eq!(line.variance_cost, Some(dec!(-20)));
    assert!(line.counted_at.is_some());
}

#[tokio::test]
async fn completion_adjusts_ledger_to_counted_quantity() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "ADJ-1", dec!(30), dec!(5)).await;
    let count = started_count(&ctx).await;

    ctx.services
        .counts
        .record_count(count.id, item.id, dec!(28), ctx.user_id)
        .await
        .unwrap();

    let completed = ctx
        .services
        .counts
        .complete_count(count.id, ctx.user_id)
        .await
        .unwrap();
    assert_eq!(completed.status, "completed");

    let item_state = reload_item(&ctx, item.id).await;
    assert_eq!(item_state.quantity_on_hand, dec!(28));

    let (rows, _) = ctx.services.ledger.list_for_item(item.id, 1, 50).await.unwrap();
    let adjustment = rows
        .iter()
        .find(|r| r.transaction_type == "adjustment")
        .expect("adjustment row must exist");
    assert_eq!(adjustment.quantity, dec!(-2));
    assert_eq!(adjustment.count_id, Some(count.id));
    assert_eq!(adjustment.balance_after, dec!(28));

    let report = ctx.services.items.reconcile(item.id).await.unwrap();
    assert!(report.matches);
}

#[tokio::test]
async fn zero_variance_lines_produce_no_adjustment() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "EXACT-1", dec!(15), dec!(5)).await;
    let count = started_count(&ctx).await;

    ctx.services
        .counts
        .record_count(count.id, item.id, dec!(15), ctx.user_id)
        .await
        .unwrap();
    ctx.services
        .counts
        .complete_count(count.id, ctx.user_id)
        .await
        .unwrap();

    let (rows, total) = ctx.services.ledger.list_for_item(item.id, 1, 50).await.unwrap();
    assert_eq!(total, 1, "only the opening balance row: {:?}", rows);
}

#[tokio::test]
async fn cancelled_count_commits_nothing() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "CXL-1", dec!(30), dec!(5)).await;
    let count = started_count(&ctx).await;

    ctx.services
        .counts
        .record_count(count.id, item.id, dec!(20), ctx.user_id)
        .await
        .unwrap();
    let cancelled = ctx.services.counts.cancel_count(count.id).await.unwrap();
    assert_eq!(cancelled.status, "cancelled");

    let item_state = reload_item(&ctx, item.id).await;
    assert_eq!(item_state.quantity_on_hand, dec!(30));

    // Terminal: recording and completion are now invalid.
    let err = ctx
        .services
        .counts
        .record_count(count.id, item.id, dec!(21), ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
    let err = ctx
        .services
        .counts
        .complete_count(count.id, ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}

#[tokio::test]
async fn lifecycle_guards() {
    let ctx = setup().await;
    seed_item(&ctx, "GUARD-1", dec!(5), dec!(2)).await;

    let count = ctx
        .services
        .counts
        .create_count(CreateCountRequest {
            count_type: "spot".to_string(),
            location_id: None,
            scheduled_date: None,
            notes: None,
            created_by: ctx.user_id,
        })
        .await
        .unwrap();
    assert_eq!(count.status, "planned");

    // Completing a planned count skips in_progress.
    let err = ctx
        .services
        .counts
        .complete_count(count.id, ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));

    ctx.services.counts.start_count(count.id).await.unwrap();
    let err = ctx.services.counts.start_count(count.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));

    let err = ctx
        .services
        .counts
        .create_count(CreateCountRequest {
            count_type: "bogus".to_string(),
            location_id: None,
            scheduled_date: None,
            notes: None,
            created_by: ctx.user_id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn recording_unknown_item_or_count_is_not_found() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "MISS-1", dec!(5), dec!(2)).await;
    let count = started_count(&ctx).await;

    let err = ctx
        .services
        .counts
        .record_count(count.id, Uuid::new_v4(), dec!(1), ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = ctx
        .services
        .counts
        .record_count(Uuid::new_v4(), item.id, dec!(1), ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
