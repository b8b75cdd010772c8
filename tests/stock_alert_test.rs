mod common;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{seed_item, setup};
use fieldops_api::{
    entities::inventory_transaction::TransactionType,
    errors::ServiceError,
    services::items::UpdateItemRequest,
    services::ledger::AppendTransaction,
    services::stock_alerts::AlertFilter,
};

#[tokio::test]
async fn sweep_raises_for_breaches_only() {
    let ctx = setup().await;
    seed_item(&ctx, "OK-1", dec!(100), dec!(10)).await;
    seed_item(&ctx, "LOW-1", dec!(5), dec!(10)).await;
    seed_item(&ctx, "OUT-1", dec!(0), dec!(10)).await;

    let result = ctx.services.stock_alerts.run_check().await.unwrap();
    assert_eq!(result.items_examined, 3);
    assert_eq!(result.alerts_raised, 2);

    let (alerts, total) = ctx
        .services
        .stock_alerts
        .list_alerts(AlertFilter { open_only: true, ..Default::default() }, 1, 50)
        .await
        .unwrap();
    assert_eq!(total, 2);
    let types: Vec<_> = alerts.iter().map(|a| a.alert_type.as_str()).collect();
    assert!(types.contains(&"low_stock"));
    assert!(types.contains(&"out_of_stock"));
}

#[tokio::test]
async fn sweep_does_not_duplicate_open_alerts() {
    let ctx = setup().await;
    seed_item(&ctx, "LOW-2", dec!(3), dec!(10)).await;

    let first = ctx.services.stock_alerts.run_check().await.unwrap();
    assert_eq!(first.alerts_raised, 1);
    let second = ctx.services.stock_alerts.run_check().await.unwrap();
    assert_eq!(second.alerts_raised, 0);
}

#[tokio::test]
async fn cleared_condition_leaves_alert_open() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "LOW-3", dec!(3), dec!(10)).await;
    ctx.services.stock_alerts.run_check().await.unwrap();

    // Restock past the reorder level.
    let mut receipt = AppendTransaction::new(item.id, TransactionType::Receipt, dec!(50));
    receipt.performed_by = ctx.user_id;
    ctx.services.ledger.append(receipt).await.unwrap();

    ctx.services.stock_alerts.run_check().await.unwrap();

    // Never auto-closed: the audit trail is preserved.
    let (alerts, total) = ctx
        .services
        .stock_alerts
        .list_alerts(AlertFilter { open_only: true, ..Default::default() }, 1, 50)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert!(!alerts[0].is_resolved);
}

#[tokio::test]
async fn recurring_condition_is_raised_again_after_resolution() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "LOW-4", dec!(3), dec!(10)).await;

    ctx.services.stock_alerts.run_check().await.unwrap();
    let (alerts, _) = ctx
        .services
        .stock_alerts
        .list_alerts(Default::default(), 1, 50)
        .await
        .unwrap();
    ctx.services
        .stock_alerts
        .resolve(alerts[0].id, ctx.user_id, Some("restock ordered".to_string()))
        .await
        .unwrap();

    // Condition still holds, so a new alert is raised.
    let raised = ctx.services.stock_alerts.check_item(item.id).await.unwrap();
    assert_eq!(raised, 1);
}

#[tokio::test]
async fn acknowledge_and_resolve_are_one_way() {
    let ctx = setup().await;
    seed_item(&ctx, "OUT-2", dec!(0), dec!(5)).await;
    ctx.services.stock_alerts.run_check().await.unwrap();

    let (alerts, _) = ctx
        .services
        .stock_alerts
        .list_alerts(Default::default(), 1, 50)
        .await
        .unwrap();
    let alert_id = alerts[0].id;

    let acked = ctx
        .services
        .stock_alerts
        .acknowledge(alert_id, ctx.user_id)
        .await
        .unwrap();
    assert!(acked.is_acknowledged);

    let err = ctx
        .services
        .stock_alerts
        .acknowledge(alert_id, ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));

    let resolved = ctx
        .services
        .stock_alerts
        .resolve(alert_id, ctx.user_id, None)
        .await
        .unwrap();
    assert!(resolved.is_resolved);

    let err = ctx
        .services
        .stock_alerts
        .resolve(alert_id, ctx.user_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}

#[tokio::test]
async fn resolving_unacknowledged_alert_is_allowed() {
    let ctx = setup().await;
    seed_item(&ctx, "OUT-3", dec!(0), dec!(5)).await;
    ctx.services.stock_alerts.run_check().await.unwrap();

    let (alerts, _) = ctx
        .services
        .stock_alerts
        .list_alerts(Default::default(), 1, 50)
        .await
        .unwrap();
    let resolved = ctx
        .services
        .stock_alerts
        .resolve(alerts[0].id, ctx.user_id, None)
        .await
        .unwrap();
    assert!(resolved.is_resolved);
    assert!(!resolved.is_acknowledged);
}

#[tokio::test]
async fn overstock_requires_max_level() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "BIG-1", dec!(100), dec!(5)).await;

    // No max level yet: quiet.
    assert_eq!(ctx.services.stock_alerts.check_item(item.id).await.unwrap(), 0);

    ctx.services
        .items
        .update_item(
            item.id,
            UpdateItemRequest {
                max_stock_level: Some(dec!(60)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(ctx.services.stock_alerts.check_item(item.id).await.unwrap(), 1);
    let (alerts, _) = ctx
        .services
        .stock_alerts
        .list_alerts(
            AlertFilter {
                alert_type: Some("overstock".to_string()),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].threshold, Some(dec!(60)));
}

#[tokio::test]
async fn expiring_alert_respects_horizon_and_tracking() {
    let ctx = setup().await;
    let plain = seed_item(&ctx, "PLAIN-1", dec!(10), dec!(2)).await;

    // Not batch/serial tracked: the signal is rejected.
    let err = ctx
        .services
        .stock_alerts
        .raise_expiring(plain.id, Utc::now() + Duration::days(3))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    let mut tracked = seed_item(&ctx, "BATCH-1", dec!(10), dec!(2)).await;
    tracked = {
        ctx.services
            .items
            .update_item(
                tracked.id,
                UpdateItemRequest {
                    track_batch: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    };

    // Outside the 30-day horizon: nothing raised.
    let none = ctx
        .services
        .stock_alerts
        .raise_expiring(tracked.id, Utc::now() + Duration::days(90))
        .await
        .unwrap();
    assert!(none.is_none());

    // Inside the horizon: raised once.
    let raised = ctx
        .services
        .stock_alerts
        .raise_expiring(tracked.id, Utc::now() + Duration::days(3))
        .await
        .unwrap();
    assert!(raised.is_some());
    assert_eq!(raised.unwrap().alert_type, "expiring");
}

#[tokio::test]
async fn unknown_alert_is_not_found() {
    let ctx = setup().await;
    let err = ctx
        .services
        .stock_alerts
        .acknowledge(Uuid::new_v4(), ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
