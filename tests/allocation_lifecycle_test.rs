mod common;

use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{assert_projection_invariant, reload_item, seed_item, setup};
use fieldops_api::{errors::ServiceError, services::allocations::CreateAllocationRequest};

fn job_allocation(item_id: Uuid, quantity: rust_decimal::Decimal, user: Uuid) -> CreateAllocationRequest {
    CreateAllocationRequest {
        item_id,
        job_id: Some(Uuid::new_v4()),
        bid_id: None,
        quantity,
        expected_use_date: None,
        allocated_by: user,
        notes: None,
    }
}

#[tokio::test]
async fn create_allocation_reserves_without_ledger_row() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "CABLE-5", dec!(50), dec!(5)).await;

    let allocation = ctx
        .services
        .allocations
        .create_allocation(job_allocation(item.id, dec!(20), ctx.user_id))
        .await
        .unwrap();
    assert_eq!(allocation.status, "allocated");

    let item = reload_item(&ctx, item.id).await;
    assert_eq!(item.quantity_on_hand, dec!(50));
    assert_eq!(item.quantity_allocated, dec!(20));
    assert_eq!(item.quantity_available, dec!(30));
    assert_projection_invariant(&item);

    // Reservation is not a stock movement: only the opening balance row.
    let (_, total) = ctx.services.ledger.list_for_item(item.id, 1, 50).await.unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn over_allocation_fails_and_writes_nothing() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "BRKT-1", dec!(30), dec!(5)).await;

    let err = ctx
        .services
        .allocations
        .create_allocation(job_allocation(item.id, dec!(40), ctx.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    let item = reload_item(&ctx, item.id).await;
    assert_eq!(item.quantity_allocated, dec!(0));
    assert_eq!(item.quantity_available, dec!(30));

    let (allocations, total) = ctx
        .services
        .allocations
        .list_allocations(Default::default(), 1, 50)
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(allocations.is_empty());
}

#[tokio::test]
async fn allocation_requires_exactly_one_target() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "PLATE-4", dec!(10), dec!(2)).await;

    let mut request = job_allocation(item.id, dec!(5), ctx.user_id);
    request.bid_id = Some(Uuid::new_v4());
    let err = ctx
        .services
        .allocations
        .create_allocation(request)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let mut request = job_allocation(item.id, dec!(5), ctx.user_id);
    request.job_id = None;
    let err = ctx
        .services
        .allocations
        .create_allocation(request)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn issue_consumes_reservation_and_stock_together() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "PANEL-8", dec!(50), dec!(5)).await;

    let allocation = ctx
        .services
        .allocations
        .create_allocation(job_allocation(item.id, dec!(20), ctx.user_id))
        .await
        .unwrap();

    let issued = ctx
        .services
        .allocations
        .issue_allocation(allocation.id, ctx.user_id)
        .await
        .unwrap();
    assert_eq!(issued.status, "issued");
    assert_eq!(issued.quantity_used, dec!(20));
    assert!(issued.actual_use_date.is_some());

    let item = reload_item(&ctx, item.id).await;
    assert_eq!(item.quantity_on_hand, dec!(30));
    assert_eq!(item.quantity_allocated, dec!(0));
    assert_eq!(item.quantity_available, dec!(30));
    assert_projection_invariant(&item);

    let (rows, _) = ctx.services.ledger.list_for_item(item.id, 1, 50).await.unwrap();
    let issue_row = rows.iter().find(|r| r.transaction_type == "issue").unwrap();
    assert_eq!(issue_row.quantity, dec!(-20));
    assert_eq!(issue_row.allocation_id, Some(allocation.id));
}

#[tokio::test]
async fn double_issue_is_an_invalid_transition() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "BEAM-2", dec!(10), dec!(2)).await;

    let allocation = ctx
        .services
        .allocations
        .create_allocation(job_allocation(item.id, dec!(4), ctx.user_id))
        .await
        .unwrap();
    ctx.services
        .allocations
        .issue_allocation(allocation.id, ctx.user_id)
        .await
        .unwrap();

    let err = ctx
        .services
        .allocations
        .issue_allocation(allocation.id, ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}

#[tokio::test]
async fn partial_and_full_returns_restore_stock() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "DUCT-6", dec!(40), dec!(5)).await;

    let allocation = ctx
        .services
        .allocations
        .create_allocation(job_allocation(item.id, dec!(10), ctx.user_id))
        .await
        .unwrap();
    ctx.services
        .allocations
        .issue_allocation(allocation.id, ctx.user_id)
        .await
        .unwrap();

    let partially = ctx
        .services
        .allocations
        .return_allocation(allocation.id, dec!(3), ctx.user_id)
        .await
        .unwrap();
    assert_eq!(partially.status, "partially_used");
    assert_eq!(partially.quantity_returned, dec!(3));

    let item_state = reload_item(&ctx, item.id).await;
    assert_eq!(item_state.quantity_on_hand, dec!(33));
    assert_projection_invariant(&item_state);

    let returned = ctx
        .services
        .allocations
        .return_allocation(allocation.id, dec!(7), ctx.user_id)
        .await
        .unwrap();
    assert_eq!(returned.status, "returned");
    assert_eq!(returned.quantity_returned, dec!(10));

    let item_state = reload_item(&ctx, item.id).await;
    assert_eq!(item_state.quantity_on_hand, dec!(40));
}

#[tokio::test]
async fn zero_return_finalizes_as_fully_used() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "ROD-11", dec!(20), dec!(2)).await;

    let allocation = ctx
        .services
        .allocations
        .create_allocation(job_allocation(item.id, dec!(5), ctx.user_id))
        .await
        .unwrap();
    ctx.services
        .allocations
        .issue_allocation(allocation.id, ctx.user_id)
        .await
        .unwrap();

    let finalized = ctx
        .services
        .allocations
        .return_allocation(allocation.id, dec!(0), ctx.user_id)
        .await
        .unwrap();
    assert_eq!(finalized.status, "fully_used");

    // Terminal: no further returns.
    let err = ctx
        .services
        .allocations
        .return_allocation(allocation.id, dec!(1), ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}

#[tokio::test]
async fn over_return_violates_conservation() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "TILE-13", dec!(20), dec!(2)).await;

    let allocation = ctx
        .services
        .allocations
        .create_allocation(job_allocation(item.id, dec!(6), ctx.user_id))
        .await
        .unwrap();
    ctx.services
        .allocations
        .issue_allocation(allocation.id, ctx.user_id)
        .await
        .unwrap();
    ctx.services
        .allocations
        .return_allocation(allocation.id, dec!(4), ctx.user_id)
        .await
        .unwrap();

    // used_remaining is 2 now; a 3-unit return would break
    // used + returned <= allocated.
    let err = ctx
        .services
        .allocations
        .return_allocation(allocation.id, dec!(3), ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let reloaded = ctx
        .services
        .allocations
        .get_allocation(allocation.id)
        .await
        .unwrap();
    assert!(reloaded.quantity_used + reloaded.quantity_returned <= reloaded.quantity_allocated);
}

#[tokio::test]
async fn cancel_releases_reservation_without_ledger_row() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "STRUT-21", dec!(25), dec!(5)).await;

    let allocation = ctx
        .services
        .allocations
        .create_allocation(job_allocation(item.id, dec!(10), ctx.user_id))
        .await
        .unwrap();

    let cancelled = ctx
        .services
        .allocations
        .cancel_allocation(allocation.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, "cancelled");

    let item = reload_item(&ctx, item.id).await;
    assert_eq!(item.quantity_allocated, dec!(0));
    assert_eq!(item.quantity_available, dec!(25));
    assert_projection_invariant(&item);

    let (_, total) = ctx.services.ledger.list_for_item(item.id, 1, 50).await.unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn cancel_after_issue_and_double_cancel_are_invalid() {
    let ctx = setup().await;
    let item = seed_item(&ctx, "ANGLE-17", dec!(25), dec!(5)).await;

    let issued = ctx
        .services
        .allocations
        .create_allocation(job_allocation(item.id, dec!(5), ctx.user_id))
        .await
        .unwrap();
    ctx.services
        .allocations
        .issue_allocation(issued.id, ctx.user_id)
        .await
        .unwrap();
    let err = ctx
        .services
        .allocations
        .cancel_allocation(issued.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));

    let cancelled = ctx
        .services
        .allocations
        .create_allocation(job_allocation(item.id, dec!(5), ctx.user_id))
        .await
        .unwrap();
    ctx.services
        .allocations
        .cancel_allocation(cancelled.id)
        .await
        .unwrap();
    let err = ctx
        .services
        .allocations
        .cancel_allocation(cancelled.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}
