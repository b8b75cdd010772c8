mod common;

use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{reload_item, seed_item, seed_supplier, setup, TestContext};
use fieldops_api::{
    errors::ServiceError,
    services::purchase_orders::{
        CreateOrderLine, CreatePurchaseOrderRequest, LineReceipt, UpdateDraftRequest,
    },
};

async fn draft_order(
    ctx: &TestContext,
    supplier_id: Uuid,
    lines: Vec<CreateOrderLine>,
) -> fieldops_api::entities::purchase_order::Model {
    ctx.services
        .purchase_orders
        .create_order(CreatePurchaseOrderRequest {
            supplier_id,
            expected_delivery_date: None,
            lines,
            tax_amount: Some(dec!(5)),
            shipping_cost: Some(dec!(10)),
            notes: None,
            created_by: ctx.user_id,
        })
        .await
        .expect("Failed to create order")
}

#[tokio::test]
async fn create_computes_rollups() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx, "Acme").await;
    let item = seed_item(&ctx, "SCREW-4", dec!(0), dec!(10)).await;

    let order = draft_order(
        &ctx,
        supplier.id,
        vec![CreateOrderLine {
            item_id: item.id,
            quantity: dec!(50),
            unit_cost: dec!(2),
        }],
    )
    .await;

    assert_eq!(order.status, "draft");
    assert_eq!(order.subtotal, dec!(100));
    assert_eq!(order.total_amount, dec!(115));
    assert!(order.order_number.starts_with("PO-"));

    let lines = ctx
        .services
        .purchase_orders
        .get_order_lines(order.id)
        .await
        .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].line_total, dec!(100));
}

#[tokio::test]
async fn draft_lines_can_be_replaced_until_submission() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx, "DraftCo").await;
    let item = seed_item(&ctx, "WASHER-2", dec!(0), dec!(5)).await;

    let order = draft_order(
        &ctx,
        supplier.id,
        vec![CreateOrderLine {
            item_id: item.id,
            quantity: dec!(10),
            unit_cost: dec!(2),
        }],
    )
    .await;

    let updated = ctx
        .services
        .purchase_orders
        .update_draft(
            order.id,
            UpdateDraftRequest {
                lines: Some(vec![CreateOrderLine {
                    item_id: item.id,
                    quantity: dec!(25),
                    unit_cost: dec!(2),
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.subtotal, dec!(50));
    assert_eq!(updated.total_amount, dec!(65)); // 50 + 5 tax + 10 shipping

    let lines = ctx
        .services
        .purchase_orders
        .get_order_lines(order.id)
        .await
        .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity_ordered, dec!(25));

    // Submitted orders are frozen.
    ctx.services.purchase_orders.submit(order.id).await.unwrap();
    let err = ctx
        .services
        .purchase_orders
        .update_draft(order.id, UpdateDraftRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}

#[tokio::test]
async fn approval_registers_expected_supply() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx, "Best Parts").await;
    let item = seed_item(&ctx, "NUT-6", dec!(0), dec!(10)).await;

    let order = draft_order(
        &ctx,
        supplier.id,
        vec![CreateOrderLine {
            item_id: item.id,
            quantity: dec!(30),
            unit_cost: dec!(1),
        }],
    )
    .await;

    ctx.services.purchase_orders.submit(order.id).await.unwrap();
    let approved = ctx
        .services
        .purchase_orders
        .approve(order.id, ctx.user_id)
        .await
        .unwrap();
    assert_eq!(approved.status, "approved");
    assert!(approved.approved_at.is_some());

    let item = reload_item(&ctx, item.id).await;
    assert_eq!(item.quantity_on_order, dec!(30));
    // Out of stock with expected supply: the workflow override kicks in.
    assert_eq!(item.status, "on_order");
}

#[tokio::test]
async fn approve_without_lines_is_forbidden() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx, "EmptyCo").await;

    let order = draft_order(&ctx, supplier.id, vec![]).await;
    ctx.services.purchase_orders.submit(order.id).await.unwrap();

    let err = ctx
        .services
        .purchase_orders
        .approve(order.id, ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn transitions_never_skip_or_regress() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx, "StrictCo").await;
    let item = seed_item(&ctx, "PIN-9", dec!(0), dec!(5)).await;
    let order = draft_order(
        &ctx,
        supplier.id,
        vec![CreateOrderLine {
            item_id: item.id,
            quantity: dec!(10),
            unit_cost: dec!(3),
        }],
    )
    .await;

    // draft -> approved skips pending_approval.
    let err = ctx
        .services
        .purchase_orders
        .approve(order.id, ctx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));

    // draft -> sent skips the whole approval leg.
    let err = ctx.services.purchase_orders.send(order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));

    ctx.services.purchase_orders.submit(order.id).await.unwrap();
    // Resubmission does not regress.
    let err = ctx.services.purchase_orders.submit(order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));

    // Receiving before the order was sent is invalid.
    ctx.services
        .purchase_orders
        .approve(order.id, ctx.user_id)
        .await
        .unwrap();
    let lines = ctx
        .services
        .purchase_orders
        .get_order_lines(order.id)
        .await
        .unwrap();
    let err = ctx
        .services
        .purchase_orders
        .receive(
            order.id,
            vec![LineReceipt {
                line_id: lines[0].id,
                quantity: dec!(1),
            }],
            ctx.user_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}

#[tokio::test]
async fn two_line_partial_then_full_receipt() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx, "TwoLine").await;
    let item_a = seed_item(&ctx, "LEFT-1", dec!(0), dec!(2)).await;
    let item_b = seed_item(&ctx, "RIGHT-1", dec!(0), dec!(2)).await;

    let order = draft_order(
        &ctx,
        supplier.id,
        vec![
            CreateOrderLine {
                item_id: item_a.id,
                quantity: dec!(10),
                unit_cost: dec!(4),
            },
            CreateOrderLine {
                item_id: item_b.id,
                quantity: dec!(10),
                unit_cost: dec!(4),
            },
        ],
    )
    .await;

    ctx.services.purchase_orders.submit(order.id).await.unwrap();
    ctx.services
        .purchase_orders
        .approve(order.id, ctx.user_id)
        .await
        .unwrap();
    ctx.services.purchase_orders.send(order.id).await.unwrap();

    let lines = ctx
        .services
        .purchase_orders
        .get_order_lines(order.id)
        .await
        .unwrap();
    let line_a = lines.iter().find(|l| l.item_id == item_a.id).unwrap();
    let line_b = lines.iter().find(|l| l.item_id == item_b.id).unwrap();

    // First delivery: 10/0.
    let after_first = ctx
        .services
        .purchase_orders
        .receive(
            order.id,
            vec![LineReceipt {
                line_id: line_a.id,
                quantity: dec!(10),
            }],
            ctx.user_id,
        )
        .await
        .unwrap();
    assert_eq!(after_first.status, "partially_received");

    let item_a_state = reload_item(&ctx, item_a.id).await;
    assert_eq!(item_a_state.quantity_on_hand, dec!(10));
    assert_eq!(item_a_state.quantity_on_order, dec!(0));

    // Second delivery: 0/10 completes the order.
    let after_second = ctx
        .services
        .purchase_orders
        .receive(
            order.id,
            vec![LineReceipt {
                line_id: line_b.id,
                quantity: dec!(10),
            }],
            ctx.user_id,
        )
        .await
        .unwrap();
    assert_eq!(after_second.status, "received");

    let item_b_state = reload_item(&ctx, item_b.id).await;
    assert_eq!(item_b_state.quantity_on_hand, dec!(10));
    assert_eq!(item_b_state.quantity_on_order, dec!(0));

    // Receipt monotonicity: line quantities only ever grew.
    let lines = ctx
        .services
        .purchase_orders
        .get_order_lines(order.id)
        .await
        .unwrap();
    assert!(lines.iter().all(|l| l.quantity_received == dec!(10)));
}

#[tokio::test]
async fn over_receipt_is_rejected() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx, "OverCo").await;
    let item = seed_item(&ctx, "CAP-5", dec!(0), dec!(2)).await;
    let order = draft_order(
        &ctx,
        supplier.id,
        vec![CreateOrderLine {
            item_id: item.id,
            quantity: dec!(10),
            unit_cost: dec!(1),
        }],
    )
    .await;

    ctx.services.purchase_orders.submit(order.id).await.unwrap();
    ctx.services
        .purchase_orders
        .approve(order.id, ctx.user_id)
        .await
        .unwrap();
    ctx.services.purchase_orders.send(order.id).await.unwrap();

    let lines = ctx
        .services
        .purchase_orders
        .get_order_lines(order.id)
        .await
        .unwrap();

    ctx.services
        .purchase_orders
        .receive(
            order.id,
            vec![LineReceipt {
                line_id: lines[0].id,
                quantity: dec!(7),
            }],
            ctx.user_id,
        )
        .await
        .unwrap();

    let err = ctx
        .services
        .purchase_orders
        .receive(
            order.id,
            vec![LineReceipt {
                line_id: lines[0].id,
                quantity: dec!(4),
            }],
            ctx.user_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // The failed call must not have moved stock.
    let item_state = reload_item(&ctx, item.id).await;
    assert_eq!(item_state.quantity_on_hand, dec!(7));
    let report = ctx.services.items.reconcile(item.id).await.unwrap();
    assert!(report.matches);
}

#[tokio::test]
async fn cancel_releases_unreceived_remainder() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx, "CancelCo").await;
    let item = seed_item(&ctx, "SEAL-3", dec!(0), dec!(2)).await;
    let order = draft_order(
        &ctx,
        supplier.id,
        vec![CreateOrderLine {
            item_id: item.id,
            quantity: dec!(20),
            unit_cost: dec!(2),
        }],
    )
    .await;

    ctx.services.purchase_orders.submit(order.id).await.unwrap();
    ctx.services
        .purchase_orders
        .approve(order.id, ctx.user_id)
        .await
        .unwrap();
    ctx.services.purchase_orders.send(order.id).await.unwrap();

    let lines = ctx
        .services
        .purchase_orders
        .get_order_lines(order.id)
        .await
        .unwrap();
    ctx.services
        .purchase_orders
        .receive(
            order.id,
            vec![LineReceipt {
                line_id: lines[0].id,
                quantity: dec!(5),
            }],
            ctx.user_id,
        )
        .await
        .unwrap();

    let item_state = reload_item(&ctx, item.id).await;
    assert_eq!(item_state.quantity_on_order, dec!(15));

    let cancelled = ctx.services.purchase_orders.cancel(order.id).await.unwrap();
    assert_eq!(cancelled.status, "cancelled");

    // Only the unreceived remainder is released; received stock stays.
    let item_state = reload_item(&ctx, item_state.id).await;
    assert_eq!(item_state.quantity_on_order, dec!(0));
    assert_eq!(item_state.quantity_on_hand, dec!(5));
}

#[tokio::test]
async fn close_requires_received_or_cancelled() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx, "CloseCo").await;
    let item = seed_item(&ctx, "LUG-2", dec!(0), dec!(2)).await;
    let order = draft_order(
        &ctx,
        supplier.id,
        vec![CreateOrderLine {
            item_id: item.id,
            quantity: dec!(5),
            unit_cost: dec!(2),
        }],
    )
    .await;

    let err = ctx.services.purchase_orders.close(order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    ctx.services.purchase_orders.cancel(order.id).await.unwrap();
    let closed = ctx.services.purchase_orders.close(order.id).await.unwrap();
    assert_eq!(closed.status, "closed");

    // Terminal means terminal.
    let err = ctx.services.purchase_orders.cancel(order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}
