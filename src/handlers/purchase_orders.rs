use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    handlers::PaginationParams,
    services::purchase_orders::{
        CreatePurchaseOrderRequest, LineReceipt, PurchaseOrderFilter, UpdateDraftRequest,
    },
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PurchaseOrderFilters {
    pub supplier_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ApproveRequest {
    pub approved_by: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReceiveRequest {
    pub lines: Vec<LineReceipt>,
    pub performed_by: Uuid,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).put(update_draft))
        .route("/:id/submit", post(submit_order))
        .route("/:id/approve", post(approve_order))
        .route("/:id/send", post(send_order))
        .route("/:id/receive", post(receive_order))
        .route("/:id/cancel", post(cancel_order))
        .route("/:id/close", post(close_order))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    responses(
        (status = 201, description = "Draft order created"),
        (status = 404, description = "Unknown supplier or item", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.purchase_orders.create_order(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(filters): Query<PurchaseOrderFilters>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = PurchaseOrderFilter {
        supplier_id: filters.supplier_id,
        status: filters.status,
    };
    let (orders, total) = state
        .services
        .purchase_orders
        .list_orders(filter, pagination.page(), pagination.limit())
        .await?;

    Ok(Json(json!({ "purchase_orders": orders, "total": total })))
}

/// Order header together with its lines.
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.purchase_orders.get_order(id).await?;
    let lines = state.services.purchase_orders.get_order_lines(id).await?;
    Ok(Json(json!({ "order": order, "lines": lines })))
}

pub async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDraftRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .purchase_orders
        .update_draft(id, payload)
        .await?;
    Ok(Json(order))
}

pub async fn submit_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.purchase_orders.submit(id).await?;
    Ok(Json(order))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/approve",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order approved; expected supply registered"),
        (status = 403, description = "Order has no line items", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invalid transition", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn approve_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .purchase_orders
        .approve(id, payload.approved_by)
        .await?;
    Ok(Json(order))
}

pub async fn send_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.purchase_orders.send(id).await?;
    Ok(Json(order))
}

/// Records per-line receipt deltas and advances the order status.
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/receive",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Receipt recorded"),
        (status = 400, description = "Delta exceeds remaining quantity", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invalid transition", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn receive_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceiveRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .purchase_orders
        .receive(id, payload.lines, payload.performed_by)
        .await?;
    Ok(Json(order))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.purchase_orders.cancel(id).await?;
    Ok(Json(order))
}

pub async fn close_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.purchase_orders.close(id).await?;
    Ok(Json(order))
}
