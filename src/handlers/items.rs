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
    services::items::{CreateItemRequest, ItemFilter, UpdateItemRequest},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemFilters {
    pub organization_id: Option<Uuid>,
    pub status: Option<String>,
    pub active_only: Option<bool>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/low-stock", get(list_low_stock))
        .route(
            "/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/:id/transactions", get(item_transactions))
        .route("/:id/reconcile", post(reconcile_item))
}

/// List items with optional filtering.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(ItemFilters, PaginationParams),
    responses(
        (status = 200, description = "Item list returned"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(filters): Query<ItemFilters>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = ItemFilter {
        organization_id: filters.organization_id,
        status: filters.status,
        active_only: filters.active_only.unwrap_or(false),
        low_stock_only: false,
    };
    let (items, total) = state
        .services
        .items
        .list_items(filter, pagination.page(), pagination.limit())
        .await?;

    Ok(Json(json!({
        "items": items,
        "total": total,
        "page": pagination.page(),
        "limit": pagination.limit(),
    })))
}

/// Items at or below their reorder level.
pub async fn list_low_stock(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = ItemFilter {
        active_only: true,
        low_stock_only: true,
        ..Default::default()
    };
    let (items, total) = state
        .services
        .items
        .list_items(filter, pagination.page(), pagination.limit())
        .await?;

    Ok(Json(json!({ "items": items, "total": total })))
}

#[utoipa::path(
    post,
    path = "/api/v1/items",
    responses(
        (status = 201, description = "Item created"),
        (status = 409, description = "Duplicate item code", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.items.create_item(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.items.get_item(id).await?;
    Ok(Json(item))
}

/// Update non-quantity fields. Quantity fields in the payload are rejected
/// with 400: the projection belongs to the ledger.
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item updated"),
        (status = 400, description = "Direct quantity write attempt", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.items.update_item(id, payload).await?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.items.soft_delete_item(id).await?;
    Ok(Json(json!({ "deleted_id": id })))
}

/// Creation-ordered ledger history for an item.
pub async fn item_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    // 404 for unknown items rather than an empty history.
    state.services.items.get_item(id).await?;
    let (transactions, total) = state
        .services
        .ledger
        .list_for_item(id, pagination.page(), pagination.limit())
        .await?;

    Ok(Json(json!({ "transactions": transactions, "total": total })))
}

/// Replays the ledger and compares it to the cached projection.
pub async fn reconcile_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.items.reconcile(id).await?;
    Ok(Json(report))
}
