use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    handlers::PaginationParams,
    services::allocations::{AllocationFilter, CreateAllocationRequest},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AllocationFilters {
    pub item_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub bid_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct IssueRequest {
    pub performed_by: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    /// Zero means "everything was consumed"; the allocation finalizes as
    /// fully used.
    pub quantity_returned: Decimal,
    pub performed_by: Uuid,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_allocations).post(create_allocation))
        .route("/:id", get(get_allocation))
        .route("/:id/issue", post(issue_allocation))
        .route("/:id/return", post(return_allocation))
        .route("/:id/cancel", post(cancel_allocation))
}

#[utoipa::path(
    post,
    path = "/api/v1/allocations",
    responses(
        (status = 201, description = "Allocation created"),
        (status = 422, description = "Insufficient available stock", body = crate::errors::ErrorResponse)
    ),
    tag = "allocations"
)]
pub async fn create_allocation(
    State(state): State<AppState>,
    Json(payload): Json<CreateAllocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let allocation = state.services.allocations.create_allocation(payload).await?;
    Ok((StatusCode::CREATED, Json(allocation)))
}

pub async fn list_allocations(
    State(state): State<AppState>,
    Query(filters): Query<AllocationFilters>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = AllocationFilter {
        item_id: filters.item_id,
        job_id: filters.job_id,
        bid_id: filters.bid_id,
        status: filters.status,
    };
    let (allocations, total) = state
        .services
        .allocations
        .list_allocations(filter, pagination.page(), pagination.limit())
        .await?;

    Ok(Json(json!({ "allocations": allocations, "total": total })))
}

pub async fn get_allocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let allocation = state.services.allocations.get_allocation(id).await?;
    Ok(Json(allocation))
}

#[utoipa::path(
    post,
    path = "/api/v1/allocations/{id}/issue",
    params(("id" = Uuid, Path, description = "Allocation id")),
    responses(
        (status = 200, description = "Allocation issued"),
        (status = 409, description = "Invalid transition", body = crate::errors::ErrorResponse)
    ),
    tag = "allocations"
)]
pub async fn issue_allocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<IssueRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let allocation = state
        .services
        .allocations
        .issue_allocation(id, payload.performed_by)
        .await?;
    Ok(Json(allocation))
}

pub async fn return_allocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReturnRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let allocation = state
        .services
        .allocations
        .return_allocation(id, payload.quantity_returned, payload.performed_by)
        .await?;
    Ok(Json(allocation))
}

pub async fn cancel_allocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let allocation = state.services.allocations.cancel_allocation(id).await?;
    Ok(Json(allocation))
}
