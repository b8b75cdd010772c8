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
use uuid::Uuid;

use crate::{
    errors::ServiceError, handlers::PaginationParams, services::counts::CreateCountRequest,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecordCountRequest {
    pub item_id: Uuid,
    pub counted_quantity: Decimal,
    pub counted_by: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CompleteCountRequest {
    pub performed_by: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CountFilters {
    pub status: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_counts).post(create_count))
        .route("/:id", get(get_count))
        .route("/:id/start", post(start_count))
        .route("/:id/items", get(list_count_items).post(record_count))
        .route("/:id/complete", post(complete_count))
        .route("/:id/cancel", post(cancel_count))
}

pub async fn create_count(
    State(state): State<AppState>,
    Json(payload): Json<CreateCountRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let count = state.services.counts.create_count(payload).await?;
    Ok((StatusCode::CREATED, Json(count)))
}

pub async fn list_counts(
    State(state): State<AppState>,
    Query(filters): Query<CountFilters>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (counts, total) = state
        .services
        .counts
        .list_counts(filters.status, pagination.page(), pagination.limit())
        .await?;

    Ok(Json(json!({ "counts": counts, "total": total })))
}

pub async fn get_count(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let count = state.services.counts.get_count(id).await?;
    Ok(Json(count))
}

/// Snapshots system quantities and opens the session for counting.
#[utoipa::path(
    post,
    path = "/api/v1/counts/{id}/start",
    params(("id" = Uuid, Path, description = "Count id")),
    responses(
        (status = 200, description = "Count started"),
        (status = 409, description = "Invalid transition", body = crate::errors::ErrorResponse)
    ),
    tag = "counts"
)]
pub async fn start_count(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let count = state.services.counts.start_count(id).await?;
    Ok(Json(count))
}

pub async fn list_count_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.counts.list_count_items(id).await?;
    Ok(Json(json!({ "items": items })))
}

pub async fn record_count(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordCountRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let line = state
        .services
        .counts
        .record_count(id, payload.item_id, payload.counted_quantity, payload.counted_by)
        .await?;
    Ok(Json(line))
}

/// Converges the ledger onto the counted quantities.
#[utoipa::path(
    post,
    path = "/api/v1/counts/{id}/complete",
    params(("id" = Uuid, Path, description = "Count id")),
    responses(
        (status = 200, description = "Count completed; adjustments appended"),
        (status = 409, description = "Invalid transition", body = crate::errors::ErrorResponse)
    ),
    tag = "counts"
)]
pub async fn complete_count(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteCountRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let count = state
        .services
        .counts
        .complete_count(id, payload.performed_by)
        .await?;
    Ok(Json(count))
}

pub async fn cancel_count(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let count = state.services.counts.cancel_count(id).await?;
    Ok(Json(count))
}
