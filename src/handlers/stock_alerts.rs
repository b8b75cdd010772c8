use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    errors::ServiceError, handlers::PaginationParams, services::stock_alerts::AlertFilter,
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AlertFilters {
    pub item_id: Option<Uuid>,
    pub alert_type: Option<String>,
    pub open_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub acknowledged_by: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub resolved_by: Uuid,
    pub notes: Option<String>,
}

/// Expiry signal from the external lot tracker.
#[derive(Debug, Deserialize)]
pub struct ExpiringRequest {
    pub item_id: Uuid,
    pub expiry_date: DateTime<Utc>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_alerts))
        .route("/check", post(run_check))
        .route("/expiring", post(raise_expiring))
        .route("/:id", get(get_alert))
        .route("/:id/acknowledge", post(acknowledge_alert))
        .route("/:id/resolve", post(resolve_alert))
}

pub async fn list_alerts(
    State(state): State<AppState>,
    Query(filters): Query<AlertFilters>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = AlertFilter {
        item_id: filters.item_id,
        alert_type: filters.alert_type,
        open_only: filters.open_only.unwrap_or(false),
    };
    let (alerts, total) = state
        .services
        .stock_alerts
        .list_alerts(filter, pagination.page(), pagination.limit())
        .await?;

    Ok(Json(json!({ "alerts": alerts, "total": total })))
}

/// Full derivation sweep over active items.
#[utoipa::path(
    post,
    path = "/api/v1/stock-alerts/check",
    responses((status = 200, description = "Sweep completed")),
    tag = "stock-alerts"
)]
pub async fn run_check(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let result = state.services.stock_alerts.run_check().await?;
    Ok(Json(result))
}

pub async fn raise_expiring(
    State(state): State<AppState>,
    Json(payload): Json<ExpiringRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let alert = state
        .services
        .stock_alerts
        .raise_expiring(payload.item_id, payload.expiry_date)
        .await?;
    Ok(Json(json!({ "alert": alert })))
}

pub async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let alert = state.services.stock_alerts.get_alert(id).await?;
    Ok(Json(alert))
}

pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcknowledgeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let alert = state
        .services
        .stock_alerts
        .acknowledge(id, payload.acknowledged_by)
        .await?;
    Ok(Json(alert))
}

pub async fn resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let alert = state
        .services
        .stock_alerts
        .resolve(id, payload.resolved_by, payload.notes)
        .await?;
    Ok(Json(alert))
}
