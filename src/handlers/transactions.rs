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
    entities::inventory_transaction::TransactionType,
    errors::ServiceError,
    services::ledger::{AppendTransaction, TransferRequest},
    AppState,
};

/// Manual ledger append: adjustments, write-offs, receipts outside a
/// purchase order, and opening balances.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AppendTransactionRequest {
    pub item_id: Uuid,
    pub transaction_type: String,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub job_id: Option<Uuid>,
    pub bid_id: Option<Uuid>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub performed_by: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TransferStockRequest {
    pub item_id: Uuid,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub quantity: Decimal,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub performed_by: Uuid,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(append_transaction))
        .route("/transfer", post(transfer_stock))
        .route("/item/:item_id", get(list_item_transactions))
}

/// Appends a ledger row. Issue and return here are for movements outside
/// the allocation engine; allocation lifecycles use their own endpoints.
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    responses(
        (status = 201, description = "Transaction appended"),
        (status = 400, description = "Invalid quantity or type", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn append_transaction(
    State(state): State<AppState>,
    Json(payload): Json<AppendTransactionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let transaction_type = TransactionType::from_str(&payload.transaction_type).ok_or_else(|| {
        ServiceError::ValidationError(format!(
            "{} is not a valid transaction type",
            payload.transaction_type
        ))
    })?;
    if transaction_type == TransactionType::Transfer {
        return Err(ServiceError::InvalidOperation(
            "use the transfer endpoint for location transfers".to_string(),
        ));
    }

    let mut request = AppendTransaction::new(payload.item_id, transaction_type, payload.quantity);
    request.unit_cost = payload.unit_cost;
    request.job_id = payload.job_id;
    request.bid_id = payload.bid_id;
    request.reason = payload.reason;
    request.notes = payload.notes;
    request.performed_by = payload.performed_by;

    let recorded = state.services.ledger.append(request).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// Moves stock between locations: two linked ledger rows, one atomic
/// operation.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/transfer",
    responses(
        (status = 201, description = "Transfer recorded"),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn transfer_stock(
    State(state): State<AppState>,
    Json(payload): Json<TransferStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state
        .services
        .ledger
        .transfer(TransferRequest {
            item_id: payload.item_id,
            from_location_id: payload.from_location_id,
            to_location_id: payload.to_location_id,
            quantity: payload.quantity,
            reason: payload.reason,
            notes: payload.notes,
            performed_by: payload.performed_by,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "transactions": rows }))))
}

pub async fn list_item_transactions(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Query(pagination): Query<crate::handlers::PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (transactions, total) = state
        .services
        .ledger
        .list_for_item(item_id, pagination.page(), pagination.limit())
        .await?;

    Ok(Json(json!({ "transactions": transactions, "total": total })))
}
