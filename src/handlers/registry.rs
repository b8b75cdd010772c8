use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    handlers::PaginationParams,
    services::registry::{CategoryRequest, LocationRequest, SupplierRequest, UnitOfMeasureRequest},
    AppState,
};

pub fn suppliers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}

pub fn locations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route("/:id", get(get_location).delete(delete_location))
}

pub fn categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", axum::routing::delete(delete_category))
}

pub fn units_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_units).post(create_unit))
        .route("/:id", axum::routing::delete(delete_unit))
}

// Suppliers

pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<SupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.registry.create_supplier(payload).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (suppliers, total) = state
        .services
        .registry
        .list_suppliers(pagination.page(), pagination.limit())
        .await?;
    Ok(Json(json!({ "suppliers": suppliers, "total": total })))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.registry.get_supplier(id).await?;
    Ok(Json(supplier))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.registry.update_supplier(id, payload).await?;
    Ok(Json(supplier))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.registry.deactivate_supplier(id).await?;
    Ok(Json(json!({ "deleted_id": id })))
}

// Locations

pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<LocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let location = state.services.registry.create_location(payload).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let locations = state.services.registry.list_locations().await?;
    Ok(Json(json!({ "locations": locations })))
}

pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let location = state.services.registry.get_location(id).await?;
    Ok(Json(location))
}

pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.registry.deactivate_location(id).await?;
    Ok(Json(json!({ "deleted_id": id })))
}

// Categories

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.registry.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state.services.registry.list_categories().await?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.registry.deactivate_category(id).await?;
    Ok(Json(json!({ "deleted_id": id })))
}

// Units of measure

pub async fn create_unit(
    State(state): State<AppState>,
    Json(payload): Json<UnitOfMeasureRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let unit = state.services.registry.create_unit(payload).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn list_units(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let units = state.services.registry.list_units().await?;
    Ok(Json(json!({ "units": units })))
}

pub async fn delete_unit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.registry.deactivate_unit(id).await?;
    Ok(Json(json!({ "deleted_id": id })))
}
