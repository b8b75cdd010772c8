use axum::Router;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::AppState;

pub mod allocations;
pub mod counts;
pub mod health;
pub mod items;
pub mod purchase_orders;
pub mod registry;
pub mod stock_alerts;
pub mod transactions;

/// Common pagination query parameters for list endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(50).clamp(1, 1000)
    }
}

/// Composes the `/api/v1` surface.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/items", items::router())
        .nest("/transactions", transactions::router())
        .nest("/allocations", allocations::router())
        .nest("/purchase-orders", purchase_orders::router())
        .nest("/stock-alerts", stock_alerts::router())
        .nest("/counts", counts::router())
        .nest("/suppliers", registry::suppliers_router())
        .nest("/locations", registry::locations_router())
        .nest("/categories", registry::categories_router())
        .nest("/units", registry::units_router())
}
