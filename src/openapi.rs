//! OpenAPI document for the principal endpoints.

use utoipa::OpenApi;

use crate::errors::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FieldOps Inventory API",
        description = "Stock ledger, allocations, purchasing, and count reconciliation"
    ),
    paths(
        crate::handlers::items::list_items,
        crate::handlers::items::create_item,
        crate::handlers::items::update_item,
        crate::handlers::transactions::append_transaction,
        crate::handlers::transactions::transfer_stock,
        crate::handlers::allocations::create_allocation,
        crate::handlers::allocations::issue_allocation,
        crate::handlers::purchase_orders::create_order,
        crate::handlers::purchase_orders::approve_order,
        crate::handlers::purchase_orders::receive_order,
        crate::handlers::stock_alerts::run_check,
        crate::handlers::counts::start_count,
        crate::handlers::counts::complete_count,
    ),
    components(schemas(ErrorResponse)),
    tags(
        (name = "items", description = "Item registry"),
        (name = "transactions", description = "Inventory transaction ledger"),
        (name = "allocations", description = "Job/bid allocations"),
        (name = "purchase-orders", description = "Purchasing workflow"),
        (name = "stock-alerts", description = "Stock alert monitor"),
        (name = "counts", description = "Physical count reconciliation"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/items"));
        assert!(doc
            .paths
            .paths
            .contains_key("/api/v1/purchase-orders/{id}/receive"));
    }
}
