// Each integration test binary uses a different slice of these helpers.
#![allow(dead_code)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use fieldops_api::{
    config::AppConfig,
    db,
    entities::{inventory_item, supplier},
    events::{Event, EventSender},
    services::items::CreateItemRequest,
    services::registry::SupplierRequest,
    AppServices,
};

pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    // Held so events keep flowing instead of logging closed-channel warnings.
    #[allow(dead_code)]
    pub events: mpsc::Receiver<Event>,
    pub org_id: Uuid,
    pub user_id: Uuid,
}

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".to_string(),
        port: 8080,
        environment: "test".to_string(),
        log_level: "debug".to_string(),
        log_json: false,
        auto_migrate: true,
        db_max_connections: 5,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 60,
        allow_negative_correction: false,
        alert_batch_size: 50,
        count_batch_size: 50,
        expiry_horizon_days: 30,
    }
}

/// Fresh in-memory database with migrations applied and services wired.
pub async fn setup() -> TestContext {
    // A named shared-cache memory database keeps every pooled connection on
    // the same data while isolating parallel tests from each other.
    let database_url = format!(
        "sqlite:file:test_{}?mode=memory&cache=shared",
        Uuid::new_v4().simple()
    );
    let cfg = test_config(&database_url);

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .expect("Failed to create DB pool");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let db = Arc::new(pool);
    let (tx, rx) = mpsc::channel(1024);
    let event_sender = EventSender::new(tx);
    let services = AppServices::new(db.clone(), event_sender, &cfg);

    TestContext {
        db,
        services,
        events: rx,
        org_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
    }
}

/// Creates an item with the given opening balance and reorder level.
pub async fn seed_item(
    ctx: &TestContext,
    code: &str,
    initial_quantity: Decimal,
    reorder_level: Decimal,
) -> inventory_item::Model {
    ctx.services
        .items
        .create_item(CreateItemRequest {
            organization_id: ctx.org_id,
            item_code: code.to_string(),
            name: format!("{} test item", code),
            description: None,
            category_id: None,
            unit_of_measure_id: None,
            unit_cost: dec!(10),
            selling_price: Some(dec!(25)),
            reorder_level,
            reorder_quantity: dec!(20),
            max_stock_level: None,
            track_serial: false,
            track_batch: false,
            initial_quantity: Some(initial_quantity),
            performed_by: ctx.user_id,
        })
        .await
        .expect("Failed to create item")
}

pub async fn seed_supplier(ctx: &TestContext, name: &str) -> supplier::Model {
    ctx.services
        .registry
        .create_supplier(SupplierRequest {
            name: name.to_string(),
            contact_name: None,
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: None,
            address: None,
        })
        .await
        .expect("Failed to create supplier")
}

/// Reloads an item to observe its current projection.
pub async fn reload_item(ctx: &TestContext, item_id: Uuid) -> inventory_item::Model {
    ctx.services
        .items
        .get_item(item_id)
        .await
        .expect("Failed to reload item")
}

/// Asserts the core projection invariant for an item.
pub fn assert_projection_invariant(item: &inventory_item::Model) {
    assert_eq!(
        item.quantity_on_hand,
        item.quantity_allocated + item.quantity_available,
        "on_hand must equal allocated + available for {}",
        item.item_code
    );
    assert!(
        item.quantity_available >= Decimal::ZERO,
        "available must not be negative for {}",
        item.item_code
    );
    assert!(
        item.quantity_allocated >= Decimal::ZERO,
        "allocated must not be negative for {}",
        item.item_code
    );
}
