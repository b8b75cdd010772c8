//! FieldOps API Library
//!
//! Inventory stock tracking for a field-service operations backend: item
//! registry, append-only transaction ledger, allocations against jobs and
//! bids, purchase order workflow, stock alerts, and physical count
//! reconciliation.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::{
    allocations::AllocationService, counts::CountService, items::ItemService,
    ledger::LedgerService, purchase_orders::PurchaseOrderService, registry::RegistryService,
    stock_alerts::StockAlertService,
};

/// Aggregated services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub items: Arc<ItemService>,
    pub ledger: Arc<LedgerService>,
    pub allocations: Arc<AllocationService>,
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub stock_alerts: Arc<StockAlertService>,
    pub counts: Arc<CountService>,
    pub registry: Arc<RegistryService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, cfg: &AppConfig) -> Self {
        let ledger = Arc::new(LedgerService::new(
            db.clone(),
            event_sender.clone(),
            cfg.allow_negative_correction,
        ));

        Self {
            items: Arc::new(ItemService::new(
                db.clone(),
                ledger.clone(),
                event_sender.clone(),
            )),
            allocations: Arc::new(AllocationService::new(
                db.clone(),
                ledger.clone(),
                event_sender.clone(),
            )),
            purchase_orders: Arc::new(PurchaseOrderService::new(
                db.clone(),
                ledger.clone(),
                event_sender.clone(),
            )),
            stock_alerts: Arc::new(StockAlertService::new(
                db.clone(),
                event_sender.clone(),
                cfg.alert_batch_size,
                cfg.expiry_horizon_days,
            )),
            counts: Arc::new(CountService::new(
                db.clone(),
                ledger.clone(),
                event_sender,
                cfg.count_batch_size,
            )),
            registry: Arc::new(RegistryService::new(db)),
            ledger,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub event_sender: EventSender,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig, event_sender: EventSender) -> Self {
        let services = AppServices::new(db.clone(), event_sender.clone(), &config);
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// Builds the full application router with middleware layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(handlers::health::router())
        .nest("/api/v1", handlers::api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
