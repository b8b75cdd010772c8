pub mod allocations;
pub mod counts;
pub mod items;
pub mod ledger;
pub mod purchase_orders;
pub mod registry;
pub mod stock_alerts;
