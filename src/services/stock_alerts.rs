//! Stock alert monitor: a derived, re-evaluatable view over item registry
//! state. Alerts are advisory; a stale open alert is left for explicit
//! resolution so the audit trail survives the condition clearing itself.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::inventory_item::{self, Entity as InventoryItem, ItemStatus},
    entities::stock_alert::{self, AlertSeverity, AlertType, Entity as StockAlert},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Outcome of one monitor sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub items_examined: u64,
    pub alerts_raised: u64,
    pub swept_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub item_id: Option<Uuid>,
    pub alert_type: Option<String>,
    pub open_only: bool,
}

/// A threshold breach detected for an item.
struct Breach {
    alert_type: AlertType,
    severity: AlertSeverity,
    threshold: Option<Decimal>,
    message: String,
}

/// Pure derivation: which alerts does this item's state warrant right now?
fn evaluate_item(item: &inventory_item::Model) -> Vec<Breach> {
    let mut breaches = Vec::new();

    if !item.is_active || item.override_enum() == Some(ItemStatus::Discontinued) {
        return breaches;
    }

    if item.quantity_on_hand.is_zero() {
        breaches.push(Breach {
            alert_type: AlertType::OutOfStock,
            severity: AlertSeverity::Critical,
            threshold: None,
            message: format!("{} is out of stock", item.item_code),
        });
    } else if item.quantity_on_hand <= item.reorder_level {
        breaches.push(Breach {
            alert_type: AlertType::LowStock,
            severity: AlertSeverity::Warning,
            threshold: Some(item.reorder_level),
            message: format!(
                "{} is at {} (reorder level {})",
                item.item_code, item.quantity_on_hand, item.reorder_level
            ),
        });
    }

    if let Some(max_level) = item.max_stock_level {
        if item.quantity_on_hand > max_level {
            breaches.push(Breach {
                alert_type: AlertType::Overstock,
                severity: AlertSeverity::Info,
                threshold: Some(max_level),
                message: format!(
                    "{} is at {} (max stock level {})",
                    item.item_code, item.quantity_on_hand, max_level
                ),
            });
        }
    }

    breaches
}

#[derive(Clone)]
pub struct StockAlertService {
    db: Arc<DbPool>,
    event_sender: EventSender,
    batch_size: u64,
    expiry_horizon_days: i64,
}

impl StockAlertService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: EventSender,
        batch_size: u64,
        expiry_horizon_days: i64,
    ) -> Self {
        Self {
            db,
            event_sender,
            batch_size: batch_size.max(1),
            expiry_horizon_days,
        }
    }

    /// Sweeps every active item in pages, raising alerts for conditions with
    /// no open alert of the same type. Stale alerts are never auto-closed.
    #[instrument(skip(self))]
    pub async fn run_check(&self) -> Result<SweepResult, ServiceError> {
        let db = &*self.db;

        let paginator = InventoryItem::find()
            .filter(inventory_item::Column::IsActive.eq(true))
            .order_by_asc(inventory_item::Column::ItemCode)
            .paginate(db, self.batch_size);

        let pages = paginator.num_pages().await.map_err(ServiceError::db_error)?;

        let mut items_examined = 0u64;
        let mut alerts_raised = 0u64;

        for page in 0..pages {
            let items = paginator
                .fetch_page(page)
                .await
                .map_err(ServiceError::db_error)?;
            for item in &items {
                items_examined += 1;
                alerts_raised += self.raise_breaches(item).await?;
            }
        }

        info!(items_examined, alerts_raised, "Stock alert sweep completed");

        Ok(SweepResult {
            items_examined,
            alerts_raised,
            swept_at: Utc::now(),
        })
    }

    /// Triggered re-evaluation of one item, used after ledger application.
    #[instrument(skip(self))]
    pub async fn check_item(&self, item_id: Uuid) -> Result<u64, ServiceError> {
        let db = &*self.db;
        let item = InventoryItem::find_by_id(item_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

        self.raise_breaches(&item).await
    }

    /// Entry point for the external lot tracker: raises an `expiring` alert
    /// when the given expiry date falls within the configured horizon. The
    /// core stores no lot-level expiry data itself.
    #[instrument(skip(self))]
    pub async fn raise_expiring(
        &self,
        item_id: Uuid,
        expiry_date: DateTime<Utc>,
    ) -> Result<Option<stock_alert::Model>, ServiceError> {
        let db = &*self.db;
        let item = InventoryItem::find_by_id(item_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

        if !item.track_serial && !item.track_batch {
            return Err(ServiceError::InvalidOperation(format!(
                "Item {} is not serial- or batch-tracked",
                item.item_code
            )));
        }

        let horizon = Utc::now() + Duration::days(self.expiry_horizon_days);
        if expiry_date > horizon {
            return Ok(None);
        }

        let breach = Breach {
            alert_type: AlertType::Expiring,
            severity: AlertSeverity::Warning,
            threshold: None,
            message: format!(
                "{} has stock expiring on {}",
                item.item_code,
                expiry_date.date_naive()
            ),
        };
        let created = self.insert_unless_open(&item, breach).await?;
        Ok(created)
    }

    /// Acknowledgement is informational, not a gate; it is one-way.
    #[instrument(skip(self))]
    pub async fn acknowledge(
        &self,
        alert_id: Uuid,
        acknowledged_by: Uuid,
    ) -> Result<stock_alert::Model, ServiceError> {
        let db = &*self.db;
        let alert = self.get_alert(alert_id).await?;

        if alert.is_resolved {
            return Err(ServiceError::InvalidTransition(format!(
                "alert {} is already resolved",
                alert_id
            )));
        }
        if alert.is_acknowledged {
            return Err(ServiceError::InvalidTransition(format!(
                "alert {} is already acknowledged",
                alert_id
            )));
        }

        let mut active: stock_alert::ActiveModel = alert.into();
        active.is_acknowledged = Set(true);
        active.acknowledged_by = Set(Some(acknowledged_by));
        active.acknowledged_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Resolution closes the alert. Resolving an unacknowledged alert is
    /// allowed.
    #[instrument(skip(self, notes))]
    pub async fn resolve(
        &self,
        alert_id: Uuid,
        resolved_by: Uuid,
        notes: Option<String>,
    ) -> Result<stock_alert::Model, ServiceError> {
        let db = &*self.db;
        let alert = self.get_alert(alert_id).await?;

        if alert.is_resolved {
            return Err(ServiceError::InvalidTransition(format!(
                "alert {} is already resolved",
                alert_id
            )));
        }

        let mut active: stock_alert::ActiveModel = alert.into();
        active.is_resolved = Set(true);
        active.resolved_by = Set(Some(resolved_by));
        active.resolved_at = Set(Some(Utc::now()));
        active.resolution_notes = Set(notes);
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::StockAlertResolved(updated.id))
            .await;

        Ok(updated)
    }

    pub async fn get_alert(&self, alert_id: Uuid) -> Result<stock_alert::Model, ServiceError> {
        let db = &*self.db;
        StockAlert::find_by_id(alert_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Alert {} not found", alert_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_alerts(
        &self,
        filter: AlertFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<stock_alert::Model>, u64), ServiceError> {
        if page == 0 {
            return Err(ServiceError::ValidationError(
                "Page number must be greater than 0".to_string(),
            ));
        }

        let db = &*self.db;
        let mut query = StockAlert::find();

        if let Some(item_id) = filter.item_id {
            query = query.filter(stock_alert::Column::ItemId.eq(item_id));
        }
        if let Some(alert_type) = &filter.alert_type {
            query = query.filter(stock_alert::Column::AlertType.eq(alert_type.clone()));
        }
        if filter.open_only {
            query = query.filter(stock_alert::Column::IsResolved.eq(false));
        }

        query = query.order_by_desc(stock_alert::Column::CreatedAt);

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((rows, total))
    }

    async fn raise_breaches(&self, item: &inventory_item::Model) -> Result<u64, ServiceError> {
        let mut raised = 0u64;
        for breach in evaluate_item(item) {
            if self.insert_unless_open(item, breach).await?.is_some() {
                raised += 1;
            }
        }
        Ok(raised)
    }

    async fn insert_unless_open(
        &self,
        item: &inventory_item::Model,
        breach: Breach,
    ) -> Result<Option<stock_alert::Model>, ServiceError> {
        let db = &*self.db;

        let open_exists = StockAlert::find()
            .filter(stock_alert::Column::ItemId.eq(item.id))
            .filter(stock_alert::Column::AlertType.eq(breach.alert_type.as_str()))
            .filter(stock_alert::Column::IsResolved.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if open_exists.is_some() {
            return Ok(None);
        }

        let alert = stock_alert::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(item.id),
            alert_type: Set(breach.alert_type.as_str().to_string()),
            severity: Set(breach.severity.as_str().to_string()),
            quantity_on_hand: Set(item.quantity_on_hand),
            threshold: Set(breach.threshold),
            message: Set(breach.message),
            is_acknowledged: Set(false),
            acknowledged_by: Set(None),
            acknowledged_at: Set(None),
            is_resolved: Set(false),
            resolved_by: Set(None),
            resolved_at: Set(None),
            resolution_notes: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::StockAlertRaised {
                alert_id: alert.id,
                item_id: alert.item_id,
                alert_type: alert.alert_type.clone(),
                severity: alert.severity.clone(),
            })
            .await;

        info!(
            item = %item.item_code,
            alert_type = %alert.alert_type,
            "Stock alert raised"
        );

        Ok(Some(alert))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn item(on_hand: Decimal, reorder: Decimal, max: Option<Decimal>) -> inventory_item::Model {
        inventory_item::Model {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            item_code: "WID-1".to_string(),
            name: "Widget".to_string(),
            description: None,
            category_id: None,
            unit_of_measure_id: None,
            unit_cost: dec!(1),
            average_cost: dec!(1),
            selling_price: None,
            quantity_on_hand: on_hand,
            quantity_allocated: dec!(0),
            quantity_available: on_hand,
            quantity_on_order: dec!(0),
            reorder_level: reorder,
            reorder_quantity: dec!(0),
            max_stock_level: max,
            status: "in_stock".to_string(),
            status_override: None,
            track_serial: false,
            track_batch: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn out_of_stock_beats_low_stock() {
        let breaches = evaluate_item(&item(dec!(0), dec!(10), None));
        assert_eq!(breaches.len(), 1);
        assert_eq!(breaches[0].alert_type, AlertType::OutOfStock);
    }

    #[test]
    fn low_stock_at_reorder_level() {
        let breaches = evaluate_item(&item(dec!(10), dec!(10), None));
        assert_eq!(breaches.len(), 1);
        assert_eq!(breaches[0].alert_type, AlertType::LowStock);
    }

    #[test]
    fn overstock_when_above_max() {
        let breaches = evaluate_item(&item(dec!(100), dec!(10), Some(dec!(50))));
        assert_eq!(breaches.len(), 1);
        assert_eq!(breaches[0].alert_type, AlertType::Overstock);
    }

    #[test]
    fn healthy_item_is_quiet() {
        let breaches = evaluate_item(&item(dec!(20), dec!(10), Some(dec!(50))));
        assert!(breaches.is_empty());
    }

    #[test]
    fn discontinued_item_is_quiet() {
        let mut it = item(dec!(0), dec!(10), None);
        it.status_override = Some("discontinued".to_string());
        assert!(evaluate_item(&it).is_empty());
    }
}
