//! Item registry: identity, costing, reorder policy, and the cached quantity
//! projection. Quantity fields are never written here; they change only
//! through ledger application.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::inventory_allocation::{self, AllocationStatus, Entity as InventoryAllocation},
    entities::inventory_item::{self, derive_status, Entity as InventoryItem, ItemStatus},
    entities::inventory_transaction::TransactionType,
    entities::purchase_order::{self, Entity as PurchaseOrder, PurchaseOrderStatus},
    entities::purchase_order_item::{self, Entity as PurchaseOrderItem},
    errors::ServiceError,
    events::{Event, EventSender},
    services::ledger::{AppendTransaction, LedgerService},
};

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateItemRequest {
    pub organization_id: Uuid,
    pub item_code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit_of_measure_id: Option<Uuid>,
    pub unit_cost: Decimal,
    pub selling_price: Option<Decimal>,
    pub reorder_level: Decimal,
    pub reorder_quantity: Decimal,
    pub max_stock_level: Option<Decimal>,
    pub track_serial: bool,
    pub track_batch: bool,
    /// Opening balance; recorded as an `initial_stock` ledger row.
    pub initial_quantity: Option<Decimal>,
    pub performed_by: Uuid,
}

/// Administrative edit of non-quantity fields. The quantity fields are
/// present so a direct write attempt can be rejected explicitly instead of
/// being silently ignored.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit_of_measure_id: Option<Uuid>,
    pub unit_cost: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub reorder_level: Option<Decimal>,
    pub reorder_quantity: Option<Decimal>,
    pub max_stock_level: Option<Decimal>,
    pub track_serial: Option<bool>,
    pub track_batch: Option<bool>,
    /// `"on_order"`, `"discontinued"`, or `"none"` to clear the override.
    pub status_override: Option<String>,
    pub quantity_on_hand: Option<Decimal>,
    pub quantity_allocated: Option<Decimal>,
    pub quantity_available: Option<Decimal>,
    pub quantity_on_order: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub organization_id: Option<Uuid>,
    pub status: Option<String>,
    pub active_only: bool,
    pub low_stock_only: bool,
}

/// Result of replaying an item's ledger against its cached projection.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub item_id: Uuid,
    pub projected_on_hand: Decimal,
    pub ledger_balance: Decimal,
    pub transaction_count: u64,
    pub matches: bool,
    pub checked_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ItemService {
    db: Arc<DbPool>,
    ledger: Arc<LedgerService>,
    event_sender: EventSender,
}

impl ItemService {
    pub fn new(db: Arc<DbPool>, ledger: Arc<LedgerService>, event_sender: EventSender) -> Self {
        Self {
            db,
            ledger,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(item_code = %request.item_code))]
    pub async fn create_item(
        &self,
        request: CreateItemRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        if request.item_code.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "item_code must not be empty".to_string(),
            ));
        }
        if request.unit_cost < Decimal::ZERO
            || request.reorder_level < Decimal::ZERO
            || request.reorder_quantity < Decimal::ZERO
        {
            return Err(ServiceError::ValidationError(
                "costs and reorder policy must not be negative".to_string(),
            ));
        }
        if let Some(initial) = request.initial_quantity {
            if initial < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "initial quantity must not be negative".to_string(),
                ));
            }
        }

        let db = &*self.db;

        let existing = InventoryItem::find()
            .filter(inventory_item::Column::OrganizationId.eq(request.organization_id))
            .filter(inventory_item::Column::ItemCode.eq(request.item_code.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Item code {} already exists in this organization",
                request.item_code
            )));
        }

        let status = derive_status(Decimal::ZERO, request.reorder_level, None);

        let item = inventory_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(request.organization_id),
            item_code: Set(request.item_code.clone()),
            name: Set(request.name),
            description: Set(request.description),
            category_id: Set(request.category_id),
            unit_of_measure_id: Set(request.unit_of_measure_id),
            unit_cost: Set(request.unit_cost),
            average_cost: Set(request.unit_cost),
            selling_price: Set(request.selling_price),
            quantity_on_hand: Set(Decimal::ZERO),
            quantity_allocated: Set(Decimal::ZERO),
            quantity_available: Set(Decimal::ZERO),
            quantity_on_order: Set(Decimal::ZERO),
            reorder_level: Set(request.reorder_level),
            reorder_quantity: Set(request.reorder_quantity),
            max_stock_level: Set(request.max_stock_level),
            status: Set(status.as_str().to_string()),
            status_override: Set(None),
            track_serial: Set(request.track_serial),
            track_batch: Set(request.track_batch),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        // Opening balance goes through the ledger like any other movement.
        let item = match request.initial_quantity {
            Some(initial) if initial > Decimal::ZERO => {
                let mut append =
                    AppendTransaction::new(item.id, TransactionType::InitialStock, initial);
                append.unit_cost = Some(request.unit_cost);
                append.reason = Some("opening balance".to_string());
                append.performed_by = request.performed_by;
                self.ledger.append(append).await?;

                InventoryItem::find_by_id(item.id)
                    .one(db)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::InternalError("item vanished after creation".to_string())
                    })?
            }
            _ => item,
        };

        self.event_sender.send_or_log(Event::ItemCreated(item.id)).await;
        info!(item = %item.item_code, "Inventory item created");

        Ok(item)
    }

    /// Updates non-quantity fields. A request carrying any quantity field is
    /// rejected: the projection is owned by the ledger.
    #[instrument(skip(self, request))]
    pub async fn update_item(
        &self,
        item_id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        if request.quantity_on_hand.is_some()
            || request.quantity_allocated.is_some()
            || request.quantity_available.is_some()
            || request.quantity_on_order.is_some()
        {
            return Err(ServiceError::InvalidOperation(
                "quantity fields are mutated only through the transaction ledger".to_string(),
            ));
        }

        let db = &*self.db;
        let item = self.get_item(item_id).await?;

        let mut new_override = item.override_enum();
        if let Some(override_value) = &request.status_override {
            new_override = match override_value.as_str() {
                "none" => None,
                other => match ItemStatus::from_str(other) {
                    Some(status) if status.is_override() => Some(status),
                    _ => {
                        return Err(ServiceError::ValidationError(format!(
                            "{} is not a valid status override",
                            other
                        )))
                    }
                },
            };
        }

        let new_reorder_level = request.reorder_level.unwrap_or(item.reorder_level);
        if new_reorder_level < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "reorder_level must not be negative".to_string(),
            ));
        }

        let new_status = derive_status(item.quantity_on_hand, new_reorder_level, new_override);

        let mut active: inventory_item::ActiveModel = item.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(category_id) = request.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(uom_id) = request.unit_of_measure_id {
            active.unit_of_measure_id = Set(Some(uom_id));
        }
        if let Some(unit_cost) = request.unit_cost {
            if unit_cost < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "unit_cost must not be negative".to_string(),
                ));
            }
            active.unit_cost = Set(unit_cost);
        }
        if let Some(selling_price) = request.selling_price {
            active.selling_price = Set(Some(selling_price));
        }
        active.reorder_level = Set(new_reorder_level);
        if let Some(reorder_quantity) = request.reorder_quantity {
            active.reorder_quantity = Set(reorder_quantity);
        }
        if let Some(max_stock_level) = request.max_stock_level {
            active.max_stock_level = Set(Some(max_stock_level));
        }
        if let Some(track_serial) = request.track_serial {
            active.track_serial = Set(track_serial);
        }
        if let Some(track_batch) = request.track_batch {
            active.track_batch = Set(track_batch);
        }
        active.status = Set(new_status.as_str().to_string());
        active.status_override = Set(new_override.map(|s| s.as_str().to_string()));
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::ItemUpdated(updated.id))
            .await;

        Ok(updated)
    }

    /// Soft delete. Blocked while open allocations or undelivered purchase
    /// order lines still reference the item.
    #[instrument(skip(self))]
    pub async fn soft_delete_item(&self, item_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let item = self.get_item(item_id).await?;

        let open_allocations = InventoryAllocation::find()
            .filter(inventory_allocation::Column::ItemId.eq(item_id))
            .filter(inventory_allocation::Column::Status.is_in([
                AllocationStatus::Allocated.as_str(),
                AllocationStatus::Issued.as_str(),
                AllocationStatus::PartiallyUsed.as_str(),
            ]))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if open_allocations > 0 {
            return Err(ServiceError::Conflict(format!(
                "Item {} has {} open allocation(s)",
                item.item_code, open_allocations
            )));
        }

        let undelivered_lines = PurchaseOrderItem::find()
            .filter(purchase_order_item::Column::ItemId.eq(item_id))
            .filter(
                sea_orm::sea_query::Expr::col(purchase_order_item::Column::QuantityReceived).lt(
                    sea_orm::sea_query::Expr::col(purchase_order_item::Column::QuantityOrdered),
                ),
            )
            .inner_join(PurchaseOrder)
            .filter(purchase_order::Column::Status.is_in([
                PurchaseOrderStatus::Draft.as_str(),
                PurchaseOrderStatus::PendingApproval.as_str(),
                PurchaseOrderStatus::Approved.as_str(),
                PurchaseOrderStatus::Sent.as_str(),
                PurchaseOrderStatus::PartiallyReceived.as_str(),
            ]))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if undelivered_lines > 0 {
            return Err(ServiceError::Conflict(format!(
                "Item {} has {} undelivered purchase order line(s)",
                item.item_code, undelivered_lines
            )));
        }

        let mut active: inventory_item::ActiveModel = item.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::ItemDeactivated(updated.id))
            .await;
        info!(item = %updated.item_code, "Inventory item deactivated");

        Ok(())
    }

    pub async fn get_item(&self, item_id: Uuid) -> Result<inventory_item::Model, ServiceError> {
        let db = &*self.db;
        InventoryItem::find_by_id(item_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        filter: ItemFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_item::Model>, u64), ServiceError> {
        if page == 0 {
            return Err(ServiceError::ValidationError(
                "Page number must be greater than 0".to_string(),
            ));
        }
        if limit == 0 || limit > 1000 {
            return Err(ServiceError::ValidationError(
                "Limit must be between 1 and 1000".to_string(),
            ));
        }

        let db = &*self.db;
        let mut query = InventoryItem::find();

        if let Some(org_id) = filter.organization_id {
            query = query.filter(inventory_item::Column::OrganizationId.eq(org_id));
        }
        if let Some(status) = &filter.status {
            query = query.filter(inventory_item::Column::Status.eq(status.clone()));
        }
        if filter.active_only {
            query = query.filter(inventory_item::Column::IsActive.eq(true));
        }
        if filter.low_stock_only {
            query = query.filter(inventory_item::Column::Status.is_in([
                ItemStatus::LowStock.as_str(),
                ItemStatus::OutOfStock.as_str(),
            ]));
        }

        query = query.order_by_asc(inventory_item::Column::ItemCode);

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((items, total))
    }

    /// Standing invariant check: replays the ledger and compares it to the
    /// cached projection.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, item_id: Uuid) -> Result<ReconcileReport, ServiceError> {
        let item = self.get_item(item_id).await?;
        let (ledger_balance, transaction_count) = self.ledger.replay_balance(item_id).await?;

        let matches = ledger_balance == item.quantity_on_hand;
        if !matches {
            tracing::warn!(
                item = %item.item_code,
                projected = %item.quantity_on_hand,
                replayed = %ledger_balance,
                "Ledger replay does not match cached projection"
            );
        }

        Ok(ReconcileReport {
            item_id,
            projected_on_hand: item.quantity_on_hand,
            ledger_balance,
            transaction_count,
            matches,
            checked_at: Utc::now(),
        })
    }
}
