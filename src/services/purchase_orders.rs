//! Purchase order workflow: ordering new stock from a supplier through an
//! approval/fulfillment state machine. Approval reserves expected supply on
//! the items' `quantity_on_order`; receipt converts it into on-hand stock
//! through `receipt` ledger rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::inventory_item::{self, derive_status, Entity as InventoryItem, ItemStatus},
    entities::inventory_transaction::TransactionType,
    entities::purchase_order::{self, Entity as PurchaseOrder, PurchaseOrderStatus},
    entities::purchase_order_item::{self, Entity as PurchaseOrderItem},
    entities::supplier::{self, Entity as Supplier},
    errors::ServiceError,
    events::{Event, EventSender},
    services::ledger::{AppendTransaction, LedgerService},
};

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateOrderLine {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreatePurchaseOrderRequest {
    pub supplier_id: Uuid,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub lines: Vec<CreateOrderLine>,
    pub tax_amount: Option<Decimal>,
    pub shipping_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Uuid,
}

/// One line's receipt delta within a `receive` call.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct LineReceipt {
    pub line_id: Uuid,
    pub quantity: Decimal,
}

/// Edit of a draft order. Replacing the lines recomputes the rollups.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDraftRequest {
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub tax_amount: Option<Decimal>,
    pub shipping_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub lines: Option<Vec<CreateOrderLine>>,
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderFilter {
    pub supplier_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DbPool>,
    ledger: Arc<LedgerService>,
    event_sender: EventSender,
}

impl PurchaseOrderService {
    pub fn new(db: Arc<DbPool>, ledger: Arc<LedgerService>, event_sender: EventSender) -> Self {
        Self {
            db,
            ledger,
            event_sender,
        }
    }

    /// Creates a draft order with its lines and computed monetary rollups.
    #[instrument(skip(self, request), fields(supplier_id = %request.supplier_id))]
    pub async fn create_order(
        &self,
        request: CreatePurchaseOrderRequest,
    ) -> Result<purchase_order::Model, ServiceError> {
        let tax_amount = request.tax_amount.unwrap_or(Decimal::ZERO);
        let shipping_cost = request.shipping_cost.unwrap_or(Decimal::ZERO);
        if tax_amount < Decimal::ZERO || shipping_cost < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "tax and shipping must not be negative".to_string(),
            ));
        }
        for line in &request.lines {
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "ordered quantity must be positive".to_string(),
                ));
            }
            if line.unit_cost < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "unit cost must not be negative".to_string(),
                ));
            }
        }

        let db = &*self.db;

        let supplier = Supplier::find_by_id(request.supplier_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Supplier {} not found", request.supplier_id))
            })?;
        if !supplier.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Supplier {} is deactivated",
                supplier.name
            )));
        }

        for line in &request.lines {
            let exists = InventoryItem::find_by_id(line.item_id)
                .one(db)
                .await
                .map_err(ServiceError::db_error)?;
            match exists {
                Some(item) if item.is_active => {}
                Some(item) => {
                    return Err(ServiceError::InvalidOperation(format!(
                        "Item {} is deleted",
                        item.item_code
                    )))
                }
                None => {
                    return Err(ServiceError::NotFound(format!(
                        "Item {} not found",
                        line.item_id
                    )))
                }
            }
        }

        let subtotal: Decimal = request
            .lines
            .iter()
            .map(|l| l.quantity * l.unit_cost)
            .sum();
        let total_amount = subtotal + tax_amount + shipping_cost;

        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let order = purchase_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(generate_order_number()),
            supplier_id: Set(request.supplier_id),
            status: Set(PurchaseOrderStatus::Draft.as_str().to_string()),
            order_date: Set(Utc::now()),
            expected_delivery_date: Set(request.expected_delivery_date),
            subtotal: Set(subtotal),
            tax_amount: Set(tax_amount),
            shipping_cost: Set(shipping_cost),
            total_amount: Set(total_amount),
            amount_paid: Set(Decimal::ZERO),
            approved_by: Set(None),
            approved_at: Set(None),
            notes: Set(request.notes),
            created_by: Set(request.created_by),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        for line in &request.lines {
            purchase_order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                purchase_order_id: Set(order.id),
                item_id: Set(line.item_id),
                quantity_ordered: Set(line.quantity),
                quantity_received: Set(Decimal::ZERO),
                unit_cost: Set(line.unit_cost),
                line_total: Set(line.quantity * line.unit_cost),
                created_at: Set(Utc::now()),
                updated_at: Set(None),
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(order = %order.order_number, lines = request.lines.len(), "Purchase order drafted");

        Ok(order)
    }

    /// Edits a draft in place. Anything past `draft` is frozen except for
    /// its own guarded transitions.
    #[instrument(skip(self, request))]
    pub async fn update_draft(
        &self,
        order_id: Uuid,
        request: UpdateDraftRequest,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let order = self.load_for_update(&txn, order_id).await?;
        let status = current_status(&order)?;
        if status != PurchaseOrderStatus::Draft {
            return Err(ServiceError::InvalidTransition(format!(
                "order {} is no longer a draft",
                order.order_number
            )));
        }

        let mut subtotal = order.subtotal;
        if let Some(lines) = &request.lines {
            for line in lines {
                if line.quantity <= Decimal::ZERO {
                    return Err(ServiceError::ValidationError(
                        "ordered quantity must be positive".to_string(),
                    ));
                }
                if line.unit_cost < Decimal::ZERO {
                    return Err(ServiceError::ValidationError(
                        "unit cost must not be negative".to_string(),
                    ));
                }
                let exists = InventoryItem::find_by_id(line.item_id)
                    .one(&txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                if exists.is_none() {
                    return Err(ServiceError::NotFound(format!(
                        "Item {} not found",
                        line.item_id
                    )));
                }
            }

            let old_lines = PurchaseOrderItem::find()
                .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
                .all(&txn)
                .await
                .map_err(ServiceError::db_error)?;
            for old in old_lines {
                old.delete(&txn).await.map_err(ServiceError::db_error)?;
            }

            for line in lines {
                purchase_order_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    purchase_order_id: Set(order_id),
                    item_id: Set(line.item_id),
                    quantity_ordered: Set(line.quantity),
                    quantity_received: Set(Decimal::ZERO),
                    unit_cost: Set(line.unit_cost),
                    line_total: Set(line.quantity * line.unit_cost),
                    created_at: Set(Utc::now()),
                    updated_at: Set(None),
                }
                .insert(&txn)
                .await
                .map_err(ServiceError::db_error)?;
            }

            subtotal = lines.iter().map(|l| l.quantity * l.unit_cost).sum();
        }

        let tax_amount = request.tax_amount.unwrap_or(order.tax_amount);
        let shipping_cost = request.shipping_cost.unwrap_or(order.shipping_cost);
        if tax_amount < Decimal::ZERO || shipping_cost < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "tax and shipping must not be negative".to_string(),
            ));
        }

        let mut active: purchase_order::ActiveModel = order.clone().into();
        if let Some(date) = request.expected_delivery_date {
            active.expected_delivery_date = Set(Some(date));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.subtotal = Set(subtotal);
        active.tax_amount = Set(tax_amount);
        active.shipping_cost = Set(shipping_cost);
        active.total_amount = Set(subtotal + tax_amount + shipping_cost);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        Ok(updated)
    }

    /// `draft -> pending_approval`.
    #[instrument(skip(self))]
    pub async fn submit(&self, order_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        let updated = self
            .step(order_id, PurchaseOrderStatus::Draft, PurchaseOrderStatus::PendingApproval)
            .await?;
        self.event_sender
            .send_or_log(Event::PurchaseOrderSubmitted(order_id))
            .await;
        Ok(updated)
    }

    /// `pending_approval -> approved`. Rejected without line items; on
    /// success every referenced item's expected supply grows by the ordered
    /// quantity.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        order_id: Uuid,
        approved_by: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let order = self.load_for_update(&txn, order_id).await?;
        let status = current_status(&order)?;
        if status != PurchaseOrderStatus::PendingApproval {
            return Err(ServiceError::InvalidTransition(format!(
                "order {} cannot be approved from {}",
                order.order_number,
                status.as_str()
            )));
        }

        let lines = PurchaseOrderItem::find()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        if lines.is_empty() {
            return Err(ServiceError::Forbidden(format!(
                "order {} has no line items",
                order.order_number
            )));
        }

        for line in &lines {
            self.adjust_on_order(&txn, line.item_id, line.quantity_ordered)
                .await?;
        }

        let now = Utc::now();
        let mut active: purchase_order::ActiveModel = order.clone().into();
        active.status = Set(PurchaseOrderStatus::Approved.as_str().to_string());
        active.approved_by = Set(Some(approved_by));
        active.approved_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::PurchaseOrderApproved(order_id))
            .await;
        info!(order = %updated.order_number, "Purchase order approved");

        Ok(updated)
    }

    /// `approved -> sent`.
    #[instrument(skip(self))]
    pub async fn send(&self, order_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        let updated = self
            .step(order_id, PurchaseOrderStatus::Approved, PurchaseOrderStatus::Sent)
            .await?;
        self.event_sender
            .send_or_log(Event::PurchaseOrderSent(order_id))
            .await;
        Ok(updated)
    }

    /// Receives deltas against order lines. Each call only adds the delta
    /// actually received in that call; the order status is then recomputed
    /// to `received` or `partially_received`.
    #[instrument(skip(self, receipts))]
    pub async fn receive(
        &self,
        order_id: Uuid,
        receipts: Vec<LineReceipt>,
        performed_by: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        if receipts.is_empty() {
            return Err(ServiceError::ValidationError(
                "at least one line receipt is required".to_string(),
            ));
        }

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let order = self.load_for_update(&txn, order_id).await?;
        let status = current_status(&order)?;
        if !matches!(
            status,
            PurchaseOrderStatus::Sent | PurchaseOrderStatus::PartiallyReceived
        ) {
            return Err(ServiceError::InvalidTransition(format!(
                "order {} cannot receive stock from {}",
                order.order_number,
                status.as_str()
            )));
        }

        for receipt in &receipts {
            if receipt.quantity < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "received quantity must not be negative".to_string(),
                ));
            }
            if receipt.quantity.is_zero() {
                continue;
            }

            let line = PurchaseOrderItem::find_by_id(receipt.line_id)
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(ServiceError::db_error)?
                .filter(|l| l.purchase_order_id == order_id)
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "Line {} not found on order {}",
                        receipt.line_id, order.order_number
                    ))
                })?;

            if line.quantity_received + receipt.quantity > line.quantity_ordered {
                return Err(ServiceError::ValidationError(format!(
                    "receipt of {} exceeds remaining {} on line {}",
                    receipt.quantity,
                    line.remaining(),
                    line.id
                )));
            }

            let mut append =
                AppendTransaction::new(line.item_id, TransactionType::Receipt, receipt.quantity);
            append.unit_cost = Some(line.unit_cost);
            append.purchase_order_id = Some(order_id);
            append.reason = Some("purchase order receipt".to_string());
            append.performed_by = performed_by;
            self.ledger.apply_on(&txn, append).await?;

            let mut active_line: purchase_order_item::ActiveModel = line.clone().into();
            active_line.quantity_received = Set(line.quantity_received + receipt.quantity);
            active_line.updated_at = Set(Some(Utc::now()));
            active_line
                .update(&txn)
                .await
                .map_err(ServiceError::db_error)?;
        }

        // Recompute order status over all lines.
        let lines = PurchaseOrderItem::find()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
            .all(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let fully_received = lines.iter().all(|l| l.is_fully_received());
        let any_received = lines.iter().any(|l| l.quantity_received > Decimal::ZERO);
        let new_status = if fully_received {
            PurchaseOrderStatus::Received
        } else if any_received {
            PurchaseOrderStatus::PartiallyReceived
        } else {
            status
        };

        let mut active: purchase_order::ActiveModel = order.clone().into();
        active.status = Set(new_status.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::PurchaseOrderReceived {
                order_id,
                fully_received,
            })
            .await;
        info!(
            order = %updated.order_number,
            status = %updated.status,
            "Purchase order receipt recorded"
        );

        Ok(updated)
    }

    /// Cancels a not-yet-received order. Expected supply registered at
    /// approval is released for the unreceived remainder.
    #[instrument(skip(self))]
    pub async fn cancel(&self, order_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let order = self.load_for_update(&txn, order_id).await?;
        let status = current_status(&order)?;
        if !status.is_cancellable() {
            return Err(ServiceError::InvalidTransition(format!(
                "order {} cannot be cancelled from {}",
                order.order_number,
                status.as_str()
            )));
        }

        if status.carries_on_order() {
            let lines = PurchaseOrderItem::find()
                .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
                .all(&txn)
                .await
                .map_err(ServiceError::db_error)?;
            for line in &lines {
                let remainder = line.remaining();
                if remainder > Decimal::ZERO {
                    self.adjust_on_order(&txn, line.item_id, -remainder).await?;
                }
            }
        }

        let mut active: purchase_order::ActiveModel = order.clone().into();
        active.status = Set(PurchaseOrderStatus::Cancelled.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::PurchaseOrderCancelled(order_id))
            .await;
        info!(order = %updated.order_number, "Purchase order cancelled");

        Ok(updated)
    }

    /// Administrative close; only fully received or cancelled orders close.
    #[instrument(skip(self))]
    pub async fn close(&self, order_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;
        let order = self.get_order(order_id).await?;
        let status = current_status(&order)?;
        if !matches!(
            status,
            PurchaseOrderStatus::Received | PurchaseOrderStatus::Cancelled
        ) {
            return Err(ServiceError::Conflict(format!(
                "order {} cannot be closed from {}",
                order.order_number,
                status.as_str()
            )));
        }

        let mut active: purchase_order::ActiveModel = order.clone().into();
        active.status = Set(PurchaseOrderStatus::Closed.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::PurchaseOrderClosed(order_id))
            .await;

        Ok(updated)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;
        PurchaseOrder::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", order_id)))
    }

    pub async fn get_order_lines(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<purchase_order_item::Model>, ServiceError> {
        let db = &*self.db;
        PurchaseOrderItem::find()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
            .order_by_asc(purchase_order_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: PurchaseOrderFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<purchase_order::Model>, u64), ServiceError> {
        if page == 0 {
            return Err(ServiceError::ValidationError(
                "Page number must be greater than 0".to_string(),
            ));
        }

        let db = &*self.db;
        let mut query = PurchaseOrder::find();

        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(purchase_order::Column::SupplierId.eq(supplier_id));
        }
        if let Some(status) = &filter.status {
            query = query.filter(purchase_order::Column::Status.eq(status.clone()));
        }

        query = query.order_by_desc(purchase_order::Column::OrderDate);

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((rows, total))
    }

    /// Simple guarded transition with no side effects on items.
    async fn step(
        &self,
        order_id: Uuid,
        from: PurchaseOrderStatus,
        to: PurchaseOrderStatus,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;
        let order = self.get_order(order_id).await?;
        let status = current_status(&order)?;
        if status != from {
            return Err(ServiceError::InvalidTransition(format!(
                "order {} cannot move to {} from {}",
                order.order_number,
                to.as_str(),
                status.as_str()
            )));
        }

        let mut active: purchase_order::ActiveModel = order.clone().into();
        active.status = Set(to.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Adds `delta` (possibly negative) to an item's expected supply under a
    /// row lock, maintaining the `on_order` status override.
    async fn adjust_on_order(
        &self,
        txn: &DatabaseTransaction,
        item_id: Uuid,
        delta: Decimal,
    ) -> Result<(), ServiceError> {
        let item = InventoryItem::find_by_id(item_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

        let new_on_order = (item.quantity_on_order + delta).max(Decimal::ZERO);

        let mut new_override = item.override_enum();
        if delta > Decimal::ZERO
            && item.quantity_on_hand.is_zero()
            && new_override.is_none()
        {
            new_override = Some(ItemStatus::OnOrder);
        }
        if new_override == Some(ItemStatus::OnOrder) && new_on_order.is_zero() {
            new_override = None;
        }
        let new_status = derive_status(item.quantity_on_hand, item.reorder_level, new_override);

        let mut active: inventory_item::ActiveModel = item.into();
        active.quantity_on_order = Set(new_on_order);
        active.status = Set(new_status.as_str().to_string());
        active.status_override = Set(new_override.map(|s| s.as_str().to_string()));
        active.updated_at = Set(Some(Utc::now()));
        active.update(txn).await.map_err(ServiceError::db_error)?;

        Ok(())
    }

    async fn load_for_update(
        &self,
        txn: &DatabaseTransaction,
        order_id: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        PurchaseOrder::find_by_id(order_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", order_id)))
    }
}

fn current_status(order: &purchase_order::Model) -> Result<PurchaseOrderStatus, ServiceError> {
    order.status_enum().ok_or_else(|| {
        ServiceError::InternalError(format!(
            "order {} has unknown status {}",
            order.id, order.status
        ))
    })
}

fn generate_order_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("PO-{}", &suffix[..12].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_numbers_are_unique_enough() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert_ne!(a, b);
        assert!(a.starts_with("PO-"));
        assert_eq!(a.len(), 15);
    }
}
