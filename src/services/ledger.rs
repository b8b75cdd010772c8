//! Transaction ledger: the single source of truth for every quantity change.
//!
//! Every mutation of an item's quantity projection funnels through
//! [`LedgerService::apply_on`], which inserts the immutable ledger row and
//! updates the cached projection in the same database transaction. No other
//! code path writes `quantity_on_hand`/`quantity_allocated`/
//! `quantity_available`/`quantity_on_order`.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::inventory_item::{self, derive_status, Entity as InventoryItem, ItemStatus},
    entities::inventory_transaction::{self, Entity as InventoryTransaction, TransactionType},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Request to append one ledger row. `quantity` is a magnitude for all types
/// except `adjustment`, which carries an explicit signed delta.
#[derive(Debug, Clone)]
pub struct AppendTransaction {
    pub item_id: Uuid,
    pub transaction_type: TransactionType,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub purchase_order_id: Option<Uuid>,
    pub allocation_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub bid_id: Option<Uuid>,
    pub count_id: Option<Uuid>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub performed_by: Uuid,
}

impl AppendTransaction {
    pub fn new(item_id: Uuid, transaction_type: TransactionType, quantity: Decimal) -> Self {
        Self {
            item_id,
            transaction_type,
            quantity,
            unit_cost: None,
            purchase_order_id: None,
            allocation_id: None,
            job_id: None,
            bid_id: None,
            count_id: None,
            reason: None,
            notes: None,
            performed_by: Uuid::nil(),
        }
    }
}

/// Transfer of stock between two locations, applied as one logical operation.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub item_id: Uuid,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub quantity: Decimal,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub performed_by: Uuid,
}

#[derive(Clone)]
pub struct LedgerService {
    db: Arc<DbPool>,
    event_sender: EventSender,
    allow_negative_correction: bool,
}

impl LedgerService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender, allow_negative_correction: bool) -> Self {
        Self {
            db,
            event_sender,
            allow_negative_correction,
        }
    }

    /// Appends one ledger row inside its own database transaction.
    #[instrument(skip(self, request), fields(item_id = %request.item_id))]
    pub async fn append(
        &self,
        request: AppendTransaction,
    ) -> Result<inventory_transaction::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let (recorded, _item) = self.apply_on(&txn, request).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::TransactionRecorded {
                transaction_id: recorded.id,
                item_id: recorded.item_id,
                transaction_type: recorded.transaction_type.clone(),
                quantity: recorded.quantity,
                balance_after: recorded.balance_after,
            })
            .await;

        Ok(recorded)
    }

    /// Core ledger application: inserts the immutable row and updates the
    /// item projection atomically on the caller's connection. The item row is
    /// read under an exclusive row lock so the availability check and the
    /// projection write are atomic relative to concurrent mutators.
    pub(crate) async fn apply_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        request: AppendTransaction,
    ) -> Result<(inventory_transaction::Model, inventory_item::Model), ServiceError> {
        if request.transaction_type == TransactionType::Transfer {
            return Err(ServiceError::InvalidOperation(
                "transfers must go through the transfer operation".to_string(),
            ));
        }
        if request.quantity.is_zero() {
            return Err(ServiceError::ValidationError(
                "transaction quantity must be non-zero".to_string(),
            ));
        }

        let item = InventoryItem::find_by_id(request.item_id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item {} not found", request.item_id))
            })?;

        if !item.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Item {} is deleted",
                item.item_code
            )));
        }

        let signed = request.transaction_type.signed(request.quantity);

        // Negative applications may never drive on-hand below zero. When
        // configured, adjustment/write-off clamp to a negative-to-zero
        // correction instead of failing.
        let mut effective = signed;
        if signed < Decimal::ZERO && item.quantity_on_hand + signed < Decimal::ZERO {
            let clampable = matches!(
                request.transaction_type,
                TransactionType::Adjustment | TransactionType::WriteOff
            );
            if self.allow_negative_correction && clampable {
                effective = -item.quantity_on_hand;
            } else {
                return Err(ServiceError::InsufficientStock(format!(
                    "{} of {} would drive on-hand below zero (on hand: {})",
                    request.transaction_type.as_str(),
                    request.quantity.abs(),
                    item.quantity_on_hand
                )));
            }
        }

        let new_on_hand = item.quantity_on_hand + effective;

        // An issue linked to an allocation consumes the reservation together
        // with the physical stock; every other movement leaves the reserved
        // quantity untouched.
        let consumes_reservation = request.transaction_type == TransactionType::Issue
            && request.allocation_id.is_some();
        let new_allocated = if consumes_reservation {
            item.quantity_allocated + effective
        } else {
            item.quantity_allocated
        };
        if new_allocated < Decimal::ZERO {
            return Err(ServiceError::InvalidOperation(format!(
                "issue of {} exceeds reserved quantity {}",
                effective.abs(),
                item.quantity_allocated
            )));
        }

        let new_available = new_on_hand - new_allocated;
        if new_available < Decimal::ZERO {
            return Err(ServiceError::InsufficientStock(format!(
                "{} of {} would drive available below zero (available: {})",
                request.transaction_type.as_str(),
                effective.abs(),
                item.quantity_available
            )));
        }

        // PO receipts consume expected supply.
        let new_on_order = if request.transaction_type == TransactionType::Receipt
            && request.purchase_order_id.is_some()
        {
            (item.quantity_on_order - effective).max(Decimal::ZERO)
        } else {
            item.quantity_on_order
        };

        // Weighted average cost, updated on inbound stock with a known cost.
        let inbound = matches!(
            request.transaction_type,
            TransactionType::Receipt | TransactionType::InitialStock
        );
        let new_average_cost = match (inbound, request.unit_cost) {
            (true, Some(cost)) if new_on_hand > Decimal::ZERO => {
                (item.quantity_on_hand * item.average_cost + effective * cost) / new_on_hand
            }
            _ => item.average_cost,
        };

        let recorded = inventory_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(item.id),
            transaction_type: Set(request.transaction_type.as_str().to_string()),
            quantity: Set(effective),
            unit_cost: Set(request.unit_cost),
            balance_after: Set(new_on_hand),
            purchase_order_id: Set(request.purchase_order_id),
            allocation_id: Set(request.allocation_id),
            job_id: Set(request.job_id),
            bid_id: Set(request.bid_id),
            count_id: Set(request.count_id),
            from_location_id: Set(None),
            to_location_id: Set(None),
            transfer_group_id: Set(None),
            reason: Set(request.reason),
            notes: Set(request.notes),
            performed_by: Set(request.performed_by),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await
        .map_err(ServiceError::db_error)?;

        // The on_order override clears itself once expected supply lands.
        let mut new_override = item.override_enum();
        if new_override == Some(ItemStatus::OnOrder) && new_on_order.is_zero() {
            new_override = None;
        }
        let new_status = derive_status(new_on_hand, item.reorder_level, new_override);

        let mut active_item: inventory_item::ActiveModel = item.clone().into();
        active_item.quantity_on_hand = Set(new_on_hand);
        active_item.quantity_allocated = Set(new_allocated);
        active_item.quantity_available = Set(new_available);
        active_item.quantity_on_order = Set(new_on_order);
        active_item.average_cost = Set(new_average_cost);
        active_item.status = Set(new_status.as_str().to_string());
        active_item.status_override = Set(new_override.map(|s| s.as_str().to_string()));
        active_item.updated_at = Set(Some(Utc::now()));

        let updated_item = active_item
            .update(conn)
            .await
            .map_err(ServiceError::db_error)?;

        info!(
            item = %updated_item.item_code,
            transaction_type = %recorded.transaction_type,
            quantity = %recorded.quantity,
            balance_after = %recorded.balance_after,
            "Ledger entry applied"
        );

        Ok((recorded, updated_item))
    }

    /// Moves stock between two locations as a single logical event: two
    /// linked rows, negative at the source and positive at the destination,
    /// committed together so stock never appears to vanish in between.
    #[instrument(skip(self, request), fields(item_id = %request.item_id))]
    pub async fn transfer(
        &self,
        request: TransferRequest,
    ) -> Result<Vec<inventory_transaction::Model>, ServiceError> {
        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "transfer quantity must be positive".to_string(),
            ));
        }
        if request.from_location_id == request.to_location_id {
            return Err(ServiceError::ValidationError(
                "transfer source and destination must differ".to_string(),
            ));
        }

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let item = InventoryItem::find_by_id(request.item_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item {} not found", request.item_id))
            })?;

        if !item.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Item {} is deleted",
                item.item_code
            )));
        }
        if request.quantity > item.quantity_on_hand {
            return Err(ServiceError::InsufficientStock(format!(
                "transfer of {} exceeds on-hand quantity {}",
                request.quantity, item.quantity_on_hand
            )));
        }

        let group_id = Uuid::new_v4();
        let now = Utc::now();

        let outbound = inventory_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(item.id),
            transaction_type: Set(TransactionType::Transfer.as_str().to_string()),
            quantity: Set(-request.quantity),
            unit_cost: Set(None),
            balance_after: Set(item.quantity_on_hand - request.quantity),
            purchase_order_id: Set(None),
            allocation_id: Set(None),
            job_id: Set(None),
            bid_id: Set(None),
            count_id: Set(None),
            from_location_id: Set(Some(request.from_location_id)),
            to_location_id: Set(Some(request.to_location_id)),
            transfer_group_id: Set(Some(group_id)),
            reason: Set(request.reason.clone()),
            notes: Set(request.notes.clone()),
            performed_by: Set(request.performed_by),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        let inbound = inventory_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(item.id),
            transaction_type: Set(TransactionType::Transfer.as_str().to_string()),
            quantity: Set(request.quantity),
            unit_cost: Set(None),
            balance_after: Set(item.quantity_on_hand),
            purchase_order_id: Set(None),
            allocation_id: Set(None),
            job_id: Set(None),
            bid_id: Set(None),
            count_id: Set(None),
            from_location_id: Set(Some(request.from_location_id)),
            to_location_id: Set(Some(request.to_location_id)),
            transfer_group_id: Set(Some(group_id)),
            reason: Set(request.reason.clone()),
            notes: Set(request.notes.clone()),
            performed_by: Set(request.performed_by),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        // Net projection change is zero; only the audit trail grows.
        let mut active_item: inventory_item::ActiveModel = item.clone().into();
        active_item.updated_at = Set(Some(now));
        active_item
            .update(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::StockTransferred {
                transfer_group_id: group_id,
                item_id: item.id,
                from_location_id: request.from_location_id,
                to_location_id: request.to_location_id,
                quantity: request.quantity,
            })
            .await;

        info!(
            item = %item.item_code,
            quantity = %request.quantity,
            "Stock transferred between locations"
        );

        Ok(vec![outbound, inbound])
    }

    /// Creation-ordered ledger history for an item, paginated.
    #[instrument(skip(self))]
    pub async fn list_for_item(
        &self,
        item_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_transaction::Model>, u64), ServiceError> {
        if page == 0 {
            return Err(ServiceError::ValidationError(
                "Page number must be greater than 0".to_string(),
            ));
        }
        let db = &*self.db;

        let paginator = InventoryTransaction::find()
            .filter(inventory_transaction::Column::ItemId.eq(item_id))
            .order_by_asc(inventory_transaction::Column::CreatedAt)
            .paginate(db, limit);

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((rows, total))
    }

    /// Replays an item's ledger from zero. The sum of signed quantities must
    /// equal the cached `quantity_on_hand`; transfer pairs net to zero.
    pub async fn replay_balance(&self, item_id: Uuid) -> Result<(Decimal, u64), ServiceError> {
        let db = &*self.db;

        let rows = InventoryTransaction::find()
            .filter(inventory_transaction::Column::ItemId.eq(item_id))
            .order_by_asc(inventory_transaction::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let count = rows.len() as u64;
        let balance = rows.iter().map(|r| r.quantity).sum();

        Ok((balance, count))
    }
}
