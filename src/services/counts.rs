//! Physical count reconciliation: snapshot system quantities, record counted
//! values, and converge the ledger onto physical reality through adjustment
//! rows on completion.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::inventory_count::{self, CountStatus, CountType, Entity as InventoryCount},
    entities::inventory_count_item::{self, Entity as InventoryCountItem},
    entities::inventory_item::{self, Entity as InventoryItem},
    entities::inventory_transaction::TransactionType,
    errors::ServiceError,
    events::{Event, EventSender},
    services::ledger::{AppendTransaction, LedgerService},
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCountRequest {
    pub count_type: String,
    pub location_id: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Uuid,
}

#[derive(Clone)]
pub struct CountService {
    db: Arc<DbPool>,
    ledger: Arc<LedgerService>,
    event_sender: EventSender,
    batch_size: u64,
}

impl CountService {
    pub fn new(
        db: Arc<DbPool>,
        ledger: Arc<LedgerService>,
        event_sender: EventSender,
        batch_size: u64,
    ) -> Self {
        Self {
            db,
            ledger,
            event_sender,
            batch_size: batch_size.max(1),
        }
    }

    /// Creates a planned count session. No quantities are snapshotted until
    /// counting actually starts.
    #[instrument(skip(self, request))]
    pub async fn create_count(
        &self,
        request: CreateCountRequest,
    ) -> Result<inventory_count::Model, ServiceError> {
        let count_type = CountType::from_str(&request.count_type).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "{} is not a valid count type",
                request.count_type
            ))
        })?;

        let db = &*self.db;
        let count = inventory_count::ActiveModel {
            id: Set(Uuid::new_v4()),
            count_number: Set(generate_count_number()),
            count_type: Set(count_type.as_str().to_string()),
            status: Set(CountStatus::Planned.as_str().to_string()),
            location_id: Set(request.location_id),
            scheduled_date: Set(request.scheduled_date),
            started_at: Set(None),
            completed_at: Set(None),
            created_by: Set(request.created_by),
            notes: Set(request.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(count = %count.count_number, "Count session planned");

        Ok(count)
    }

    /// Snapshots `system_quantity` for every active item into count lines at
    /// the moment counting starts; `planned -> in_progress`. The snapshot is
    /// paged so a full count never holds one unbounded transaction.
    #[instrument(skip(self))]
    pub async fn start_count(&self, count_id: Uuid) -> Result<inventory_count::Model, ServiceError> {
        let db = &*self.db;
        let count = self.get_count(count_id).await?;
        let status = current_status(&count)?;
        if status != CountStatus::Planned {
            return Err(ServiceError::InvalidTransition(format!(
                "count {} cannot start from {}",
                count.count_number,
                status.as_str()
            )));
        }

        let paginator = InventoryItem::find()
            .filter(inventory_item::Column::IsActive.eq(true))
            .order_by_asc(inventory_item::Column::ItemCode)
            .paginate(db, self.batch_size);
        let pages = paginator.num_pages().await.map_err(ServiceError::db_error)?;

        let mut snapshotted = 0u64;
        for page in 0..pages {
            let items = paginator
                .fetch_page(page)
                .await
                .map_err(ServiceError::db_error)?;
            for item in items {
                inventory_count_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    count_id: Set(count_id),
                    item_id: Set(item.id),
                    system_quantity: Set(item.quantity_on_hand),
                    counted_quantity: Set(None),
                    variance: Set(None),
                    variance_cost: Set(None),
                    counted_by: Set(None),
                    counted_at: Set(None),
                }
                .insert(db)
                .await
                .map_err(ServiceError::db_error)?;
                snapshotted += 1;
            }
        }

        let now = Utc::now();
        let mut active: inventory_count::ActiveModel = count.clone().into();
        active.status = Set(CountStatus::InProgress.as_str().to_string());
        active.started_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::CountStarted(count_id))
            .await;
        info!(count = %updated.count_number, items = snapshotted, "Count started");

        Ok(updated)
    }

    /// Stores a counted value and computes `variance`/`variance_cost`.
    #[instrument(skip(self))]
    pub async fn record_count(
        &self,
        count_id: Uuid,
        item_id: Uuid,
        counted_quantity: Decimal,
        counted_by: Uuid,
    ) -> Result<inventory_count_item::Model, ServiceError> {
        if counted_quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "counted quantity must not be negative".to_string(),
            ));
        }

        let db = &*self.db;
        let count = self.get_count(count_id).await?;
        let status = current_status(&count)?;
        if status != CountStatus::InProgress {
            return Err(ServiceError::InvalidTransition(format!(
                "count {} is not in progress",
                count.count_number
            )));
        }

        let line = InventoryCountItem::find()
            .filter(inventory_count_item::Column::CountId.eq(count_id))
            .filter(inventory_count_item::Column::ItemId.eq(item_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Item {} is not part of count {}",
                    item_id, count.count_number
                ))
            })?;

        let item = InventoryItem::find_by_id(item_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

        let variance = counted_quantity - line.system_quantity;
        let variance_cost = variance * item.unit_cost;

        let mut active: inventory_count_item::ActiveModel = line.into();
        active.counted_quantity = Set(Some(counted_quantity));
        active.variance = Set(Some(variance));
        active.variance_cost = Set(Some(variance_cost));
        active.counted_by = Set(Some(counted_by));
        active.counted_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Appends an adjustment ledger row for every counted line with a
    /// non-zero variance, then marks the session completed. Each adjustment
    /// is one atomic per-item ledger application; a failure surfaces and
    /// leaves the session in progress.
    #[instrument(skip(self))]
    pub async fn complete_count(
        &self,
        count_id: Uuid,
        performed_by: Uuid,
    ) -> Result<inventory_count::Model, ServiceError> {
        let db = &*self.db;
        let count = self.get_count(count_id).await?;
        let status = current_status(&count)?;
        if status != CountStatus::InProgress {
            return Err(ServiceError::InvalidTransition(format!(
                "count {} cannot complete from {}",
                count.count_number,
                status.as_str()
            )));
        }

        let lines = InventoryCountItem::find()
            .filter(inventory_count_item::Column::CountId.eq(count_id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut adjustments = 0u64;
        for line in &lines {
            let variance = match line.variance {
                Some(v) if !v.is_zero() => v,
                _ => continue,
            };

            let mut append =
                AppendTransaction::new(line.item_id, TransactionType::Adjustment, variance);
            append.count_id = Some(count_id);
            append.reason = Some("physical count variance".to_string());
            append.performed_by = performed_by;
            self.ledger.append(append).await?;
            adjustments += 1;
        }

        let now = Utc::now();
        let mut active: inventory_count::ActiveModel = count.clone().into();
        active.status = Set(CountStatus::Completed.as_str().to_string());
        active.completed_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::CountCompleted {
                count_id,
                adjustments,
            })
            .await;
        info!(count = %updated.count_number, adjustments, "Count completed");

        Ok(updated)
    }

    /// A cancelled count commits no adjustments.
    #[instrument(skip(self))]
    pub async fn cancel_count(&self, count_id: Uuid) -> Result<inventory_count::Model, ServiceError> {
        let db = &*self.db;
        let count = self.get_count(count_id).await?;
        let status = current_status(&count)?;
        if status.is_terminal() {
            return Err(ServiceError::InvalidTransition(format!(
                "count {} cannot be cancelled from {}",
                count.count_number,
                status.as_str()
            )));
        }

        let mut active: inventory_count::ActiveModel = count.clone().into();
        active.status = Set(CountStatus::Cancelled.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::CountCancelled(count_id))
            .await;

        Ok(updated)
    }

    pub async fn get_count(&self, count_id: Uuid) -> Result<inventory_count::Model, ServiceError> {
        let db = &*self.db;
        InventoryCount::find_by_id(count_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Count {} not found", count_id)))
    }

    pub async fn list_count_items(
        &self,
        count_id: Uuid,
    ) -> Result<Vec<inventory_count_item::Model>, ServiceError> {
        let db = &*self.db;
        // Ensure the session exists so a bad id maps to NotFound, not [].
        self.get_count(count_id).await?;

        InventoryCountItem::find()
            .filter(inventory_count_item::Column::CountId.eq(count_id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn list_counts(
        &self,
        status: Option<String>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_count::Model>, u64), ServiceError> {
        if page == 0 {
            return Err(ServiceError::ValidationError(
                "Page number must be greater than 0".to_string(),
            ));
        }

        let db = &*self.db;
        let mut query = InventoryCount::find();
        if let Some(status) = &status {
            query = query.filter(inventory_count::Column::Status.eq(status.clone()));
        }
        query = query.order_by_desc(inventory_count::Column::CreatedAt);

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((rows, total))
    }
}

fn current_status(count: &inventory_count::Model) -> Result<CountStatus, ServiceError> {
    count.status_enum().ok_or_else(|| {
        ServiceError::InternalError(format!(
            "count {} has unknown status {}",
            count.id, count.status
        ))
    })
}

fn generate_count_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("CNT-{}", &suffix[..12].to_uppercase())
}
