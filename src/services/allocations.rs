//! Allocation engine: reserves item quantity against a job or bid before
//! consumption. Reservations are not stock movements; only issue and return
//! touch the ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::inventory_allocation::{self, AllocationStatus, Entity as InventoryAllocation},
    entities::inventory_item::{self, Entity as InventoryItem},
    entities::inventory_transaction::TransactionType,
    errors::ServiceError,
    events::{Event, EventSender},
    services::ledger::{AppendTransaction, LedgerService},
};

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateAllocationRequest {
    pub item_id: Uuid,
    pub job_id: Option<Uuid>,
    pub bid_id: Option<Uuid>,
    pub quantity: Decimal,
    pub expected_use_date: Option<DateTime<Utc>>,
    pub allocated_by: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AllocationFilter {
    pub item_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub bid_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct AllocationService {
    db: Arc<DbPool>,
    ledger: Arc<LedgerService>,
    event_sender: EventSender,
}

impl AllocationService {
    pub fn new(db: Arc<DbPool>, ledger: Arc<LedgerService>, event_sender: EventSender) -> Self {
        Self {
            db,
            ledger,
            event_sender,
        }
    }

    /// Reserves quantity for a job or bid. Moves available into allocated;
    /// emits no ledger row because nothing physically moved.
    #[instrument(skip(self, request), fields(item_id = %request.item_id))]
    pub async fn create_allocation(
        &self,
        request: CreateAllocationRequest,
    ) -> Result<inventory_allocation::Model, ServiceError> {
        match (request.job_id, request.bid_id) {
            (Some(_), None) | (None, Some(_)) => {}
            _ => {
                return Err(ServiceError::ValidationError(
                    "exactly one of job_id or bid_id must be set".to_string(),
                ))
            }
        }
        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "allocation quantity must be positive".to_string(),
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
        if request.quantity > item.quantity_available {
            return Err(ServiceError::InsufficientStock(format!(
                "requested {} but only {} available for {}",
                request.quantity, item.quantity_available, item.item_code
            )));
        }

        let mut active_item: inventory_item::ActiveModel = item.clone().into();
        active_item.quantity_allocated = Set(item.quantity_allocated + request.quantity);
        active_item.quantity_available = Set(item.quantity_available - request.quantity);
        active_item.updated_at = Set(Some(Utc::now()));
        active_item
            .update(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let allocation = inventory_allocation::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(request.item_id),
            job_id: Set(request.job_id),
            bid_id: Set(request.bid_id),
            quantity_allocated: Set(request.quantity),
            quantity_used: Set(Decimal::ZERO),
            quantity_returned: Set(Decimal::ZERO),
            status: Set(AllocationStatus::Allocated.as_str().to_string()),
            allocation_date: Set(Utc::now()),
            expected_use_date: Set(request.expected_use_date),
            actual_use_date: Set(None),
            allocated_by: Set(request.allocated_by),
            notes: Set(request.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::AllocationCreated {
                allocation_id: allocation.id,
                item_id: allocation.item_id,
                quantity: allocation.quantity_allocated,
            })
            .await;

        info!(
            allocation_id = %allocation.id,
            item = %item.item_code,
            quantity = %allocation.quantity_allocated,
            "Inventory allocated"
        );

        Ok(allocation)
    }

    /// Issues a reservation: consumes the reserved quantity and the physical
    /// stock together through an `issue` ledger row.
    #[instrument(skip(self))]
    pub async fn issue_allocation(
        &self,
        allocation_id: Uuid,
        performed_by: Uuid,
    ) -> Result<inventory_allocation::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let allocation = self.load_for_update(&txn, allocation_id).await?;
        let status = current_status(&allocation)?;
        if status != AllocationStatus::Allocated {
            return Err(ServiceError::InvalidTransition(format!(
                "allocation {} cannot be issued from {}",
                allocation_id,
                status.as_str()
            )));
        }

        let mut append = AppendTransaction::new(
            allocation.item_id,
            TransactionType::Issue,
            allocation.quantity_allocated,
        );
        append.allocation_id = Some(allocation.id);
        append.job_id = allocation.job_id;
        append.bid_id = allocation.bid_id;
        append.reason = Some("allocation issue".to_string());
        append.performed_by = performed_by;
        self.ledger.apply_on(&txn, append).await?;

        let now = Utc::now();
        let mut active: inventory_allocation::ActiveModel = allocation.clone().into();
        active.quantity_used = Set(allocation.quantity_allocated);
        active.status = Set(AllocationStatus::Issued.as_str().to_string());
        active.actual_use_date = Set(Some(now));
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::AllocationIssued {
                allocation_id: updated.id,
                item_id: updated.item_id,
                quantity: updated.quantity_used,
            })
            .await;

        info!(allocation_id = %updated.id, "Allocation issued");

        Ok(updated)
    }

    /// Returns previously issued stock. A zero-quantity return is the
    /// explicit "everything was consumed" signal and finalizes the
    /// allocation as fully used.
    #[instrument(skip(self))]
    pub async fn return_allocation(
        &self,
        allocation_id: Uuid,
        quantity_returned: Decimal,
        performed_by: Uuid,
    ) -> Result<inventory_allocation::Model, ServiceError> {
        if quantity_returned < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "returned quantity must not be negative".to_string(),
            ));
        }

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let allocation = self.load_for_update(&txn, allocation_id).await?;
        let status = current_status(&allocation)?;
        if !matches!(
            status,
            AllocationStatus::Issued | AllocationStatus::PartiallyUsed
        ) {
            return Err(ServiceError::InvalidTransition(format!(
                "allocation {} cannot accept returns from {}",
                allocation_id,
                status.as_str()
            )));
        }
        if quantity_returned > allocation.used_remaining() {
            return Err(ServiceError::ValidationError(format!(
                "return of {} exceeds outstanding used quantity {}",
                quantity_returned,
                allocation.used_remaining()
            )));
        }

        if quantity_returned > Decimal::ZERO {
            let mut append = AppendTransaction::new(
                allocation.item_id,
                TransactionType::Return,
                quantity_returned,
            );
            append.allocation_id = Some(allocation.id);
            append.job_id = allocation.job_id;
            append.bid_id = allocation.bid_id;
            append.reason = Some("allocation return".to_string());
            append.performed_by = performed_by;
            self.ledger.apply_on(&txn, append).await?;
        }

        let new_returned = allocation.quantity_returned + quantity_returned;
        let new_status = if new_returned == allocation.quantity_used {
            AllocationStatus::Returned
        } else if new_returned > Decimal::ZERO {
            AllocationStatus::PartiallyUsed
        } else {
            AllocationStatus::FullyUsed
        };

        let mut active: inventory_allocation::ActiveModel = allocation.clone().into();
        active.quantity_returned = Set(new_returned);
        active.status = Set(new_status.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::AllocationReturned {
                allocation_id: updated.id,
                item_id: updated.item_id,
                quantity: quantity_returned,
            })
            .await;

        Ok(updated)
    }

    /// Releases a never-issued reservation. No ledger row: nothing ever
    /// physically moved.
    #[instrument(skip(self))]
    pub async fn cancel_allocation(
        &self,
        allocation_id: Uuid,
    ) -> Result<inventory_allocation::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let allocation = self.load_for_update(&txn, allocation_id).await?;
        let status = current_status(&allocation)?;
        if status != AllocationStatus::Allocated {
            return Err(ServiceError::InvalidTransition(format!(
                "allocation {} cannot be cancelled from {}",
                allocation_id,
                status.as_str()
            )));
        }

        let item = InventoryItem::find_by_id(allocation.item_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item {} not found", allocation.item_id))
            })?;

        let mut active_item: inventory_item::ActiveModel = item.clone().into();
        active_item.quantity_allocated =
            Set(item.quantity_allocated - allocation.quantity_allocated);
        active_item.quantity_available =
            Set(item.quantity_available + allocation.quantity_allocated);
        active_item.updated_at = Set(Some(Utc::now()));
        active_item
            .update(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        let mut active: inventory_allocation::ActiveModel = allocation.clone().into();
        active.status = Set(AllocationStatus::Cancelled.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::AllocationCancelled(updated.id))
            .await;

        info!(allocation_id = %updated.id, "Allocation cancelled");

        Ok(updated)
    }

    pub async fn get_allocation(
        &self,
        allocation_id: Uuid,
    ) -> Result<inventory_allocation::Model, ServiceError> {
        let db = &*self.db;
        InventoryAllocation::find_by_id(allocation_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Allocation {} not found", allocation_id))
            })
    }

    #[instrument(skip(self))]
    pub async fn list_allocations(
        &self,
        filter: AllocationFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_allocation::Model>, u64), ServiceError> {
        if page == 0 {
            return Err(ServiceError::ValidationError(
                "Page number must be greater than 0".to_string(),
            ));
        }

        let db = &*self.db;
        let mut query = InventoryAllocation::find();

        if let Some(item_id) = filter.item_id {
            query = query.filter(inventory_allocation::Column::ItemId.eq(item_id));
        }
        if let Some(job_id) = filter.job_id {
            query = query.filter(inventory_allocation::Column::JobId.eq(job_id));
        }
        if let Some(bid_id) = filter.bid_id {
            query = query.filter(inventory_allocation::Column::BidId.eq(bid_id));
        }
        if let Some(status) = &filter.status {
            query = query.filter(inventory_allocation::Column::Status.eq(status.clone()));
        }

        query = query.order_by_desc(inventory_allocation::Column::AllocationDate);

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((rows, total))
    }

    async fn load_for_update<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        allocation_id: Uuid,
    ) -> Result<inventory_allocation::Model, ServiceError> {
        InventoryAllocation::find_by_id(allocation_id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Allocation {} not found", allocation_id))
            })
    }
}

fn current_status(
    allocation: &inventory_allocation::Model,
) -> Result<AllocationStatus, ServiceError> {
    allocation.status_enum().ok_or_else(|| {
        ServiceError::InternalError(format!(
            "allocation {} has unknown status {}",
            allocation.id, allocation.status
        ))
    })
}
