use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an allocation. Forward-only:
/// `allocated -> issued -> {partially_used | fully_used} -> returned`,
/// with `cancelled` reachable only before issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationStatus {
    Allocated,
    Issued,
    PartiallyUsed,
    FullyUsed,
    Returned,
    Cancelled,
}

impl AllocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStatus::Allocated => "allocated",
            AllocationStatus::Issued => "issued",
            AllocationStatus::PartiallyUsed => "partially_used",
            AllocationStatus::FullyUsed => "fully_used",
            AllocationStatus::Returned => "returned",
            AllocationStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "allocated" => Some(AllocationStatus::Allocated),
            "issued" => Some(AllocationStatus::Issued),
            "partially_used" => Some(AllocationStatus::PartiallyUsed),
            "fully_used" => Some(AllocationStatus::FullyUsed),
            "returned" => Some(AllocationStatus::Returned),
            "cancelled" => Some(AllocationStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AllocationStatus::Returned | AllocationStatus::Cancelled | AllocationStatus::FullyUsed
        )
    }
}

/// Reservation of item quantity for a job or a bid (exactly one of the two).
/// Invariant: `quantity_used + quantity_returned <= quantity_allocated`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub job_id: Option<Uuid>,
    pub bid_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_allocated: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_used: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_returned: Decimal,
    pub status: String,
    pub allocation_date: DateTime<Utc>,
    pub expected_use_date: Option<DateTime<Utc>>,
    pub actual_use_date: Option<DateTime<Utc>>,
    pub allocated_by: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn status_enum(&self) -> Option<AllocationStatus> {
        AllocationStatus::from_str(&self.status)
    }

    /// Consumed quantity not yet returned.
    pub fn used_remaining(&self) -> Decimal {
        self.quantity_used - self.quantity_returned
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_item::Entity",
        from = "Column::ItemId",
        to = "super::inventory_item::Column::Id"
    )]
    InventoryItem,
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(AllocationStatus::Cancelled.is_terminal());
        assert!(AllocationStatus::Returned.is_terminal());
        assert!(AllocationStatus::FullyUsed.is_terminal());
        assert!(!AllocationStatus::Allocated.is_terminal());
        assert!(!AllocationStatus::Issued.is_terminal());
        assert!(!AllocationStatus::PartiallyUsed.is_terminal());
    }
}
