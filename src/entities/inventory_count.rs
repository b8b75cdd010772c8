use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CountType {
    Full,
    Cycle,
    Spot,
}

impl CountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountType::Full => "full",
            CountType::Cycle => "cycle",
            CountType::Spot => "spot",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "full" => Some(CountType::Full),
            "cycle" => Some(CountType::Cycle),
            "spot" => Some(CountType::Spot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl CountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountStatus::Planned => "planned",
            CountStatus::InProgress => "in_progress",
            CountStatus::Completed => "completed",
            CountStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(CountStatus::Planned),
            "in_progress" => Some(CountStatus::InProgress),
            "completed" => Some(CountStatus::Completed),
            "cancelled" => Some(CountStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CountStatus::Completed | CountStatus::Cancelled)
    }
}

/// Physical count session. System quantities are snapshotted into the
/// session's count items at the moment counting starts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_counts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub count_number: String,
    pub count_type: String,
    pub status: String,
    pub location_id: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn status_enum(&self) -> Option<CountStatus> {
        CountStatus::from_str(&self.status)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_count_item::Entity")]
    InventoryCountItem,
}

impl Related<super::inventory_count_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryCountItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
