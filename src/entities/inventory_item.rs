use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stocking status of an item. `InStock`/`LowStock`/`OutOfStock` are derived
/// from quantities; `OnOrder` and `Discontinued` are explicit overrides that
/// take precedence over the computed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    InStock,
    LowStock,
    OutOfStock,
    OnOrder,
    Discontinued,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::InStock => "in_stock",
            ItemStatus::LowStock => "low_stock",
            ItemStatus::OutOfStock => "out_of_stock",
            ItemStatus::OnOrder => "on_order",
            ItemStatus::Discontinued => "discontinued",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in_stock" => Some(ItemStatus::InStock),
            "low_stock" => Some(ItemStatus::LowStock),
            "out_of_stock" => Some(ItemStatus::OutOfStock),
            "on_order" => Some(ItemStatus::OnOrder),
            "discontinued" => Some(ItemStatus::Discontinued),
            _ => None,
        }
    }

    /// True for the override statuses that may be set administratively or by
    /// the purchasing workflow.
    pub fn is_override(&self) -> bool {
        matches!(self, ItemStatus::OnOrder | ItemStatus::Discontinued)
    }
}

/// Computes the stocking status from quantities. An override, when present,
/// wins over the computed baseline.
pub fn derive_status(
    quantity_on_hand: Decimal,
    reorder_level: Decimal,
    status_override: Option<ItemStatus>,
) -> ItemStatus {
    if let Some(forced) = status_override {
        return forced;
    }
    if quantity_on_hand.is_zero() {
        ItemStatus::OutOfStock
    } else if quantity_on_hand <= reorder_level {
        ItemStatus::LowStock
    } else {
        ItemStatus::InStock
    }
}

/// Stock-keeping unit. The quantity columns are a materialized projection of
/// the transaction ledger; they are written only by ledger application and
/// must satisfy `quantity_on_hand = quantity_allocated + quantity_available`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub item_code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit_of_measure_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub average_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub selling_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_on_hand: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_allocated: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_available: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_on_order: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub reorder_level: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub reorder_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub max_stock_level: Option<Decimal>,
    pub status: String,
    pub status_override: Option<String>,
    pub track_serial: bool,
    pub track_batch: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn status_enum(&self) -> Option<ItemStatus> {
        ItemStatus::from_str(&self.status)
    }

    pub fn override_enum(&self) -> Option<ItemStatus> {
        self.status_override
            .as_deref()
            .and_then(ItemStatus::from_str)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::inventory_transaction::Entity")]
    InventoryTransaction,
    #[sea_orm(has_many = "super::inventory_allocation::Entity")]
    InventoryAllocation,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::inventory_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryTransaction.def()
    }
}

impl Related<super::inventory_allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryAllocation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_on_hand_is_out_of_stock() {
        assert_eq!(
            derive_status(dec!(0), dec!(10), None),
            ItemStatus::OutOfStock
        );
    }

    #[test]
    fn at_or_below_reorder_level_is_low_stock() {
        assert_eq!(derive_status(dec!(10), dec!(10), None), ItemStatus::LowStock);
        assert_eq!(derive_status(dec!(3), dec!(10), None), ItemStatus::LowStock);
    }

    #[test]
    fn above_reorder_level_is_in_stock() {
        assert_eq!(derive_status(dec!(11), dec!(10), None), ItemStatus::InStock);
    }

    #[test]
    fn override_takes_precedence() {
        assert_eq!(
            derive_status(dec!(50), dec!(10), Some(ItemStatus::Discontinued)),
            ItemStatus::Discontinued
        );
        assert_eq!(
            derive_status(dec!(0), dec!(10), Some(ItemStatus::OnOrder)),
            ItemStatus::OnOrder
        );
    }
}
