use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Types of inventory transactions. `receipt`, `return`, and `initial_stock`
/// carry positive quantities; `issue` and `write_off` negative; `adjustment`
/// an explicit signed delta; `transfer` produces two linked rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Receipt,
    Issue,
    Adjustment,
    Transfer,
    Return,
    WriteOff,
    InitialStock,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Receipt => "receipt",
            TransactionType::Issue => "issue",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Transfer => "transfer",
            TransactionType::Return => "return",
            TransactionType::WriteOff => "write_off",
            TransactionType::InitialStock => "initial_stock",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "receipt" => Some(TransactionType::Receipt),
            "issue" => Some(TransactionType::Issue),
            "adjustment" => Some(TransactionType::Adjustment),
            "transfer" => Some(TransactionType::Transfer),
            "return" => Some(TransactionType::Return),
            "write_off" => Some(TransactionType::WriteOff),
            "initial_stock" => Some(TransactionType::InitialStock),
            _ => None,
        }
    }

    /// Sign the magnitude according to the ledger convention. Adjustments
    /// and transfers keep the sign the caller supplied.
    pub fn signed(&self, magnitude: Decimal) -> Decimal {
        match self {
            TransactionType::Receipt
            | TransactionType::Return
            | TransactionType::InitialStock => magnitude.abs(),
            TransactionType::Issue | TransactionType::WriteOff => -magnitude.abs(),
            TransactionType::Adjustment | TransactionType::Transfer => magnitude,
        }
    }
}

/// Immutable ledger row. Created once per quantity-changing event, never
/// updated or deleted; corrections are compensating appends. Ordering by
/// `created_at` defines the canonical quantity history per item.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub transaction_type: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_cost: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance_after: Decimal,
    pub purchase_order_id: Option<Uuid>,
    pub allocation_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub bid_id: Option<Uuid>,
    pub count_id: Option<Uuid>,
    pub from_location_id: Option<Uuid>,
    pub to_location_id: Option<Uuid>,
    /// Links the negative and positive rows of a single transfer.
    pub transfer_group_id: Option<Uuid>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub performed_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn transaction_type_enum(&self) -> Option<TransactionType> {
        TransactionType::from_str(&self.transaction_type)
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

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            return Err(DbErr::Custom(
                "inventory transactions are immutable once written".to_string(),
            ));
        }
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }

    async fn before_delete<C>(self, _db: &C) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        Err(DbErr::Custom(
            "inventory transactions cannot be deleted".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sign_convention() {
        assert_eq!(TransactionType::Receipt.signed(dec!(5)), dec!(5));
        assert_eq!(TransactionType::Issue.signed(dec!(5)), dec!(-5));
        assert_eq!(TransactionType::WriteOff.signed(dec!(3)), dec!(-3));
        assert_eq!(TransactionType::Return.signed(dec!(-2)), dec!(2));
        assert_eq!(TransactionType::Adjustment.signed(dec!(-7)), dec!(-7));
        assert_eq!(TransactionType::Adjustment.signed(dec!(4)), dec!(4));
    }

    #[test]
    fn type_roundtrip() {
        for ty in [
            TransactionType::Receipt,
            TransactionType::Issue,
            TransactionType::Adjustment,
            TransactionType::Transfer,
            TransactionType::Return,
            TransactionType::WriteOff,
            TransactionType::InitialStock,
        ] {
            assert_eq!(TransactionType::from_str(ty.as_str()), Some(ty));
        }
        assert_eq!(TransactionType::from_str("unknown"), None);
    }
}
