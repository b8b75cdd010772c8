use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Purchase order lifecycle. Forward-only:
/// `draft -> pending_approval -> approved -> sent ->
/// {partially_received -> received} -> closed`, with `cancelled` reachable
/// from any pre-`received` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOrderStatus {
    Draft,
    PendingApproval,
    Approved,
    Sent,
    PartiallyReceived,
    Received,
    Cancelled,
    Closed,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "draft",
            PurchaseOrderStatus::PendingApproval => "pending_approval",
            PurchaseOrderStatus::Approved => "approved",
            PurchaseOrderStatus::Sent => "sent",
            PurchaseOrderStatus::PartiallyReceived => "partially_received",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
            PurchaseOrderStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PurchaseOrderStatus::Draft),
            "pending_approval" => Some(PurchaseOrderStatus::PendingApproval),
            "approved" => Some(PurchaseOrderStatus::Approved),
            "sent" => Some(PurchaseOrderStatus::Sent),
            "partially_received" => Some(PurchaseOrderStatus::PartiallyReceived),
            "received" => Some(PurchaseOrderStatus::Received),
            "cancelled" => Some(PurchaseOrderStatus::Cancelled),
            "closed" => Some(PurchaseOrderStatus::Closed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Closed | PurchaseOrderStatus::Cancelled
        )
    }

    /// Cancellation is only reachable while nothing forces fulfillment.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Draft
                | PurchaseOrderStatus::PendingApproval
                | PurchaseOrderStatus::Approved
                | PurchaseOrderStatus::Sent
                | PurchaseOrderStatus::PartiallyReceived
        )
    }

    /// Orders carry expected supply on the items' `quantity_on_order` only
    /// once approved.
    pub fn carries_on_order(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Approved
                | PurchaseOrderStatus::Sent
                | PurchaseOrderStatus::PartiallyReceived
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_number: String,
    pub supplier_id: Uuid,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub tax_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub shipping_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount_paid: Decimal,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn status_enum(&self) -> Option<PurchaseOrderStatus> {
        PurchaseOrderStatus::from_str(&self.status)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    #[sea_orm(has_many = "super::purchase_order_item::Entity")]
    PurchaseOrderItem,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::purchase_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellable_only_before_received() {
        assert!(PurchaseOrderStatus::Draft.is_cancellable());
        assert!(PurchaseOrderStatus::Sent.is_cancellable());
        assert!(PurchaseOrderStatus::PartiallyReceived.is_cancellable());
        assert!(!PurchaseOrderStatus::Received.is_cancellable());
        assert!(!PurchaseOrderStatus::Closed.is_cancellable());
        assert!(!PurchaseOrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn on_order_window() {
        assert!(!PurchaseOrderStatus::Draft.carries_on_order());
        assert!(PurchaseOrderStatus::Approved.carries_on_order());
        assert!(PurchaseOrderStatus::Sent.carries_on_order());
        assert!(!PurchaseOrderStatus::Received.carries_on_order());
    }
}
