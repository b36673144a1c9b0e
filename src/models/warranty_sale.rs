//! Warranty sale entity model (tenant-shared).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "warranty_sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,

    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub package_id: Uuid,

    /// Selling dealer; null for master-side direct sales
    pub dealer_id: Option<Uuid>,

    /// Scalar reference to the selling master-side user
    pub sold_by_user_id: Option<Uuid>,

    pub sale_price_cents: i64,

    /// active | cancelled | expired
    pub status: String,

    pub sold_at: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
