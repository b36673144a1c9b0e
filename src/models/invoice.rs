//! Invoice entity model (tenant-shared).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,

    pub sale_id: Uuid,

    /// Human-facing invoice number, unique per database
    pub number: String,

    pub amount_cents: i64,

    /// issued | paid | void
    pub status: String,

    pub issued_at: DateTimeWithTimeZone,
    pub due_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::warranty_sale::Entity",
        from = "Column::SaleId",
        to = "super::warranty_sale::Column::Id"
    )]
    Sale,
}

impl Related<super::warranty_sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
