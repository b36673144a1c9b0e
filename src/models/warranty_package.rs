//! Warranty package entity model (tenant-shared catalog).
//!
//! Authored in the master catalog; a tenant copy keeps the master id for
//! its whole lifetime so catalog propagation can address it. The
//! dealer_cost_cents and dealer_price_cents columns are tenant-local
//! overrides: propagation never writes them.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "warranty_packages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,

    pub name: String,

    pub description: Option<String>,

    /// powertrain | comprehensive | exclusionary
    pub coverage_level: String,

    pub duration_months: i32,

    /// Suggested retail price, shared catalog field
    pub retail_price_cents: i64,

    /// Tenant-local: what this dealer pays per contract
    pub dealer_cost_cents: i64,

    /// Tenant-local: the dealer's own sell price, if overridden
    pub dealer_price_cents: Option<i64>,

    pub active: bool,

    /// Scalar reference to the authoring master-side user
    pub created_by_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::warranty_package_item::Entity")]
    Items,
}

impl Related<super::warranty_package_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
