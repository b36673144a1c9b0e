//! Warranty package item entity model (tenant-shared catalog).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "warranty_package_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,

    pub package_id: Uuid,

    /// Short coverage line shown on the contract
    pub label: String,

    pub detail: Option<String>,

    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::warranty_package::Entity",
        from = "Column::PackageId",
        to = "super::warranty_package::Column::Id"
    )]
    Package,
}

impl Related<super::warranty_package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Package.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
