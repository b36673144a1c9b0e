//! Tenant database mapping entity (master-only).
//!
//! Durable record tying a dealer to its physical database. Written exactly
//! once by the provisioner; read by the connection registry whenever no
//! cached handle exists. A dealer without a row here is unreachable by the
//! data plane.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenant_databases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Owning dealer; one mapping per dealer
    pub dealer_id: Uuid,

    /// Physical database name, unique across the cluster
    pub database_name: String,

    /// Full connection URL for the tenant database
    pub db_url: String,

    /// active | disabled
    pub status: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dealer::Entity",
        from = "Column::DealerId",
        to = "super::dealer::Column::Id"
    )]
    Dealer,
}

impl Related<super::dealer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dealer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Mapping status values.
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_DISABLED: &str = "disabled";
