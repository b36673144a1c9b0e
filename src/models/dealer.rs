//! Dealer entity model.
//!
//! In the master database this is the tenant registry: one row per dealer,
//! with the connection fields populated once provisioning has completed.
//! Each tenant database carries a single denormalized copy of its own
//! dealer row so tenant-local code never reaches across databases.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Dealer entity representing the business identity of a tenant
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dealers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,

    pub legal_name: String,

    pub trading_name: Option<String>,

    /// Contact email, unique across dealers and users
    pub email: String,

    pub phone: Option<String>,

    pub address_line: Option<String>,

    pub city: Option<String>,

    /// Hash issued by the external auth service
    pub password_hash: Option<String>,

    /// active | suspended
    pub status: String,

    /// Physical database name; null until provisioning completes
    pub database_name: Option<String>,

    /// Connection URL for the tenant database; null until provisioning completes
    pub db_url: Option<String>,

    pub provisioned_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::tenant_database::Entity")]
    TenantDatabase,
}

impl Related<super::tenant_database::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenantDatabase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Dealer status values.
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_SUSPENDED: &str = "suspended";
