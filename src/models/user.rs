//! User entity model (master-only).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Platform user: operators, admins and dealer staff.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Login email, unique across the platform
    pub email: String,

    pub display_name: Option<String>,

    /// Role name (super_admin | operator | dealer_admin | dealer_staff)
    pub role: String,

    /// Dealer this user belongs to; null for platform-level users
    pub dealer_id: Option<Uuid>,

    /// Hash issued by the external auth service
    pub password_hash: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
