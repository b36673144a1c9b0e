//! Customer entity model (tenant-shared).
//!
//! In the master database a customer with a null dealer_id is an account
//! that has not been assigned to any dealer yet; identity search probes
//! those rows before scanning tenant databases.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Owning dealer; null in master for dealer-less accounts
    pub dealer_id: Option<Uuid>,

    pub first_name: String,
    pub last_name: String,

    pub email: String,

    pub phone: Option<String>,

    /// Scalar reference to a master-side user; the user row itself never
    /// exists in a tenant database
    pub account_manager_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehicle::Entity")]
    Vehicles,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
