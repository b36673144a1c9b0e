//! # Data Models
//!
//! SeaORM entity models. Entities in the tenant-shared set (dealer,
//! customer, vehicle, warranty package/item, sale, invoice) are defined once
//! and executed against whichever connection the context router selects;
//! users, tenant database mappings, billing records and activity logs exist
//! only in the master database.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod activity_log;
pub mod billing_record;
pub mod customer;
pub mod dealer;
pub mod invoice;
pub mod tenant_database;
pub mod user;
pub mod vehicle;
pub mod warranty_package;
pub mod warranty_package_item;
pub mod warranty_sale;

pub use customer::Entity as Customer;
pub use dealer::Entity as Dealer;
pub use invoice::Entity as Invoice;
pub use tenant_database::Entity as TenantDatabase;
pub use user::Entity as User;
pub use vehicle::Entity as Vehicle;
pub use warranty_package::Entity as WarrantyPackage;
pub use warranty_package_item::Entity as WarrantyPackageItem;
pub use warranty_sale::Entity as WarrantySale;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "dealerhub".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
