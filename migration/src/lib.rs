//! Database migrations for the master catalog database.
//!
//! Only the master database is migrated here. Tenant databases are
//! materialized from the derived tenant schema at provisioning time.

pub use sea_orm_migration::prelude::*;

mod m2025_06_01_000001_create_users;
mod m2025_06_01_000002_create_dealers;
mod m2025_06_01_000003_create_tenant_databases;
mod m2025_06_01_000004_create_customers;
mod m2025_06_01_000005_create_vehicles;
mod m2025_06_01_000006_create_warranty_packages;
mod m2025_06_01_000007_create_warranty_package_items;
mod m2025_06_01_000008_create_warranty_sales;
mod m2025_06_01_000009_create_invoices;
mod m2025_06_01_000010_create_billing_records;
mod m2025_06_01_000011_create_activity_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_06_01_000001_create_users::Migration),
            Box::new(m2025_06_01_000002_create_dealers::Migration),
            Box::new(m2025_06_01_000003_create_tenant_databases::Migration),
            Box::new(m2025_06_01_000004_create_customers::Migration),
            Box::new(m2025_06_01_000005_create_vehicles::Migration),
            Box::new(m2025_06_01_000006_create_warranty_packages::Migration),
            Box::new(m2025_06_01_000007_create_warranty_package_items::Migration),
            Box::new(m2025_06_01_000008_create_warranty_sales::Migration),
            Box::new(m2025_06_01_000009_create_invoices::Migration),
            Box::new(m2025_06_01_000010_create_billing_records::Migration),
            Box::new(m2025_06_01_000011_create_activity_logs::Migration),
        ]
    }
}
