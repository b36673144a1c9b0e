//! # Repositories
//!
//! Data access layer. Each repository borrows a connection, so the same
//! code runs against the master database or any tenant database; the caller
//! decides which by routing through the tenancy layer first.

pub mod customer;
pub mod dealer;
pub mod warranty_package;

pub use customer::CustomerRepository;
pub use dealer::DealerRepository;
pub use warranty_package::WarrantyPackageRepository;
