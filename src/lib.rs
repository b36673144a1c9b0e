//! # Dealerhub API Library
//!
//! Backend for a multi-tenant dealer platform: a master catalog database
//! plus one isolated database per dealer, with the data plane that derives
//! tenant schemas, provisions tenant databases, keeps live connections, and
//! fans operations out across every tenant.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub mod tenancy;
pub use migration;
