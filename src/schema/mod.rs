//! Entity schema tooling.
//!
//! The master entity schema is the single source of truth for every table on
//! the platform. [`deriver`] filters it down to the tenant schema document;
//! [`ddl`] turns a schema document into executable DDL for a freshly
//! provisioned tenant database.

pub mod ddl;
pub mod deriver;

pub use deriver::{SchemaDeriver, SchemaError};
