//! # Seed Data
//!
//! Idempotent bootstrap data for the master database.

pub mod warranty_package;
