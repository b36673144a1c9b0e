//! # Common API Types
//!
//! Shared request/response structures used across handlers.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Page-based response wrapper for merged cross-database listings.
///
/// Pagination always happens in memory after the merge, so `total` reflects
/// every source that answered.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    /// Items for the current page
    pub data: Vec<T>,
    /// 1-based page number
    pub page: u64,
    /// Page size used
    pub per_page: u64,
    /// Total merged rows before pagination
    pub total: u64,
}

/// Query parameters for cross-database listings.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Case-insensitive substring filter, applied after the merge
    pub search: Option<String>,
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Page size (default 25, max 100)
    pub per_page: Option<u64>,
    /// Explicit tenant override for elevated callers
    pub dealer_id: Option<Uuid>,
}

impl ListQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u64 {
        self.per_page.unwrap_or(25).clamp(1, 100)
    }
}
