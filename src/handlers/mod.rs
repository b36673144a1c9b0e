//! # API Handlers
//!
//! HTTP endpoint handlers. These stay thin: identity comes from the gateway
//! headers, the context router picks the database, and the tenancy layer
//! does the heavy lifting.

pub mod customers;
pub mod dealers;
pub mod packages;
pub mod types;

use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::db;
use crate::error::{ApiError, forbidden};
use crate::models::ServiceInfo;
use crate::server::AppState;

/// Reject callers below operator level.
pub(crate) fn require_elevated(caller: &CallerIdentity) -> Result<(), ApiError> {
    if caller.role.is_elevated() {
        Ok(())
    } else {
        Err(forbidden(Some("Operator role required")))
    }
}

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Health response payload
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Dealers with a cached tenant handle
    pub cached_tenant_handles: usize,
}

/// Liveness endpoint probing the master database.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Master database unavailable")
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    db::health_check(&state.db).await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        cached_tenant_handles: state.registry.cached_handle_count().await,
    }))
}
