//! Data context routing.
//!
//! The single place that decides whether an operation targets the master
//! database or a tenant database. Every other component consumes the
//! resulting [`DataContext`] instead of re-implementing the role branch.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Caller roles recognized by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Operator,
    DealerAdmin,
    DealerStaff,
}

impl Role {
    /// Elevated roles operate on the master database by default and may
    /// inspect individual tenants on request.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Operator)
    }

    /// Parse a role name as carried by the gateway header.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "super_admin" => Some(Role::SuperAdmin),
            "operator" => Some(Role::Operator),
            "dealer_admin" => Some(Role::DealerAdmin),
            "dealer_staff" => Some(Role::DealerStaff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Operator => "operator",
            Role::DealerAdmin => "dealer_admin",
            Role::DealerStaff => "dealer_staff",
        }
    }
}

/// The database an operation must run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataContext {
    Master,
    Tenant(Uuid),
}

impl DataContext {
    pub fn is_master(&self) -> bool {
        matches!(self, DataContext::Master)
    }
}

/// Routing failures. Cross-tenant claims are authorization failures, never
/// silent reroutes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("caller from tenant '{caller}' may not act on tenant '{requested}'")]
    CrossTenantDenied { caller: Uuid, requested: Uuid },
    #[error("tenant-scoped role '{role}' carries no tenant claim")]
    MissingTenantClaim { role: &'static str },
}

/// Decide the data context for an operation.
///
/// * Elevated roles default to master; an explicit tenant override routes
///   them into that tenant (operator inspecting one dealer).
/// * Tenant-scoped roles always land in their own tenant; a request naming a
///   different tenant is rejected outright.
pub fn route(
    role: Role,
    caller_dealer: Option<Uuid>,
    requested_dealer: Option<Uuid>,
) -> Result<DataContext, ContextError> {
    if role.is_elevated() {
        return Ok(match requested_dealer {
            Some(dealer_id) => DataContext::Tenant(dealer_id),
            None => DataContext::Master,
        });
    }

    let own = caller_dealer.ok_or(ContextError::MissingTenantClaim {
        role: role.as_str(),
    })?;

    if let Some(requested) = requested_dealer {
        if requested != own {
            return Err(ContextError::CrossTenantDenied {
                caller: own,
                requested,
            });
        }
    }

    Ok(DataContext::Tenant(own))
}
