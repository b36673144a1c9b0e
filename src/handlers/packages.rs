//! # Warranty Package Handlers
//!
//! Catalog authoring lives in the master database. Edits propagate to every
//! tenant copy after the master commit; the propagation outcome is reported
//! as counts alongside the updated package.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::require_elevated;
use crate::auth::CallerIdentity;
use crate::error::ApiError;
use crate::models::{warranty_package, warranty_package_item};
use crate::repositories::warranty_package::{NewItem, UpsertPackageRequest, WarrantyPackageRepository};
use crate::server::AppState;
use crate::tenancy::PropagationReport;

/// Request body for creating or updating a catalog package
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertPackageBody {
    pub name: String,
    pub description: Option<String>,
    pub coverage_level: String,
    pub duration_months: i32,
    pub retail_price_cents: i64,
    pub dealer_cost_cents: i64,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Replacement item list; omit to leave item lists untouched
    pub items: Option<Vec<NewItemBody>>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewItemBody {
    pub label: String,
    pub detail: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

impl UpsertPackageBody {
    fn into_request(self, created_by_id: Option<Uuid>) -> UpsertPackageRequest {
        UpsertPackageRequest {
            name: self.name,
            description: self.description,
            coverage_level: self.coverage_level,
            duration_months: self.duration_months,
            retail_price_cents: self.retail_price_cents,
            dealer_cost_cents: self.dealer_cost_cents,
            active: self.active,
            created_by_id,
            items: self.items.map(|items| {
                items
                    .into_iter()
                    .map(|item| NewItem {
                        label: item.label,
                        detail: item.detail,
                        sort_order: item.sort_order,
                    })
                    .collect()
            }),
        }
    }
}

/// Package item representation
#[derive(Debug, Serialize, ToSchema)]
pub struct PackageItemResponse {
    pub id: Uuid,
    pub label: String,
    pub detail: Option<String>,
    pub sort_order: i32,
}

impl From<warranty_package_item::Model> for PackageItemResponse {
    fn from(model: warranty_package_item::Model) -> Self {
        Self {
            id: model.id,
            label: model.label,
            detail: model.detail,
            sort_order: model.sort_order,
        }
    }
}

/// Package representation returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct PackageResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub coverage_level: String,
    pub duration_months: i32,
    pub retail_price_cents: i64,
    pub dealer_cost_cents: i64,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PackageItemResponse>>,
}

impl PackageResponse {
    fn from_model(
        model: warranty_package::Model,
        items: Option<Vec<warranty_package_item::Model>>,
    ) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            coverage_level: model.coverage_level,
            duration_months: model.duration_months,
            retail_price_cents: model.retail_price_cents,
            dealer_cost_cents: model.dealer_cost_cents,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            items: items.map(|items| items.into_iter().map(Into::into).collect()),
        }
    }
}

/// Update response carrying the propagation outcome
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdatePackageResponse {
    pub package: PackageResponse,
    /// Per-tenant propagation counts; failures degrade, they do not abort
    pub propagation: PropagationReport,
}

/// Assignment response
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignPackageResponse {
    /// False when the tenant already held a copy
    pub assigned: bool,
}

/// Request body for assigning a package to a dealer
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AssignPackageBody {
    /// Tenant-local cost override seeded at assignment time
    pub dealer_cost_cents: Option<i64>,
}

/// List catalog packages.
#[utoipa::path(
    get,
    path = "/packages",
    responses(
        (status = 200, description = "Catalog packages", body = [PackageResponse])
    ),
    tag = "packages"
)]
pub async fn list_packages(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<PackageResponse>>, ApiError> {
    require_elevated(&caller)?;

    let packages = WarrantyPackageRepository::new(&state.db)
        .list_packages()
        .await?;
    Ok(Json(
        packages
            .into_iter()
            .map(|p| PackageResponse::from_model(p, None))
            .collect(),
    ))
}

/// Create a catalog package in the master database.
#[utoipa::path(
    post,
    path = "/packages",
    request_body = UpsertPackageBody,
    responses(
        (status = 201, description = "Package created", body = PackageResponse)
    ),
    tag = "packages"
)]
pub async fn create_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(body): Json<UpsertPackageBody>,
) -> Result<(StatusCode, Json<PackageResponse>), ApiError> {
    require_elevated(&caller)?;

    let (package, items) = WarrantyPackageRepository::new(&state.db)
        .create_package(body.into_request(caller.user_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PackageResponse::from_model(package, Some(items))),
    ))
}

/// Edit a catalog package and push the edit into every tenant copy.
#[utoipa::path(
    put,
    path = "/packages/{id}",
    params(("id" = Uuid, Path, description = "Package id")),
    request_body = UpsertPackageBody,
    responses(
        (status = 200, description = "Package updated and propagated", body = UpdatePackageResponse),
        (status = 404, description = "Package not found")
    ),
    tag = "packages"
)]
pub async fn update_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Json(body): Json<UpsertPackageBody>,
) -> Result<Json<UpdatePackageResponse>, ApiError> {
    require_elevated(&caller)?;

    let (package, replaced_items) = WarrantyPackageRepository::new(&state.db)
        .update_package(id, body.into_request(caller.user_id))
        .await?;

    // The master edit is committed; tenant failures degrade to counts.
    let propagation = state
        .propagation
        .propagate_package(&package, replaced_items.as_deref())
        .await?;

    Ok(Json(UpdatePackageResponse {
        package: PackageResponse::from_model(package, replaced_items),
        propagation,
    }))
}

/// Copy a catalog package into one dealer's tenant database.
#[utoipa::path(
    post,
    path = "/packages/{id}/assign/{dealer_id}",
    params(
        ("id" = Uuid, Path, description = "Package id"),
        ("dealer_id" = Uuid, Path, description = "Dealer id")
    ),
    request_body = AssignPackageBody,
    responses(
        (status = 200, description = "Assignment outcome", body = AssignPackageResponse),
        (status = 404, description = "Package not found")
    ),
    tag = "packages"
)]
pub async fn assign_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, dealer_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<AssignPackageBody>,
) -> Result<Json<AssignPackageResponse>, ApiError> {
    require_elevated(&caller)?;

    let (package, items) = WarrantyPackageRepository::new(&state.db)
        .get_with_items(id)
        .await?
        .ok_or_else(|| {
            ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Package not found")
        })?;

    let assigned = state
        .propagation
        .assign_package(dealer_id, &package, &items, body.dealer_cost_cents)
        .await?;

    Ok(Json(AssignPackageResponse { assigned }))
}
