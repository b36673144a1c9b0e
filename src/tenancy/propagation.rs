//! Catalog propagation into tenant databases.
//!
//! When a shared warranty package is edited in the master catalog, the edit
//! is pushed into every active tenant that already holds a copy with the
//! same id. Tenants that never opted in are skipped, tenant-local override
//! columns survive the update untouched, and the attached item list is
//! replaced wholesale only when the caller supplied a new one.
//!
//! The master-side edit is already committed when propagation runs, so a
//! failing tenant is logged and counted rather than rolled back; the result
//! is a report, not an all-or-nothing verdict.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::registry::TenantConnectionRegistry;
use crate::models::{warranty_package, warranty_package_item};

/// Outcome counts for one propagation run.
#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct PropagationReport {
    /// Active tenants considered
    pub attempted: usize,
    /// Tenants whose copy was updated
    pub updated: usize,
    /// Tenants without a copy of the package
    pub skipped: usize,
    /// Tenants that could not be reached or updated
    pub failed: usize,
}

/// Pushes master catalog edits into tenant copies.
pub struct PropagationEngine {
    registry: Arc<TenantConnectionRegistry>,
}

impl PropagationEngine {
    pub fn new(registry: Arc<TenantConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Propagate a committed master-side package edit to every active tenant
    /// holding a copy.
    ///
    /// `items` replaces each tenant copy's item list wholesale when present;
    /// `None` leaves tenant item lists untouched.
    #[instrument(skip_all, fields(package_id = %package.id))]
    pub async fn propagate_package(
        &self,
        package: &warranty_package::Model,
        items: Option<&[warranty_package_item::Model]>,
    ) -> Result<PropagationReport> {
        let mappings = self
            .registry
            .active_mappings()
            .await
            .context("failed to enumerate active tenants")?;

        let mut report = PropagationReport::default();

        for mapping in mappings {
            report.attempted += 1;

            let conn = match self.registry.resolve(mapping.dealer_id).await {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(
                        dealer_id = %mapping.dealer_id,
                        error = %err,
                        "propagation skipped unreachable tenant"
                    );
                    counter!("catalog_propagation_failures_total").increment(1);
                    report.failed += 1;
                    continue;
                }
            };

            match push_update(&conn, package, items).await {
                Ok(true) => report.updated += 1,
                Ok(false) => report.skipped += 1,
                Err(err) => {
                    warn!(
                        dealer_id = %mapping.dealer_id,
                        error = %err,
                        "propagation failed for tenant"
                    );
                    counter!("catalog_propagation_failures_total").increment(1);
                    report.failed += 1;
                }
            }
        }

        info!(
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            "catalog propagation finished"
        );
        Ok(report)
    }

    /// Copy a master package into one tenant database ("assignment").
    ///
    /// The copy keeps the master id for its whole lifetime. The optional
    /// `dealer_cost_cents` seeds the tenant-local override; later catalog
    /// propagation will never touch it. Returns false when the tenant
    /// already holds a copy.
    #[instrument(skip_all, fields(package_id = %package.id, dealer_id = %dealer_id))]
    pub async fn assign_package(
        &self,
        dealer_id: Uuid,
        package: &warranty_package::Model,
        items: &[warranty_package_item::Model],
        dealer_cost_cents: Option<i64>,
    ) -> Result<bool> {
        let conn = self
            .registry
            .resolve(dealer_id)
            .await
            .context("tenant resolution failed")?;

        let existing = warranty_package::Entity::find_by_id(package.id)
            .one(&conn)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        // Fresh insert in the tenant database, same identifier as master.
        let mut copy = package.clone().into_active_model().reset_all();
        if let Some(cost) = dealer_cost_cents {
            copy.dealer_cost_cents = Set(cost);
        }
        copy.insert(&conn).await?;

        for item in items {
            item.clone()
                .into_active_model()
                .reset_all()
                .insert(&conn)
                .await?;
        }

        info!("assigned package to tenant");
        Ok(true)
    }
}

/// Update shared catalog fields on a tenant's copy, preserving the
/// tenant-local overrides. Returns false when the tenant holds no copy.
async fn push_update(
    conn: &DatabaseConnection,
    package: &warranty_package::Model,
    items: Option<&[warranty_package_item::Model]>,
) -> Result<bool> {
    let Some(existing) = warranty_package::Entity::find_by_id(package.id)
        .one(conn)
        .await?
    else {
        return Ok(false);
    };

    let mut copy: warranty_package::ActiveModel = existing.into();
    copy.name = Set(package.name.clone());
    copy.description = Set(package.description.clone());
    copy.coverage_level = Set(package.coverage_level.clone());
    copy.duration_months = Set(package.duration_months);
    copy.retail_price_cents = Set(package.retail_price_cents);
    copy.active = Set(package.active);
    copy.updated_at = Set(package.updated_at);
    // dealer_cost_cents and dealer_price_cents stay Unchanged: those belong
    // to the tenant.
    copy.update(conn).await?;

    if let Some(items) = items {
        warranty_package_item::Entity::delete_many()
            .filter(warranty_package_item::Column::PackageId.eq(package.id))
            .exec(conn)
            .await?;
        for item in items {
            item.clone()
                .into_active_model()
                .reset_all()
                .insert(conn)
                .await?;
        }
    }

    Ok(true)
}
