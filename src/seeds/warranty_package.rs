//! Warranty package seeding
//!
//! Seeds the master catalog with the standard coverage tiers so a fresh
//! installation has something to assign. Runs on every boot; existing rows
//! make it a no-op.

use anyhow::Result;
use sea_orm::{DatabaseConnection, PaginatorTrait};

use crate::models::warranty_package;
use crate::repositories::warranty_package::{NewItem, UpsertPackageRequest, WarrantyPackageRepository};

struct PackageSeed {
    name: &'static str,
    coverage_level: &'static str,
    duration_months: i32,
    retail_price_cents: i64,
    dealer_cost_cents: i64,
    items: &'static [&'static str],
}

const SEEDS: &[PackageSeed] = &[
    PackageSeed {
        name: "Powertrain Essential",
        coverage_level: "powertrain",
        duration_months: 24,
        retail_price_cents: 89_900,
        dealer_cost_cents: 52_000,
        items: &["Engine", "Transmission", "Drive axle"],
    },
    PackageSeed {
        name: "Comprehensive Plus",
        coverage_level: "comprehensive",
        duration_months: 36,
        retail_price_cents: 159_900,
        dealer_cost_cents: 94_000,
        items: &["Engine", "Transmission", "Electrical", "Cooling", "Steering"],
    },
    PackageSeed {
        name: "Exclusionary Elite",
        coverage_level: "exclusionary",
        duration_months: 48,
        retail_price_cents: 229_900,
        dealer_cost_cents: 141_000,
        items: &["All components except listed exclusions"],
    },
];

/// Seed the default catalog packages if the table is empty.
pub async fn seed_default_packages(db: &DatabaseConnection) -> Result<()> {
    let existing = warranty_package::Entity::find().count(db).await?;
    if existing > 0 {
        return Ok(());
    }

    let repo = WarrantyPackageRepository::new(db);
    for seed in SEEDS {
        repo.create_package(UpsertPackageRequest {
            name: seed.name.to_string(),
            description: None,
            coverage_level: seed.coverage_level.to_string(),
            duration_months: seed.duration_months,
            retail_price_cents: seed.retail_price_cents,
            dealer_cost_cents: seed.dealer_cost_cents,
            active: true,
            created_by_id: None,
            items: Some(
                seed.items
                    .iter()
                    .enumerate()
                    .map(|(idx, label)| NewItem {
                        label: label.to_string(),
                        detail: None,
                        sort_order: idx as i32,
                    })
                    .collect(),
            ),
        })
        .await?;
    }

    tracing::info!(count = SEEDS.len(), "seeded default warranty packages");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::MigratorTrait;
    use sea_orm::Database;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        seed_default_packages(&db).await.unwrap();
        let first = warranty_package::Entity::find().count(&db).await.unwrap();
        assert_eq!(first, SEEDS.len() as u64);

        seed_default_packages(&db).await.unwrap();
        let second = warranty_package::Entity::find().count(&db).await.unwrap();
        assert_eq!(second, first);
    }
}
