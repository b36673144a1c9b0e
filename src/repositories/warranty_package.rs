//! # Warranty Package Repository
//!
//! Master-catalog CRUD for warranty packages and their item lists. Tenant
//! copies are written by the propagation engine, never directly here.

use crate::error::RepositoryError;
use crate::models::warranty_package::{
    ActiveModel as PackageActiveModel, Column as PackageColumn, Entity as WarrantyPackage,
    Model as PackageModel,
};
use crate::models::warranty_package_item::{
    ActiveModel as ItemActiveModel, Column as ItemColumn, Entity as WarrantyPackageItem,
    Model as ItemModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// Request data for creating or updating a catalog package
#[derive(Debug, Clone)]
pub struct UpsertPackageRequest {
    pub name: String,
    pub description: Option<String>,
    pub coverage_level: String,
    pub duration_months: i32,
    pub retail_price_cents: i64,
    pub dealer_cost_cents: i64,
    pub active: bool,
    pub created_by_id: Option<Uuid>,
    /// Replacement item list; `None` leaves existing items untouched on
    /// update.
    pub items: Option<Vec<NewItem>>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub label: String,
    pub detail: Option<String>,
    pub sort_order: i32,
}

/// Repository for master-catalog warranty package operations
pub struct WarrantyPackageRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> WarrantyPackageRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a catalog package with its item list.
    pub async fn create_package(
        &self,
        request: UpsertPackageRequest,
    ) -> Result<(PackageModel, Vec<ItemModel>), RepositoryError> {
        self.validate(&request)?;

        let now = Utc::now();
        let package = PackageActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            coverage_level: Set(request.coverage_level),
            duration_months: Set(request.duration_months),
            retail_price_cents: Set(request.retail_price_cents),
            dealer_cost_cents: Set(request.dealer_cost_cents),
            dealer_price_cents: Set(None),
            active: Set(request.active),
            created_by_id: Set(request.created_by_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let package = package
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let items = self
            .replace_items(package.id, request.items.unwrap_or_default())
            .await?;

        Ok((package, items))
    }

    /// Apply a catalog edit to the master package.
    ///
    /// Returns the updated package plus the replacement item list when one
    /// was supplied (the caller feeds both into propagation).
    pub async fn update_package(
        &self,
        package_id: Uuid,
        request: UpsertPackageRequest,
    ) -> Result<(PackageModel, Option<Vec<ItemModel>>), RepositoryError> {
        self.validate(&request)?;

        let existing = WarrantyPackage::find_by_id(package_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Warranty package not found".to_string()))?;

        let mut active = existing.into_active_model();
        active.name = Set(request.name);
        active.description = Set(request.description);
        active.coverage_level = Set(request.coverage_level);
        active.duration_months = Set(request.duration_months);
        active.retail_price_cents = Set(request.retail_price_cents);
        active.dealer_cost_cents = Set(request.dealer_cost_cents);
        active.active = Set(request.active);
        active.updated_at = Set(Utc::now().into());

        let package = active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let items = match request.items {
            Some(items) => Some(self.replace_items(package.id, items).await?),
            None => None,
        };

        Ok((package, items))
    }

    /// Fetch a package with its items.
    pub async fn get_with_items(
        &self,
        package_id: Uuid,
    ) -> Result<Option<(PackageModel, Vec<ItemModel>)>, RepositoryError> {
        let Some(package) = WarrantyPackage::find_by_id(package_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
        else {
            return Ok(None);
        };

        let items = WarrantyPackageItem::find()
            .filter(ItemColumn::PackageId.eq(package_id))
            .order_by_asc(ItemColumn::SortOrder)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(Some((package, items)))
    }

    /// List catalog packages, newest first.
    pub async fn list_packages(&self) -> Result<Vec<PackageModel>, RepositoryError> {
        let packages = WarrantyPackage::find()
            .order_by_desc(PackageColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(packages)
    }

    async fn replace_items(
        &self,
        package_id: Uuid,
        items: Vec<NewItem>,
    ) -> Result<Vec<ItemModel>, RepositoryError> {
        WarrantyPackageItem::delete_many()
            .filter(ItemColumn::PackageId.eq(package_id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let row = ItemActiveModel {
                id: Set(Uuid::new_v4()),
                package_id: Set(package_id),
                label: Set(item.label),
                detail: Set(item.detail),
                sort_order: Set(item.sort_order),
            };
            created.push(
                row.insert(self.db)
                    .await
                    .map_err(RepositoryError::database_error)?,
            );
        }

        Ok(created)
    }

    fn validate(&self, request: &UpsertPackageRequest) -> Result<(), RepositoryError> {
        if request.name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Package name cannot be empty",
            ));
        }
        if request.duration_months <= 0 {
            return Err(RepositoryError::validation_error(
                "Package duration must be positive",
            ));
        }
        if request.retail_price_cents < 0 || request.dealer_cost_cents < 0 {
            return Err(RepositoryError::validation_error(
                "Package prices cannot be negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::MigratorTrait;
    use sea_orm::Database;

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn request(name: &str, items: Option<Vec<NewItem>>) -> UpsertPackageRequest {
        UpsertPackageRequest {
            name: name.to_string(),
            description: None,
            coverage_level: "powertrain".to_string(),
            duration_months: 36,
            retail_price_cents: 150_000,
            dealer_cost_cents: 90_000,
            active: true,
            created_by_id: None,
            items,
        }
    }

    #[tokio::test]
    async fn test_create_package_with_items() {
        let db = setup_test_db().await;
        let repo = WarrantyPackageRepository::new(&db);

        let items = vec![
            NewItem {
                label: "Engine".to_string(),
                detail: None,
                sort_order: 0,
            },
            NewItem {
                label: "Transmission".to_string(),
                detail: Some("Includes transfer case".to_string()),
                sort_order: 1,
            },
        ];

        let (package, created_items) = repo
            .create_package(request("Gold", Some(items)))
            .await
            .unwrap();
        assert_eq!(created_items.len(), 2);

        let (_, fetched) = repo.get_with_items(package.id).await.unwrap().unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].label, "Engine");
    }

    #[tokio::test]
    async fn test_update_without_items_leaves_list_untouched() {
        let db = setup_test_db().await;
        let repo = WarrantyPackageRepository::new(&db);

        let items = vec![NewItem {
            label: "Engine".to_string(),
            detail: None,
            sort_order: 0,
        }];
        let (package, _) = repo
            .create_package(request("Gold", Some(items)))
            .await
            .unwrap();

        let (updated, replaced) = repo
            .update_package(package.id, request("Gold Plus", None))
            .await
            .unwrap();
        assert_eq!(updated.name, "Gold Plus");
        assert!(replaced.is_none());

        let (_, fetched) = repo.get_with_items(package.id).await.unwrap().unwrap();
        assert_eq!(fetched.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_package_is_not_found() {
        let db = setup_test_db().await;
        let repo = WarrantyPackageRepository::new(&db);

        let result = repo.update_package(Uuid::new_v4(), request("Ghost", None)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_validation_rules() {
        let db = setup_test_db().await;
        let repo = WarrantyPackageRepository::new(&db);

        let mut bad = request("", None);
        bad.name = "".to_string();
        assert!(matches!(
            repo.create_package(bad).await,
            Err(RepositoryError::Validation(_))
        ));

        let mut bad = request("Gold", None);
        bad.duration_months = 0;
        assert!(matches!(
            repo.create_package(bad).await,
            Err(RepositoryError::Validation(_))
        ));
    }
}
