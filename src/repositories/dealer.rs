//! # Dealer Repository
//!
//! Master-side CRUD for dealer rows. Creation enforces the platform-wide
//! email uniqueness rule across both the dealers and users tables before
//! inserting; the per-table unique indexes remain the backstop.

use crate::error::RepositoryError;
use crate::models::dealer::{
    ActiveModel as DealerActiveModel, Column as DealerColumn, Entity as Dealer,
    Model as DealerModel, STATUS_ACTIVE,
};
use crate::models::user::{Column as UserColumn, Entity as User};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// Request data for registering a new dealer
#[derive(Debug, Clone)]
pub struct CreateDealerRequest {
    pub legal_name: String,
    pub trading_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub password_hash: Option<String>,
}

/// Repository for dealer database operations
pub struct DealerRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DealerRepository<'a> {
    /// Create a new DealerRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a dealer in the master database.
    ///
    /// The row starts unprovisioned: no database name, URL or timestamp
    /// until the provisioner succeeds.
    pub async fn create_dealer(
        &self,
        request: CreateDealerRequest,
    ) -> Result<DealerModel, RepositoryError> {
        self.validate(&request)?;
        self.ensure_email_unused(&request.email).await?;

        let now = Utc::now();
        let dealer = DealerActiveModel {
            id: Set(Uuid::new_v4()),
            legal_name: Set(request.legal_name),
            trading_name: Set(request.trading_name),
            email: Set(request.email),
            phone: Set(request.phone),
            address_line: Set(request.address_line),
            city: Set(request.city),
            password_hash: Set(request.password_hash),
            status: Set(STATUS_ACTIVE.to_string()),
            database_name: Set(None),
            db_url: Set(None),
            provisioned_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = dealer
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get dealer by ID
    pub async fn get_dealer_by_id(
        &self,
        dealer_id: Uuid,
    ) -> Result<Option<DealerModel>, RepositoryError> {
        let dealer = Dealer::find_by_id(dealer_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(dealer)
    }

    /// List all dealers, newest first
    pub async fn list_dealers(&self) -> Result<Vec<DealerModel>, RepositoryError> {
        let dealers = Dealer::find()
            .order_by_desc(DealerColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(dealers)
    }

    /// Update a dealer's status
    pub async fn set_status(
        &self,
        dealer_id: Uuid,
        status: &str,
    ) -> Result<DealerModel, RepositoryError> {
        let dealer = self
            .get_dealer_by_id(dealer_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Dealer not found".to_string()))?;

        let mut active = dealer.into_active_model();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now().into());

        let result = active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Delete a dealer row (provisioning rollback path)
    pub async fn delete_dealer(&self, dealer_id: Uuid) -> Result<(), RepositoryError> {
        Dealer::delete_by_id(dealer_id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    /// Reject emails already taken by a dealer or any user identity.
    async fn ensure_email_unused(&self, email: &str) -> Result<(), RepositoryError> {
        let dealer_exists = Dealer::find()
            .filter(DealerColumn::Email.eq(email))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .is_some();

        if dealer_exists {
            return Err(RepositoryError::Conflict(
                "Email is already registered to a dealer".to_string(),
            ));
        }

        let user_exists = User::find()
            .filter(UserColumn::Email.eq(email))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .is_some();

        if user_exists {
            return Err(RepositoryError::Conflict(
                "Email is already registered to a user".to_string(),
            ));
        }

        Ok(())
    }

    fn validate(&self, request: &CreateDealerRequest) -> Result<(), RepositoryError> {
        if request.legal_name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Dealer legal name cannot be empty",
            ));
        }

        if request.legal_name.len() > 255 {
            return Err(RepositoryError::validation_error(
                "Dealer legal name cannot exceed 255 characters",
            ));
        }

        if !request.email.contains('@') {
            return Err(RepositoryError::validation_error(
                "Dealer email is not valid",
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

    fn request(email: &str) -> CreateDealerRequest {
        CreateDealerRequest {
            legal_name: "Test Motors Ltd".to_string(),
            trading_name: Some("Test Motors".to_string()),
            email: email.to_string(),
            phone: None,
            address_line: None,
            city: None,
            password_hash: None,
        }
    }

    #[tokio::test]
    async fn test_create_dealer_success() {
        let db = setup_test_db().await;
        let repo = DealerRepository::new(&db);

        let dealer = repo.create_dealer(request("sales@test.motors")).await.unwrap();
        assert_eq!(dealer.legal_name, "Test Motors Ltd");
        assert_eq!(dealer.status, STATUS_ACTIVE);
        assert!(dealer.database_name.is_none());
        assert!(dealer.provisioned_at.is_none());
    }

    #[tokio::test]
    async fn test_create_dealer_validation() {
        let db = setup_test_db().await;
        let repo = DealerRepository::new(&db);

        let mut bad = request("sales@test.motors");
        bad.legal_name = "  ".to_string();
        assert!(matches!(
            repo.create_dealer(bad).await,
            Err(RepositoryError::Validation(_))
        ));

        let mut bad = request("sales@test.motors");
        bad.email = "not-an-email".to_string();
        assert!(matches!(
            repo.create_dealer(bad).await,
            Err(RepositoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_email_unique_across_dealers_and_users() {
        let db = setup_test_db().await;
        let repo = DealerRepository::new(&db);

        repo.create_dealer(request("shared@test.motors"))
            .await
            .unwrap();
        assert!(matches!(
            repo.create_dealer(request("shared@test.motors")).await,
            Err(RepositoryError::Conflict(_))
        ));

        // A user identity blocks the email as well.
        let user = crate::models::user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set("operator@test.platform".to_string()),
            display_name: Set(None),
            role: Set("operator".to_string()),
            dealer_id: Set(None),
            password_hash: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };
        user.insert(&db).await.unwrap();

        assert!(matches!(
            repo.create_dealer(request("operator@test.platform")).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_set_status_and_delete() {
        let db = setup_test_db().await;
        let repo = DealerRepository::new(&db);

        let dealer = repo.create_dealer(request("sales@test.motors")).await.unwrap();

        let suspended = repo.set_status(dealer.id, "suspended").await.unwrap();
        assert_eq!(suspended.status, "suspended");

        repo.delete_dealer(dealer.id).await.unwrap();
        assert!(repo.get_dealer_by_id(dealer.id).await.unwrap().is_none());
    }
}
