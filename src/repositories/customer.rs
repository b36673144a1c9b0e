//! # Customer Repository
//!
//! Customer CRUD and lookups. The same repository runs against master or a
//! tenant database; cross-database listings and identity search go through
//! the fan-out layer, which calls these per-connection queries.

use crate::error::RepositoryError;
use crate::models::customer::{
    ActiveModel as CustomerActiveModel, Column as CustomerColumn, Entity as Customer,
    Model as CustomerModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// Request data for creating a customer
#[derive(Debug, Clone)]
pub struct CreateCustomerRequest {
    pub dealer_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub account_manager_id: Option<Uuid>,
}

/// Repository for customer database operations
pub struct CustomerRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CustomerRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a customer in the connected database.
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerModel, RepositoryError> {
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Customer name cannot be empty",
            ));
        }
        if !request.email.contains('@') {
            return Err(RepositoryError::validation_error(
                "Customer email is not valid",
            ));
        }

        let now = Utc::now();
        let customer = CustomerActiveModel {
            id: Set(Uuid::new_v4()),
            dealer_id: Set(request.dealer_id),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            email: Set(request.email),
            phone: Set(request.phone),
            account_manager_id: Set(request.account_manager_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = customer
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// All customers in the connected database, newest first.
    ///
    /// Cross-tenant listings fetch every source in full and paginate after
    /// the merge, so no limit is pushed down here.
    pub async fn list_customers(&self) -> Result<Vec<CustomerModel>, RepositoryError> {
        let customers = Customer::find()
            .order_by_desc(CustomerColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(customers)
    }

    /// Find one customer by email.
    ///
    /// With `only_unassigned` the query narrows to rows without a dealer,
    /// which is the master-side condition during identity search.
    pub async fn find_by_email(
        &self,
        email: &str,
        only_unassigned: bool,
    ) -> Result<Option<CustomerModel>, RepositoryError> {
        let mut query = Customer::find().filter(CustomerColumn::Email.eq(email));
        if only_unassigned {
            query = query.filter(CustomerColumn::DealerId.is_null());
        }

        let customer = query
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(customer)
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

    fn request(email: &str, dealer_id: Option<Uuid>) -> CreateCustomerRequest {
        CreateCustomerRequest {
            dealer_id,
            first_name: "Jane".to_string(),
            last_name: "Driver".to_string(),
            email: email.to_string(),
            phone: None,
            account_manager_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_customers() {
        let db = setup_test_db().await;
        let repo = CustomerRepository::new(&db);

        repo.create_customer(request("a@example.test", None))
            .await
            .unwrap();
        repo.create_customer(request("b@example.test", None))
            .await
            .unwrap();

        let all = repo.list_customers().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_email_narrows_to_unassigned() {
        let db = setup_test_db().await;
        let repo = CustomerRepository::new(&db);

        let dealer_id = Uuid::new_v4();
        repo.create_customer(request("assigned@example.test", Some(dealer_id)))
            .await
            .unwrap();

        // The narrowed lookup ignores customers already owned by a dealer.
        let narrowed = repo
            .find_by_email("assigned@example.test", true)
            .await
            .unwrap();
        assert!(narrowed.is_none());

        let unnarrowed = repo
            .find_by_email("assigned@example.test", false)
            .await
            .unwrap();
        assert!(unnarrowed.is_some());
    }

    #[tokio::test]
    async fn test_create_customer_validation() {
        let db = setup_test_db().await;
        let repo = CustomerRepository::new(&db);

        let mut bad = request("x@example.test", None);
        bad.first_name = "".to_string();
        assert!(matches!(
            repo.create_customer(bad).await,
            Err(RepositoryError::Validation(_))
        ));

        let bad = request("not-an-email", None);
        assert!(matches!(
            repo.create_customer(bad).await,
            Err(RepositoryError::Validation(_))
        ));
    }
}
