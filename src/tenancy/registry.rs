//! Tenant connection registry.
//!
//! In-process cache mapping dealer ids to live, pooled tenant database
//! handles. Handles are created lazily from the mapping table, probed on
//! every reuse, evicted when the probe fails, and closed together at
//! process teardown.
//!
//! Creation is single-flight per dealer: concurrent first resolutions of
//! the same tenant serialize on a per-key slot lock and converge on one
//! pool. Distinct dealers never block each other beyond the brief global
//! map access.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, QueryFilter,
    Statement,
};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db;
use crate::models::tenant_database::{
    Column as MappingColumn, Entity as TenantDatabase, Model as MappingModel, STATUS_ACTIVE,
};

/// Error type for registry resolution.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No active mapping row exists for the dealer. Terminal for this call;
    /// the dealer was never provisioned (or has been disabled).
    #[error("tenant '{dealer_id}' has no configured database")]
    TenantNotConfigured { dealer_id: Uuid },
    /// The tenant database did not answer within the probe budget. Terminal
    /// for this call; not retried automatically.
    #[error("tenant '{dealer_id}' database is unreachable: {message}")]
    TenantUnreachable { dealer_id: Uuid, message: String },
    /// The master-side mapping lookup itself failed.
    #[error("failed to read tenant mapping: {0}")]
    MappingLookup(#[from] sea_orm::DbErr),
}

type HandleSlot = Arc<Mutex<Option<DatabaseConnection>>>;

/// Registry owning every live tenant handle in the process.
pub struct TenantConnectionRegistry {
    master: DatabaseConnection,
    config: Arc<AppConfig>,
    slots: Mutex<HashMap<Uuid, HandleSlot>>,
}

impl TenantConnectionRegistry {
    /// Create a registry backed by the master database for mapping lookups.
    pub fn new(master: DatabaseConnection, config: Arc<AppConfig>) -> Self {
        Self {
            master,
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The master catalog handle.
    pub fn master(&self) -> &DatabaseConnection {
        &self.master
    }

    /// Resolve a live handle for the dealer's tenant database.
    ///
    /// A cached handle is probed before reuse; a stale handle is closed,
    /// evicted and recreated within the same call. At most one recreation is
    /// attempted before the error surfaces.
    pub async fn resolve(&self, dealer_id: Uuid) -> Result<DatabaseConnection, RegistryError> {
        let slot = self.slot_for(dealer_id).await;
        let mut guard = slot.lock().await;

        if let Some(handle) = guard.as_ref() {
            match self.probe(handle).await {
                Ok(()) => return Ok(handle.clone()),
                Err(message) => {
                    warn!(%dealer_id, %message, "evicting stale tenant handle");
                    counter!("tenant_registry_evictions_total").increment(1);
                    if let Some(stale) = guard.take() {
                        let _ = stale.close().await;
                    }
                }
            }
        }

        let handle = self.open_handle(dealer_id).await?;
        *guard = Some(handle.clone());
        counter!("tenant_registry_handles_created_total").increment(1);
        Ok(handle)
    }

    /// Close and remove a cached handle, forcing the next resolution to
    /// recreate it.
    pub async fn evict(&self, dealer_id: Uuid) {
        let slot = { self.slots.lock().await.remove(&dealer_id) };
        if let Some(slot) = slot {
            if let Some(handle) = slot.lock().await.take() {
                debug!(%dealer_id, "evicting tenant handle");
                let _ = handle.close().await;
            }
        }
    }

    /// Close every cached handle. Called once at process teardown.
    pub async fn shutdown(&self) {
        let drained: Vec<(Uuid, HandleSlot)> = self.slots.lock().await.drain().collect();
        for (dealer_id, slot) in drained {
            if let Some(handle) = slot.lock().await.take() {
                debug!(%dealer_id, "closing tenant handle on shutdown");
                let _ = handle.close().await;
            }
        }
    }

    /// Number of dealers with a cached handle slot.
    pub async fn cached_handle_count(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// All active tenant mappings, in dealer order for stable fan-out.
    pub async fn active_mappings(&self) -> Result<Vec<MappingModel>, sea_orm::DbErr> {
        TenantDatabase::find()
            .filter(MappingColumn::Status.eq(STATUS_ACTIVE))
            .all(&self.master)
            .await
    }

    async fn slot_for(&self, dealer_id: Uuid) -> HandleSlot {
        let mut slots = self.slots.lock().await;
        slots.entry(dealer_id).or_default().clone()
    }

    async fn open_handle(&self, dealer_id: Uuid) -> Result<DatabaseConnection, RegistryError> {
        let mapping = TenantDatabase::find()
            .filter(MappingColumn::DealerId.eq(dealer_id))
            .filter(MappingColumn::Status.eq(STATUS_ACTIVE))
            .one(&self.master)
            .await?
            .ok_or(RegistryError::TenantNotConfigured { dealer_id })?;

        let options = db::connect_options(
            &mapping.db_url,
            self.config.tenant_db_max_connections,
            &self.config,
        );

        let handle = Database::connect(options).await.map_err(|err| {
            counter!("tenant_registry_connect_failures_total").increment(1);
            RegistryError::TenantUnreachable {
                dealer_id,
                message: err.to_string(),
            }
        })?;

        // One probe on the fresh handle; a database that cannot answer now is
        // surfaced rather than cached.
        if let Err(message) = self.probe(&handle).await {
            let _ = handle.close().await;
            counter!("tenant_registry_connect_failures_total").increment(1);
            return Err(RegistryError::TenantUnreachable { dealer_id, message });
        }

        debug!(%dealer_id, database = %mapping.database_name, "opened tenant handle");
        Ok(handle)
    }

    async fn probe(&self, handle: &DatabaseConnection) -> Result<(), String> {
        let budget = Duration::from_millis(self.config.fanout.probe_timeout_ms);
        let stmt = Statement::from_string(handle.get_database_backend(), "SELECT 1".to_string());

        match timeout(budget, handle.query_one(stmt)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => Err(format!("liveness probe timed out after {:?}", budget)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use migration::MigratorTrait;
    use sea_orm::Set;

    async fn master_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn insert_mapping(db: &DatabaseConnection, dealer_id: Uuid, db_url: &str) {
        use crate::models::dealer;

        let dealer = dealer::ActiveModel {
            id: Set(dealer_id),
            legal_name: Set("Test Dealer".to_string()),
            trading_name: Set(None),
            email: Set(format!("{dealer_id}@dealer.test")),
            phone: Set(None),
            address_line: Set(None),
            city: Set(None),
            password_hash: Set(None),
            status: Set("active".to_string()),
            database_name: Set(Some(format!("dealer_{}", dealer_id.simple()))),
            db_url: Set(Some(db_url.to_string())),
            provisioned_at: Set(Some(Utc::now().into())),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };
        sea_orm::ActiveModelTrait::insert(dealer, db).await.unwrap();

        let mapping = crate::models::tenant_database::ActiveModel {
            id: Set(Uuid::new_v4()),
            dealer_id: Set(dealer_id),
            database_name: Set(format!("dealer_{}", dealer_id.simple())),
            db_url: Set(db_url.to_string()),
            status: Set(STATUS_ACTIVE.to_string()),
            created_at: Set(Utc::now().into()),
        };
        sea_orm::ActiveModelTrait::insert(mapping, db)
            .await
            .unwrap();
    }

    fn registry(master: DatabaseConnection) -> TenantConnectionRegistry {
        TenantConnectionRegistry::new(master, Arc::new(AppConfig::default()))
    }

    #[tokio::test]
    async fn unknown_dealer_is_not_configured() {
        let registry = registry(master_db().await);

        let result = registry.resolve(Uuid::new_v4()).await;
        assert!(matches!(
            result,
            Err(RegistryError::TenantNotConfigured { .. })
        ));
    }

    #[tokio::test]
    async fn resolves_and_caches_a_usable_handle() {
        let master = master_db().await;
        let dealer_id = Uuid::new_v4();
        insert_mapping(&master, dealer_id, "sqlite::memory:").await;

        let registry = registry(master);
        let handle = registry.resolve(dealer_id).await.unwrap();
        assert!(db::health_check(&handle).await.is_ok());

        // Second resolution reuses the cached slot.
        let _again = registry.resolve(dealer_id).await.unwrap();
        assert_eq!(registry.cached_handle_count().await, 1);
    }

    #[tokio::test]
    async fn broken_handle_is_evicted_and_recreated() {
        let master = master_db().await;
        let dealer_id = Uuid::new_v4();
        insert_mapping(&master, dealer_id, "sqlite::memory:").await;

        let registry = registry(master);
        let handle = registry.resolve(dealer_id).await.unwrap();

        // Break the cached handle by closing its pool out from under the
        // registry; the next resolve must probe, evict and recreate.
        handle.close().await.unwrap();

        let fresh = registry.resolve(dealer_id).await.unwrap();
        assert!(db::health_check(&fresh).await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_tenant_surfaces_after_bounded_attempts() {
        let master = master_db().await;
        let dealer_id = Uuid::new_v4();
        // Read-only mode against a missing file fails at connect time.
        insert_mapping(&master, dealer_id, "sqlite:///nonexistent/tenant.db?mode=ro").await;

        let registry = registry(master);
        let result = registry.resolve(dealer_id).await;
        assert!(matches!(
            result,
            Err(RegistryError::TenantUnreachable { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_first_resolution_converges_on_one_slot() {
        let master = master_db().await;
        let dealer_id = Uuid::new_v4();
        insert_mapping(&master, dealer_id, "sqlite::memory:").await;

        let registry = Arc::new(registry(master));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(
                async move { registry.resolve(dealer_id).await },
            ));
        }

        for task in handles {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(registry.cached_handle_count().await, 1);
    }

    #[tokio::test]
    async fn evict_and_shutdown_clear_the_cache() {
        let master = master_db().await;
        let dealer_a = Uuid::new_v4();
        let dealer_b = Uuid::new_v4();
        insert_mapping(&master, dealer_a, "sqlite::memory:").await;
        insert_mapping(&master, dealer_b, "sqlite::memory:").await;

        let registry = registry(master);
        registry.resolve(dealer_a).await.unwrap();
        registry.resolve(dealer_b).await.unwrap();
        assert_eq!(registry.cached_handle_count().await, 2);

        registry.evict(dealer_a).await;
        assert_eq!(registry.cached_handle_count().await, 1);

        registry.shutdown().await;
        assert_eq!(registry.cached_handle_count().await, 0);
    }
}
