//! # Server Configuration
//!
//! Router assembly, shared state and the server lifecycle. The connection
//! registry is owned here and closed exactly once when the server drains.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::db;
use crate::handlers;
use crate::seeds;
use crate::telemetry;
use crate::tenancy::{
    FanOutExecutor, PropagationEngine, TenantConnectionRegistry, TenantProvisioner,
};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub registry: Arc<TenantConnectionRegistry>,
    pub provisioner: Arc<TenantProvisioner>,
    pub fanout: Arc<FanOutExecutor>,
    pub propagation: Arc<PropagationEngine>,
}

impl AppState {
    /// Wire up the data plane around a master connection.
    pub fn build(config: Arc<AppConfig>, master: DatabaseConnection) -> Self {
        let registry = Arc::new(TenantConnectionRegistry::new(
            master.clone(),
            Arc::clone(&config),
        ));
        let provisioner = Arc::new(TenantProvisioner::new(master.clone(), Arc::clone(&config)));
        let fanout = Arc::new(FanOutExecutor::new(
            Arc::clone(&registry),
            Arc::clone(&config),
        ));
        let propagation = Arc::new(PropagationEngine::new(Arc::clone(&registry)));

        Self {
            config,
            db: master,
            registry,
            provisioner,
            fanout,
            propagation,
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::health))
        .route(
            "/dealers",
            post(handlers::dealers::create_dealer).get(handlers::dealers::list_dealers),
        )
        .route("/dealers/{id}", get(handlers::dealers::get_dealer))
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/lookup",
            get(handlers::customers::lookup_customer),
        )
        .route(
            "/packages",
            get(handlers::packages::list_packages).post(handlers::packages::create_package),
        )
        .route("/packages/{id}", put(handlers::packages::update_package))
        .route(
            "/packages/{id}/assign/{dealer_id}",
            post(handlers::packages::assign_package),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing(&config)?;

    let config = Arc::new(config);
    let master = db::init_pool(&config).await?;

    use migration::MigratorTrait;
    migration::Migrator::up(&master, None).await?;
    seeds::warranty_package::seed_default_packages(&master).await?;

    let state = AppState::build(Arc::clone(&config), master);
    let registry = Arc::clone(&state.registry);
    let app = create_app(state);

    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, profile = %config.profile, "server listening");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    // Teardown: close every tenant handle exactly once.
    registry.shutdown().await;
    info!("tenant handles closed, server stopped");

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::dealers::create_dealer,
        crate::handlers::dealers::list_dealers,
        crate::handlers::dealers::get_dealer,
        crate::handlers::customers::list_customers,
        crate::handlers::customers::lookup_customer,
        crate::handlers::customers::create_customer,
        crate::handlers::packages::list_packages,
        crate::handlers::packages::create_package,
        crate::handlers::packages::update_package,
        crate::handlers::packages::assign_package,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::handlers::dealers::CreateDealerBody,
            crate::handlers::dealers::DealerResponse,
            crate::handlers::customers::CreateCustomerBody,
            crate::handlers::customers::CustomerResponse,
            crate::handlers::customers::CustomerLookupResponse,
            crate::handlers::packages::UpsertPackageBody,
            crate::handlers::packages::PackageResponse,
            crate::handlers::packages::UpdatePackageResponse,
            crate::handlers::packages::AssignPackageBody,
            crate::handlers::packages::AssignPackageResponse,
        )
    ),
    info(
        title = "Dealerhub API",
        description = "Dealer platform backend with per-dealer database isolation",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
