//! Cross-component tests for the tenancy data plane using SQLite fixtures:
//! a migrated in-memory master plus file-backed tenant databases built from
//! the real derived schema.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use uuid::Uuid;

use dealerhub::auth::CallerIdentity;
use dealerhub::config::{AppConfig, SchemaConfig};
use dealerhub::handlers::customers::{self, CreateCustomerBody};
use dealerhub::handlers::types::ListQuery;
use dealerhub::models::{customer, tenant_database};
use dealerhub::schema::{SchemaDeriver, ddl};
use dealerhub::server::AppState;
use dealerhub::tenancy::Role;
use migration::MigratorTrait;

use axum::extract::{Query, State};
use axum::Json;

async fn master_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn create_tenant_db(path: &std::path::Path) -> DatabaseConnection {
    let source = std::fs::read_to_string("schema/master.schema").unwrap();
    let derived = SchemaDeriver::new(SchemaConfig::default().excluded_entities)
        .derive(&source)
        .unwrap();
    let db = Database::connect(format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .unwrap();
    ddl::apply(&db, &derived).await.unwrap();
    db
}

async fn register_tenant(master: &DatabaseConnection, dealer_id: Uuid, db_url: &str) {
    use dealerhub::models::dealer;

    // The mapping row references a dealer, so seed one first.
    dealer::ActiveModel {
        id: Set(dealer_id),
        legal_name: Set("Test Dealer".to_string()),
        trading_name: Set(None),
        email: Set(format!("{dealer_id}@dealer.test")),
        phone: Set(None),
        address_line: Set(None),
        city: Set(None),
        password_hash: Set(None),
        status: Set(dealer::STATUS_ACTIVE.to_string()),
        database_name: Set(None),
        db_url: Set(None),
        provisioned_at: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    }
    .insert(master)
    .await
    .unwrap();

    let mapping = tenant_database::ActiveModel {
        id: Set(Uuid::new_v4()),
        dealer_id: Set(dealer_id),
        database_name: Set(format!("dealer_{}", dealer_id.simple())),
        db_url: Set(db_url.to_string()),
        status: Set(tenant_database::STATUS_ACTIVE.to_string()),
        created_at: Set(Utc::now().into()),
    };
    mapping.insert(master).await.unwrap();
}

async fn insert_customer(
    db: &DatabaseConnection,
    dealer_id: Option<Uuid>,
    email: &str,
    created_hour: u32,
) {
    let stamp = Utc.with_ymd_and_hms(2026, 4, 1, created_hour, 0, 0).unwrap();
    customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        dealer_id: Set(dealer_id),
        first_name: Set("Casey".to_string()),
        last_name: Set("Rider".to_string()),
        email: Set(email.to_string()),
        phone: Set(None),
        account_manager_id: Set(None),
        created_at: Set(stamp.into()),
        updated_at: Set(stamp.into()),
    }
    .insert(db)
    .await
    .unwrap();
}

fn operator() -> CallerIdentity {
    CallerIdentity {
        role: Role::Operator,
        dealer_id: None,
        user_id: None,
    }
}

fn dealer_staff(dealer_id: Uuid) -> CallerIdentity {
    CallerIdentity {
        role: Role::DealerStaff,
        dealer_id: Some(dealer_id),
        user_id: None,
    }
}

fn list_query(dealer_id: Option<Uuid>, search: Option<&str>) -> ListQuery {
    ListQuery {
        search: search.map(|s| s.to_string()),
        page: None,
        per_page: None,
        dealer_id,
    }
}

#[tokio::test]
async fn operator_listing_merges_master_and_all_tenants() {
    let dir = tempfile::tempdir().unwrap();
    let master = master_db().await;

    insert_customer(&master, None, "hq@example.test", 1).await;

    let dealer_a = Uuid::new_v4();
    let path_a = dir.path().join("a.db");
    let tenant_a = create_tenant_db(&path_a).await;
    insert_customer(&tenant_a, Some(dealer_a), "a@example.test", 3).await;
    tenant_a.close().await.unwrap();
    register_tenant(&master, dealer_a, &format!("sqlite://{}", path_a.display())).await;

    let dealer_b = Uuid::new_v4();
    let path_b = dir.path().join("b.db");
    let tenant_b = create_tenant_db(&path_b).await;
    insert_customer(&tenant_b, Some(dealer_b), "b@example.test", 2).await;
    tenant_b.close().await.unwrap();
    register_tenant(&master, dealer_b, &format!("sqlite://{}", path_b.display())).await;

    let state = AppState::build(Arc::new(AppConfig::default()), master);

    let Json(page) = customers::list_customers(
        State(state),
        operator(),
        Query(list_query(None, None)),
    )
    .await
    .unwrap();

    assert_eq!(page.total, 3);
    // Re-sorted by recency across sources.
    assert_eq!(page.data[0].email, "a@example.test");
    assert_eq!(page.data[1].email, "b@example.test");
    assert_eq!(page.data[2].email, "hq@example.test");
}

#[tokio::test]
async fn operator_listing_survives_an_unreachable_tenant() {
    let dir = tempfile::tempdir().unwrap();
    let master = master_db().await;

    insert_customer(&master, None, "hq@example.test", 1).await;

    let dealer_a = Uuid::new_v4();
    let path_a = dir.path().join("a.db");
    let tenant_a = create_tenant_db(&path_a).await;
    insert_customer(&tenant_a, Some(dealer_a), "a@example.test", 2).await;
    tenant_a.close().await.unwrap();
    register_tenant(&master, dealer_a, &format!("sqlite://{}", path_a.display())).await;

    // This tenant cannot be opened; its rows simply don't show up.
    let dealer_down = Uuid::new_v4();
    register_tenant(&master, dealer_down, "sqlite:///nonexistent/down.db?mode=ro").await;

    let state = AppState::build(Arc::new(AppConfig::default()), master);

    let Json(page) = customers::list_customers(
        State(state),
        operator(),
        Query(list_query(None, None)),
    )
    .await
    .unwrap();

    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn search_filter_applies_after_the_merge() {
    let dir = tempfile::tempdir().unwrap();
    let master = master_db().await;

    insert_customer(&master, None, "findme@example.test", 1).await;

    let dealer_a = Uuid::new_v4();
    let path_a = dir.path().join("a.db");
    let tenant_a = create_tenant_db(&path_a).await;
    insert_customer(&tenant_a, Some(dealer_a), "other@example.test", 2).await;
    insert_customer(&tenant_a, Some(dealer_a), "findme-too@example.test", 3).await;
    tenant_a.close().await.unwrap();
    register_tenant(&master, dealer_a, &format!("sqlite://{}", path_a.display())).await;

    let state = AppState::build(Arc::new(AppConfig::default()), master);

    let Json(page) = customers::list_customers(
        State(state),
        operator(),
        Query(list_query(None, Some("FINDME"))),
    )
    .await
    .unwrap();

    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn dealer_staff_sees_only_their_own_tenant() {
    let dir = tempfile::tempdir().unwrap();
    let master = master_db().await;

    insert_customer(&master, None, "hq@example.test", 1).await;

    let dealer_a = Uuid::new_v4();
    let path_a = dir.path().join("a.db");
    let tenant_a = create_tenant_db(&path_a).await;
    insert_customer(&tenant_a, Some(dealer_a), "a@example.test", 2).await;
    tenant_a.close().await.unwrap();
    register_tenant(&master, dealer_a, &format!("sqlite://{}", path_a.display())).await;

    let state = AppState::build(Arc::new(AppConfig::default()), master);

    let Json(page) = customers::list_customers(
        State(state),
        dealer_staff(dealer_a),
        Query(list_query(None, None)),
    )
    .await
    .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].email, "a@example.test");
}

#[tokio::test]
async fn cross_tenant_listing_is_denied() {
    let master = master_db().await;
    let state = AppState::build(Arc::new(AppConfig::default()), master);

    let own = Uuid::new_v4();
    let other = Uuid::new_v4();

    let result = customers::list_customers(
        State(state),
        dealer_staff(own),
        Query(list_query(Some(other), None)),
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tenant_write_lands_in_the_tenant_database() {
    let dir = tempfile::tempdir().unwrap();
    let master = master_db().await;

    let dealer_a = Uuid::new_v4();
    let path_a = dir.path().join("a.db");
    create_tenant_db(&path_a).await.close().await.unwrap();
    register_tenant(&master, dealer_a, &format!("sqlite://{}", path_a.display())).await;

    let state = AppState::build(Arc::new(AppConfig::default()), master.clone());

    let body = CreateCustomerBody {
        first_name: "Robin".to_string(),
        last_name: "Banks".to_string(),
        email: "robin@example.test".to_string(),
        phone: None,
        account_manager_id: None,
    };

    let (status, Json(created)) = customers::create_customer(
        State(state),
        dealer_staff(dealer_a),
        Query(list_query(None, None)),
        Json(body),
    )
    .await
    .unwrap();

    assert_eq!(status, axum::http::StatusCode::CREATED);
    assert_eq!(created.dealer_id, Some(dealer_a));

    // The row exists in the tenant file, not in master.
    use sea_orm::EntityTrait;
    let tenant = Database::connect(format!("sqlite://{}", path_a.display()))
        .await
        .unwrap();
    assert_eq!(customer::Entity::find().all(&tenant).await.unwrap().len(), 1);
    assert_eq!(customer::Entity::find().all(&master).await.unwrap().len(), 0);
}

#[tokio::test]
async fn identity_lookup_prefers_master_then_first_tenant() {
    let dir = tempfile::tempdir().unwrap();
    let master = master_db().await;

    insert_customer(&master, None, "inmaster@example.test", 1).await;

    let dealer_a = Uuid::new_v4();
    let path_a = dir.path().join("a.db");
    let tenant_a = create_tenant_db(&path_a).await;
    insert_customer(&tenant_a, Some(dealer_a), "intenant@example.test", 2).await;
    tenant_a.close().await.unwrap();
    register_tenant(&master, dealer_a, &format!("sqlite://{}", path_a.display())).await;

    let state = AppState::build(Arc::new(AppConfig::default()), master);

    let Json(found) = customers::lookup_customer(
        State(state.clone()),
        operator(),
        Query(customers::LookupQuery {
            email: "inmaster@example.test".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(found.source, "master");

    let Json(found) = customers::lookup_customer(
        State(state.clone()),
        operator(),
        Query(customers::LookupQuery {
            email: "intenant@example.test".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(found.source, format!("tenant:{dealer_a}"));

    let missing = customers::lookup_customer(
        State(state),
        operator(),
        Query(customers::LookupQuery {
            email: "nowhere@example.test".to_string(),
        }),
    )
    .await;
    assert_eq!(
        missing.unwrap_err().status,
        axum::http::StatusCode::NOT_FOUND
    );
}
