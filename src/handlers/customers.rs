//! # Customer Handlers
//!
//! Listings for elevated callers fan out across master and every tenant,
//! merge, filter, re-sort by recency and paginate in memory. Tenant-scoped
//! callers are routed into their own database by the context router.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::require_elevated;
use super::types::{ListQuery, PaginatedResponse};
use crate::auth::CallerIdentity;
use crate::error::ApiError;
use crate::models::customer;
use crate::repositories::customer::{CreateCustomerRequest, CustomerRepository};
use crate::server::AppState;
use crate::tenancy::{DataContext, FanOutSource, context, fanout};

/// Customer representation returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub dealer_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

impl From<customer::Model> for CustomerResponse {
    fn from(model: customer::Model) -> Self {
        Self {
            id: model.id,
            dealer_id: model.dealer_id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            created_at: model.created_at,
        }
    }
}

/// Request body for creating a customer
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerBody {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub account_manager_id: Option<Uuid>,
}

/// List customers across the caller's visible databases.
#[utoipa::path(
    get,
    path = "/customers",
    params(ListQuery),
    responses(
        (status = 200, description = "Merged customer listing", body = PaginatedResponse<CustomerResponse>)
    ),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<CustomerResponse>>, ApiError> {
    let ctx = context::route(caller.role, caller.dealer_id, query.dealer_id)?;

    let rows = match ctx {
        DataContext::Master => {
            // Master context means the global view: fan out everywhere.
            let outcome = state
                .fanout
                .run_everywhere(|_source, conn| async move {
                    CustomerRepository::new(&conn)
                        .list_customers()
                        .await
                        .map_err(anyhow::Error::from)
                })
                .await?;
            outcome.rows
        }
        DataContext::Tenant(dealer_id) => {
            let conn = state.registry.resolve(dealer_id).await?;
            CustomerRepository::new(&conn).list_customers().await?
        }
    };

    let rows = match query.search.as_deref() {
        Some(needle) if !needle.is_empty() => rows
            .into_iter()
            .filter(|c| {
                fanout::matches_search(&[&c.first_name, &c.last_name, &c.email], needle)
            })
            .collect(),
        _ => rows,
    };

    let (page, per_page) = (query.page(), query.per_page());
    let (page_rows, total) = fanout::sort_and_paginate(rows, |c| c.created_at, page, per_page);

    Ok(Json(PaginatedResponse {
        data: page_rows.into_iter().map(Into::into).collect(),
        page,
        per_page,
        total,
    }))
}

/// Query parameters for identity lookup
#[derive(Debug, Deserialize, IntoParams)]
pub struct LookupQuery {
    /// Email to locate across all partitions
    pub email: String,
}

/// Identity lookup result
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerLookupResponse {
    /// Partition the record was found in ("master" or "tenant:<dealer id>")
    pub source: String,
    pub customer: CustomerResponse,
}

/// Locate a customer record somewhere on the platform.
///
/// Master is probed first under the no-assigned-dealer condition; a hit
/// there ends the search. Otherwise tenants are scanned in order and the
/// first hit wins.
#[utoipa::path(
    get,
    path = "/customers/lookup",
    params(LookupQuery),
    responses(
        (status = 200, description = "Customer located", body = CustomerLookupResponse),
        (status = 404, description = "No partition holds this email")
    ),
    tag = "customers"
)]
pub async fn lookup_customer(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(query): Query<LookupQuery>,
) -> Result<Json<CustomerLookupResponse>, ApiError> {
    require_elevated(&caller)?;

    let email = query.email;
    let hit = state
        .fanout
        .find_first(|source, conn| {
            let email = email.clone();
            async move {
                CustomerRepository::new(&conn)
                    .find_by_email(&email, matches!(source, FanOutSource::Master))
                    .await
                    .map_err(anyhow::Error::from)
            }
        })
        .await?;

    let (source, found) = hit.ok_or_else(|| {
        ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Customer not found")
    })?;

    Ok(Json(CustomerLookupResponse {
        source: source.to_string(),
        customer: found.into(),
    }))
}

/// Create a customer in the caller's data context.
#[utoipa::path(
    post,
    path = "/customers",
    request_body = CreateCustomerBody,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 403, description = "Cross-tenant write denied")
    ),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(query): Query<ListQuery>,
    Json(body): Json<CreateCustomerBody>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    let ctx = context::route(caller.role, caller.dealer_id, query.dealer_id)?;

    let request = |dealer_id: Option<Uuid>| CreateCustomerRequest {
        dealer_id,
        first_name: body.first_name.clone(),
        last_name: body.last_name.clone(),
        email: body.email.clone(),
        phone: body.phone.clone(),
        account_manager_id: body.account_manager_id,
    };

    let created = match ctx {
        DataContext::Master => {
            // Master-side customers start dealer-less.
            CustomerRepository::new(&state.db)
                .create_customer(request(None))
                .await?
        }
        DataContext::Tenant(dealer_id) => {
            let conn = state.registry.resolve(dealer_id).await?;
            CustomerRepository::new(&conn)
                .create_customer(request(Some(dealer_id)))
                .await?
        }
    };

    Ok((StatusCode::CREATED, Json(created.into())))
}
