//! # Dealer Handlers
//!
//! Dealer registration runs the full provisioning saga: the master row is
//! inserted first, then the tenant database is created and initialized. A
//! provisioning failure rolls the master row back and surfaces one error,
//! so no half-created dealer is ever visible.

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
use crate::models::dealer;
use crate::repositories::dealer::{CreateDealerRequest, DealerRepository};
use crate::server::AppState;

/// Request body for registering a dealer
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDealerBody {
    pub legal_name: String,
    pub trading_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    /// Credential hash issued by the external auth service
    pub password_hash: Option<String>,
}

/// Dealer representation returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct DealerResponse {
    pub id: Uuid,
    pub legal_name: String,
    pub trading_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub status: String,
    /// Physical tenant database name, present once provisioned
    pub database_name: Option<String>,
    pub provisioned_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

impl From<dealer::Model> for DealerResponse {
    fn from(model: dealer::Model) -> Self {
        Self {
            id: model.id,
            legal_name: model.legal_name,
            trading_name: model.trading_name,
            email: model.email,
            phone: model.phone,
            address_line: model.address_line,
            city: model.city,
            status: model.status,
            database_name: model.database_name,
            provisioned_at: model.provisioned_at,
            created_at: model.created_at,
        }
    }
}

/// Register a dealer and provision its isolated database.
#[utoipa::path(
    post,
    path = "/dealers",
    request_body = CreateDealerBody,
    responses(
        (status = 201, description = "Dealer registered and provisioned", body = DealerResponse),
        (status = 409, description = "Email or database name already taken"),
        (status = 500, description = "Provisioning failed; dealer rolled back")
    ),
    tag = "dealers"
)]
pub async fn create_dealer(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(body): Json<CreateDealerBody>,
) -> Result<(StatusCode, Json<DealerResponse>), ApiError> {
    require_elevated(&caller)?;

    let repo = DealerRepository::new(&state.db);
    let new_dealer = repo
        .create_dealer(CreateDealerRequest {
            legal_name: body.legal_name,
            trading_name: body.trading_name,
            email: body.email,
            phone: body.phone,
            address_line: body.address_line,
            city: body.city,
            password_hash: body.password_hash,
        })
        .await?;
    let dealer_id = new_dealer.id;

    state.provisioner.provision(new_dealer).await?;

    // Re-read the stamped row so the response carries the connection fields.
    let stamped = DealerRepository::new(&state.db)
        .get_dealer_by_id(dealer_id)
        .await?
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "Dealer disappeared after provisioning",
            )
        })?;

    Ok((StatusCode::CREATED, Json(stamped.into())))
}

/// List all dealers.
#[utoipa::path(
    get,
    path = "/dealers",
    responses(
        (status = 200, description = "Registered dealers", body = [DealerResponse])
    ),
    tag = "dealers"
)]
pub async fn list_dealers(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<DealerResponse>>, ApiError> {
    require_elevated(&caller)?;

    let dealers = DealerRepository::new(&state.db).list_dealers().await?;
    Ok(Json(dealers.into_iter().map(Into::into).collect()))
}

/// Fetch one dealer.
#[utoipa::path(
    get,
    path = "/dealers/{id}",
    params(("id" = Uuid, Path, description = "Dealer id")),
    responses(
        (status = 200, description = "Dealer", body = DealerResponse),
        (status = 404, description = "Dealer not found")
    ),
    tag = "dealers"
)]
pub async fn get_dealer(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<DealerResponse>, ApiError> {
    require_elevated(&caller)?;

    let dealer = DealerRepository::new(&state.db)
        .get_dealer_by_id(id)
        .await?
        .ok_or_else(|| {
            ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Dealer not found")
        })?;

    Ok(Json(dealer.into()))
}
