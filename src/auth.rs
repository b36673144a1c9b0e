//! # Caller identity extraction
//!
//! The API sits behind a gateway that authenticates callers and forwards
//! their identity as trusted headers; token mechanics live entirely
//! upstream. This module turns those headers into a typed
//! [`CallerIdentity`] that the context router consumes.

use axum::http::{HeaderMap, request::Parts};
use uuid::Uuid;

use crate::error::{ApiError, unauthorized, validation_error};
use crate::tenancy::Role;

/// Header carrying the caller's role name.
pub const ROLE_HEADER: &str = "x-dealerhub-role";
/// Header carrying the caller's own dealer id, when tenant-scoped.
pub const DEALER_HEADER: &str = "x-dealerhub-dealer";
/// Header carrying the caller's user id.
pub const USER_HEADER: &str = "x-dealerhub-user";

/// Identity of the authenticated caller as asserted by the gateway.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub role: Role,
    pub dealer_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl CallerIdentity {
    /// Parse the trusted gateway headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let role_value = headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized(Some("Missing caller role header")))?;

        let role = Role::parse(role_value)
            .ok_or_else(|| unauthorized(Some("Unknown caller role")))?;

        let dealer_id = parse_uuid_header(headers, DEALER_HEADER)?;
        let user_id = parse_uuid_header(headers, USER_HEADER)?;

        Ok(Self {
            role,
            dealer_id,
            user_id,
        })
    }
}

fn parse_uuid_header(headers: &HeaderMap, name: &str) -> Result<Option<Uuid>, ApiError> {
    let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };

    value.parse::<Uuid>().map(Some).map_err(|_| {
        validation_error(
            "Invalid identity header",
            serde_json::json!({ name: "must be a UUID" }),
        )
    })
}

impl<S> axum::extract::FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(role: Option<&str>, dealer: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(role) = role {
            map.insert(ROLE_HEADER, HeaderValue::from_str(role).unwrap());
        }
        if let Some(dealer) = dealer {
            map.insert(DEALER_HEADER, HeaderValue::from_str(dealer).unwrap());
        }
        map
    }

    #[test]
    fn parses_an_operator_identity() {
        let identity = CallerIdentity::from_headers(&headers(Some("operator"), None)).unwrap();
        assert_eq!(identity.role, Role::Operator);
        assert!(identity.dealer_id.is_none());
    }

    #[test]
    fn parses_a_dealer_identity_with_claim() {
        let dealer = Uuid::new_v4();
        let identity =
            CallerIdentity::from_headers(&headers(Some("dealer_staff"), Some(&dealer.to_string())))
                .unwrap();
        assert_eq!(identity.role, Role::DealerStaff);
        assert_eq!(identity.dealer_id, Some(dealer));
    }

    #[test]
    fn missing_role_is_unauthorized() {
        let err = CallerIdentity::from_headers(&headers(None, None)).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unknown_role_is_unauthorized() {
        let err = CallerIdentity::from_headers(&headers(Some("villain"), None)).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn malformed_dealer_header_is_a_validation_failure() {
        let err =
            CallerIdentity::from_headers(&headers(Some("dealer_staff"), Some("not-a-uuid")))
                .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
