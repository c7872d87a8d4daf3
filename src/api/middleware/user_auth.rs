//! User authentication extractor using JWT bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

/// Extractor that requires a valid session token
///
/// The token comes from `Authorization: Bearer <jwt>`; the user it names
/// must still exist and be active.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers)?;

        let claims = state
            .jwt_service
            .validate(&token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        let user = state
            .user_service
            .get(claims.user_id())
            .await
            .map_err(|e| match e {
                crate::domain::DomainError::InvalidId { .. } => {
                    ApiError::unauthorized("Invalid or expired token")
                }
                other => ApiError::from(other),
            })?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

        if !user.is_active() {
            return Err(ApiError::forbidden("User account is suspended"));
        }

        debug!(user_id = %user.id(), "Request authenticated");
        Ok(RequireUser(user))
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_jwt_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide a token via 'Authorization: Bearer <token>'",
    ))
}
