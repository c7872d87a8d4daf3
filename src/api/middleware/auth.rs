//! Static API key check applied to every non-health route

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::auth::ApiKeyVerifier;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects requests without a configured API key in `x-api-key`
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let presented = match extract_api_key(request.headers()) {
        Ok(key) => key,
        Err(e) => return e.into_response(),
    };

    if !state.api_keys.verify(presented.as_deref()) {
        match presented.as_deref() {
            Some(key) => warn!(
                key_fingerprint = %ApiKeyVerifier::fingerprint(key),
                path = %request.uri().path(),
                "Rejected unknown API key"
            ),
            None => debug!(path = %request.uri().path(), "Missing API key"),
        }

        return ApiError::unauthorized(format!(
            "Valid API key required in '{}' header",
            API_KEY_HEADER
        ))
        .into_response();
    }

    next.run(request).await
}

fn extract_api_key(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(API_KEY_HEADER) else {
        return Ok(None);
    };

    let key = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid X-API-Key header encoding"))?
        .trim();

    Ok((!key.is_empty()).then(|| key.to_string()))
}
