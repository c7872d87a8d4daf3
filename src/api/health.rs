//! Liveness and readiness probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;

use super::state::AppState;

/// Lookup target for the readiness probe; the `.invalid` TLD never registers
const READINESS_PROBE_EMAIL: &str = "readiness-probe@health.invalid";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ProbeStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<ComponentCheck>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct ComponentCheck {
    pub component: &'static str,
    pub status: ProbeStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl HealthResponse {
    fn new(checks: Vec<ComponentCheck>) -> Self {
        let status = if checks.iter().all(|c| c.status == ProbeStatus::Up) {
            ProbeStatus::Up
        } else {
            ProbeStatus::Down
        };

        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.status {
            ProbeStatus::Up => StatusCode::OK,
            ProbeStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse::new(Vec::new()))
}

/// 503 until the user store answers
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse::new(vec![check_user_store(&state).await]);
    (response.status_code(), Json(response))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_user_store(state: &AppState) -> ComponentCheck {
    let start = Instant::now();
    let result = state.user_service.get_by_email(READINESS_PROBE_EMAIL).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => ComponentCheck {
            component: "user_store",
            status: ProbeStatus::Up,
            latency_ms,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "User store readiness check failed");
            ComponentCheck {
                component: "user_store",
                status: ProbeStatus::Down,
                latency_ms,
                error: Some("storage unavailable"),
            }
        }
    }
}
