//! Liveness and readiness endpoints.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Liveness check. Does not touch the store.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"ok","version":"0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Readiness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service should receive traffic
    pub ready: bool,
    /// Store health: `healthy`, `degraded` or `unhealthy`
    pub store: String,
    /// Detail when the store is not healthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness check.
///
/// 200 only when the store is reachable and its berth catalog is seeded,
/// 503 otherwise.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let health = state.engine.health_check().await;
    let ready = health.status.is_healthy();

    if !ready {
        tracing::warn!(
            status = health.status.as_str(),
            message = health.message.as_deref().unwrap_or(""),
            "Readiness check failed"
        );
    }

    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(ReadinessResponse {
            ready,
            store: health.status.as_str().to_string(),
            message: health.message,
        }),
    )
}
