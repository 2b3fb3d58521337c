//! Liveness and readiness endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::db::{BootstrapStatus, ConnectionState};
use crate::http::server::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: ConnectionState,
}

/// Readiness response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub bootstrap: BootstrapStatus,
}

/// GET /health - never touches the database
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database: state.db.state(),
    })
}

/// GET /ready - 503 until the schema bootstrap has finished
async fn ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadyResponse>) {
    let bootstrap = state.readiness.status();
    if state.readiness.is_ready() {
        (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready",
                bootstrap,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "starting",
                bootstrap,
            }),
        )
    }
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::unreachable_state;

    #[tokio::test]
    async fn health_reports_unset_connection() {
        let state = Arc::new(unreachable_state(None));
        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.database, ConnectionState::Unset);
    }

    #[tokio::test]
    async fn ready_follows_bootstrap() {
        let state = Arc::new(unreachable_state(None));

        let (status, Json(body)) = ready(State(state.clone())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.bootstrap, BootstrapStatus::Pending);

        state.readiness.mark(BootstrapStatus::Completed);

        let (status, Json(body)) = ready(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ready");
    }
}
