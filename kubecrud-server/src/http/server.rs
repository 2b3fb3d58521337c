//! Axum server setup
//!
//! Server skeleton with:
//! - Request tracing
//! - Optional permissive CORS
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::AppConfig;
use crate::db::{ConnectionManager, PgConnector, Readiness};
use crate::k8s::ClusterClient;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:5000)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = same-origin only)
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            cors_permissive: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<ConnectionManager>,
    /// `None` when no cluster configuration could be loaded
    pub cluster: Option<Arc<dyn ClusterClient>>,
    pub namespace: String,
    pub readiness: Readiness,
}

impl AppState {
    /// State with a fresh connection manager for `config`.
    pub fn new(config: &AppConfig, cluster: Option<Arc<dyn ClusterClient>>) -> Self {
        let connector = PgConnector::new(&config.database);
        Self {
            db: Arc::new(ConnectionManager::new(connector, config.retry)),
            cluster,
            namespace: config.namespace.clone(),
            readiness: Readiness::new(),
        }
    }
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .merge(routes::health::router())
        .merge(routes::messages::router())
        .merge(routes::cluster::router())
        .layer(TraceLayer::new_for_http());

    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        app = app.layer(CorsLayer::permissive());
    }

    app.with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(&AppConfig::from_env(), None);
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(state);
    let app = build_router(state.clone(), &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::http::test_support::{unreachable_state, FakeCluster};

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = Arc::new(unreachable_state(None));
        let app = build_router(state, &ServerConfig::default());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_all_routes_mounted() {
        let state = Arc::new(unreachable_state(Some(Arc::new(FakeCluster::healthy()))));
        let app = build_router(state, &ServerConfig { cors_permissive: true, ..Default::default() });

        for uri in ["/health", "/ready", "/k8s-info", "/"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_ne!(response.status(), StatusCode::NOT_FOUND, "{uri} not mounted");
        }
    }

    #[test]
    fn default_binds_all_interfaces() {
        assert_eq!(ServerConfig::default().bind_addr.to_string(), "0.0.0.0:5000");
    }
}
