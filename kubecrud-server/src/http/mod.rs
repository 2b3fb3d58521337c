//! HTTP server layer
//!
//! Axum server with:
//! - Server-rendered HTML pages for messages and cluster resources
//! - JSON error responses for cluster-info failures
//! - Request tracing
//! - Graceful shutdown

pub mod server;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod views;

pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use error::ClusterApiError;
