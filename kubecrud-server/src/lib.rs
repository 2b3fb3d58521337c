//! kubecrud-server: message CRUD over Postgres plus a read-only view of the
//! pods and deployments in the local namespace.
//!
//! The database connection is owned by [`db::ConnectionManager`], which
//! probes it before use and reconnects with capped exponential backoff.
//! Cluster access goes through the [`k8s::ClusterClient`] trait.

pub mod config;
pub mod db;
pub mod http;
pub mod k8s;
pub mod models;

pub use config::{AppConfig, DatabaseConfig};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
