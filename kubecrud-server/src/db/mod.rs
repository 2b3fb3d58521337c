//! Database layer - connection lifecycle, bootstrap and repositories
//!
//! # Design Principles
//!
//! - One connection, owned by [`ConnectionManager`] and handed out per request
//! - Probe before use, reconnect with capped exponential backoff
//! - Every statement auto-commits; no explicit transactions

pub mod bootstrap;
pub mod connection;
pub mod repos;

pub use bootstrap::{BootstrapStatus, Readiness};
pub use connection::{
    ConnectionManager, ConnectionState, ConnectionUnavailable, Connector, PgConnector, RetryPolicy,
};
pub use repos::*;
