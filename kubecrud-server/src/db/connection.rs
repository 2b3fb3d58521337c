//! Database connection lifecycle
//!
//! A single shared connection handle, created lazily, probed before every
//! use and re-established with bounded exponential backoff.
//!
//! # States
//!
//! `Unset -> Connecting -> Connected -> Stale -> Connected`
//!
//! `Stale` covers the whole reconnect after a lost connection; a run of
//! failed attempts always ends in `Unset`.
//!
//! The probe/reconnect path runs under one async mutex, so two requests
//! that find the connection gone never open two connections. Callers that
//! queued behind a failed retry run get that run's error instead of
//! starting another one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::DatabaseConfig;

/// Default number of connect attempts before giving up.
const DEFAULT_MAX_ATTEMPTS: u32 = 15;

/// Backoff policy for connect attempts.
///
/// After failed attempt `n` (counting from 1) the manager waits
/// `min(base_delay * 2^n, max_delay)` before attempt `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Lifecycle of the cached connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Unset,
    Connecting,
    Connected,
    Stale,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unset => "unset",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Stale => "stale",
        };
        f.write_str(s)
    }
}

/// Returned when every connect attempt failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("database unavailable after {attempts} attempts: {last_error}")]
pub struct ConnectionUnavailable {
    pub attempts: u32,
    pub last_error: String,
}

/// Opens and probes connections.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Cloneable handle given to callers.
    type Connection: Clone + Send + Sync + 'static;

    async fn connect(&self) -> Result<Self::Connection, sqlx::Error>;

    /// Trivial round trip; any error means the connection is gone.
    async fn probe(&self, conn: &Self::Connection) -> Result<(), sqlx::Error>;

    /// Release a connection that is being discarded.
    async fn close(&self, _conn: Self::Connection) {}

    /// Human readable endpoint for log lines (never includes credentials).
    fn endpoint(&self) -> String;
}

/// Postgres connector.
///
/// The handle is a `PgPool` capped at one connection: it is cheap to clone
/// into handlers and every statement runs outside an explicit transaction,
/// so each one commits on its own.
#[derive(Debug, Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
    connect_timeout: Duration,
}

impl PgConnector {
    pub fn new(config: &DatabaseConfig) -> Self {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        Self::from_options(options, config.connect_timeout)
    }

    pub fn from_options(options: PgConnectOptions, connect_timeout: Duration) -> Self {
        Self {
            options,
            connect_timeout,
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Connection = PgPool;

    async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .acquire_timeout(self.connect_timeout)
            // liveness is the manager's job
            .test_before_acquire(false)
            .connect_with(self.options.clone())
            .await
    }

    async fn probe(&self, conn: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(conn).await.map(|_| ())
    }

    async fn close(&self, conn: PgPool) {
        conn.close().await;
    }

    fn endpoint(&self) -> String {
        format!(
            "{}:{}/{}",
            self.options.get_host(),
            self.options.get_port(),
            self.options.get_database().unwrap_or_default()
        )
    }
}

struct Slot<T> {
    conn: Option<T>,
    /// Outcome of the most recent exhausted retry run
    last_failure: Option<ConnectionUnavailable>,
}

/// Owner of the process-wide database connection.
pub struct ConnectionManager<C: Connector = PgConnector> {
    connector: C,
    policy: RetryPolicy,
    slot: Mutex<Slot<C::Connection>>,
    /// Bumped, under the slot lock, each time a retry run is exhausted
    failed_runs: AtomicU64,
    state: RwLock<ConnectionState>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, policy: RetryPolicy) -> Self {
        Self {
            connector,
            policy,
            slot: Mutex::new(Slot {
                conn: None,
                last_failure: None,
            }),
            failed_runs: AtomicU64::new(0),
            state: RwLock::new(ConnectionState::Unset),
        }
    }

    /// Current lifecycle state. Never connects.
    pub fn state(&self) -> ConnectionState {
        *self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    /// Hand out a live connection, reconnecting if needed.
    ///
    /// A cached connection is probed first; if the probe fails it is
    /// discarded and a fresh one is opened with retries. Exhausting the
    /// retry budget is reported as [`ConnectionUnavailable`], both to the
    /// caller that ran the retries and to every caller waiting behind it.
    pub async fn acquire(&self) -> Result<C::Connection, ConnectionUnavailable> {
        let seen_failures = self.failed_runs.load(Ordering::Acquire);
        let mut slot = self.slot.lock().await;

        if slot.conn.is_none() && self.failed_runs.load(Ordering::Acquire) != seen_failures {
            if let Some(err) = slot.last_failure.clone() {
                return Err(err);
            }
        }

        if let Some(conn) = slot.conn.as_ref() {
            match self.connector.probe(conn).await {
                Ok(()) => return Ok(conn.clone()),
                Err(err) => {
                    warn!(error = %err, "existing database connection lost, reconnecting");
                    self.set_state(ConnectionState::Stale);
                    if let Some(stale) = slot.conn.take() {
                        self.connector.close(stale).await;
                    }
                }
            }
        }

        match self.connect_with_retry().await {
            Ok(conn) => {
                slot.conn = Some(conn.clone());
                slot.last_failure = None;
                Ok(conn)
            }
            Err(err) => {
                slot.last_failure = Some(err.clone());
                self.failed_runs.fetch_add(1, Ordering::Release);
                Err(err)
            }
        }
    }

    async fn connect_with_retry(&self) -> Result<C::Connection, ConnectionUnavailable> {
        // a reconnect after a lost connection stays visible as stale
        if self.state() != ConnectionState::Stale {
            self.set_state(ConnectionState::Connecting);
        }

        let max_attempts = self.policy.max_attempts;
        let endpoint = self.connector.endpoint();
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=max_attempts {
            match self.connector.connect().await {
                Ok(conn) => {
                    info!(attempt, endpoint = %endpoint, "connected to database");
                    self.set_state(ConnectionState::Connected);
                    return Ok(conn);
                }
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts,
                        endpoint = %endpoint,
                        error = %err,
                        "could not connect to database"
                    );
                    last_error = err.to_string();
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        error!(attempts = max_attempts, endpoint = %endpoint, "giving up on database connection");
        self.set_state(ConnectionState::Unset);
        Err(ConnectionUnavailable {
            attempts: max_attempts,
            last_error,
        })
    }

    /// Close the cached connection, if any.
    pub async fn close(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(conn) = slot.conn.take() {
            self.connector.close(conn).await;
            info!("database connection closed");
        }
        self.set_state(ConnectionState::Unset);
    }
}
