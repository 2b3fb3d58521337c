//! Schema bootstrap and readiness gate
//!
//! Creates the `messages` table if it is missing and seeds one row into an
//! empty table. Runs once at startup, normally on its own task; failures are
//! logged and never stop the server.

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::connection::ConnectionManager;
use super::repos::DbError;

/// Content of the row inserted into an empty table.
pub const SEED_MESSAGE: &str = "Hello from kubecrud on Kubernetes!";

/// Outcome of the startup bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapStatus {
    Pending,
    Completed,
    Failed,
}

/// Create the table (idempotent) and seed it if empty.
///
/// Returns `true` when the seed row was inserted.
pub async fn ensure_schema(pool: &PgPool) -> Result<bool, DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id SERIAL PRIMARY KEY,
            content VARCHAR(255) NOT NULL,
            timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // single statement so two bootstraps cannot both seed
    let seeded = sqlx::query(
        r#"
        INSERT INTO messages (content)
        SELECT $1
        WHERE NOT EXISTS (SELECT 1 FROM messages)
        "#,
    )
    .bind(SEED_MESSAGE)
    .execute(pool)
    .await?
    .rows_affected()
        > 0;

    Ok(seeded)
}

/// Acquire a connection and bootstrap the schema, swallowing failures.
pub async fn run(manager: &ConnectionManager) -> BootstrapStatus {
    let pool = match manager.acquire().await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::warn!(error = %err, "could not initialize database: no connection");
            return BootstrapStatus::Failed;
        }
    };

    match ensure_schema(&pool).await {
        Ok(seeded) => {
            tracing::info!(seeded, "database table 'messages' initialized");
            BootstrapStatus::Completed
        }
        Err(err) => {
            tracing::error!(error = %err, "error initializing database");
            BootstrapStatus::Failed
        }
    }
}

/// Run the bootstrap on a background task and report into `readiness`.
pub fn spawn(manager: Arc<ConnectionManager>, readiness: Readiness) -> JoinHandle<BootstrapStatus> {
    tokio::spawn(async move {
        let status = run(&manager).await;
        readiness.mark(status);
        status
    })
}

/// Readiness gate fed by the bootstrap task.
#[derive(Clone)]
pub struct Readiness {
    tx: Arc<watch::Sender<BootstrapStatus>>,
}

impl Readiness {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BootstrapStatus::Pending);
        Self { tx: Arc::new(tx) }
    }

    pub fn status(&self) -> BootstrapStatus {
        *self.tx.borrow()
    }

    /// Bootstrap has finished, successfully or not.
    pub fn is_ready(&self) -> bool {
        self.status() != BootstrapStatus::Pending
    }

    pub fn mark(&self, status: BootstrapStatus) {
        self.tx.send_replace(status);
    }

    /// Wait until the bootstrap has finished.
    pub async fn wait(&self) -> BootstrapStatus {
        let mut rx = self.tx.subscribe();
        // the borrowed value must be copied out before `rx` is dropped
        let status = match rx.wait_for(|status| *status != BootstrapStatus::Pending).await {
            Ok(status) => *status,
            // sender lives in self, so this is unreachable in practice
            Err(_) => BootstrapStatus::Failed,
        };
        status
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}
