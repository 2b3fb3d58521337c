//! One-shot database bootstrap, e.g. for an init container

use anyhow::{bail, Result};
use clap::Parser;

use kubecrud_server::db::{bootstrap, BootstrapStatus, ConnectionManager, PgConnector};
use kubecrud_server::AppConfig;

/// Arguments for the init-db command
#[derive(Parser, Debug)]
pub struct InitDbArgs {
    /// Connect attempts before giving up (overrides DB_CONNECT_ATTEMPTS)
    #[arg(long)]
    pub attempts: Option<u32>,
}

/// Create the schema and seed it, failing if the database never answers
pub async fn run_init_db(args: InitDbArgs) -> Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(attempts) = args.attempts {
        config.retry.max_attempts = attempts.max(1);
    }

    let manager = ConnectionManager::new(PgConnector::new(&config.database), config.retry);
    let status = bootstrap::run(&manager).await;
    manager.close().await;

    match status {
        BootstrapStatus::Completed => {
            tracing::info!("Database ready");
            Ok(())
        }
        _ => bail!(
            "database bootstrap failed for {}:{}/{}",
            config.database.host,
            config.database.port,
            config.database.database
        ),
    }
}
