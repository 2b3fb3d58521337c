//! HTTP server command
//!
//! Resolves configuration, builds the cluster client, starts the schema
//! bootstrap and runs the server until shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use kubecrud_server::db::bootstrap;
use kubecrud_server::k8s::init_cluster_client;
use kubecrud_server::{run_server, AppConfig, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Finish the database bootstrap before accepting requests
    #[arg(long, env = "BOOTSTRAP_BLOCKING")]
    pub wait_for_bootstrap: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = AppConfig::from_env();
    tracing::info!(
        db_host = %config.database.host,
        db_name = %config.database.database,
        namespace = %config.namespace,
        "Starting kubecrud server on {}",
        args.bind
    );

    // cluster-info is disabled, not fatal, when this yields None
    let cluster = init_cluster_client().await;
    let state = AppState::new(&config, cluster);

    let bootstrap_task = bootstrap::spawn(state.db.clone(), state.readiness.clone());
    if args.wait_for_bootstrap {
        let status = state.readiness.wait().await;
        tracing::info!(?status, "Bootstrap finished before serving");
    }

    let server_config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // Run server (blocks until shutdown)
    run_server(state, server_config)
        .await
        .context("Server error")?;

    bootstrap_task.abort();
    Ok(())
}
