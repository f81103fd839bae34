//! Implementation of the `dotoday serve` command.

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::http::{GoalsHttpConfig, GoalsHttpServer};
use crate::cli::commands::build_service;
use crate::domain::models::Config;
use crate::infrastructure::logging::prune_expired_logs;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, config: &Config) -> Result<()> {
    if let Some(ref log_dir) = config.logging.log_dir {
        match prune_expired_logs(log_dir, config.logging.retention_days).await {
            Ok(removed) if removed > 0 => tracing::info!(removed, "pruned expired log files"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "failed to prune log files"),
        }
    }

    let (_pool, service) = build_service(config).await?;

    let mut http_config = GoalsHttpConfig::from(&config.server);
    if let Some(host) = args.host {
        http_config.host = host;
    }
    if let Some(port) = args.port {
        http_config.port = port;
    }

    GoalsHttpServer::new(service, http_config)
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("HTTP server failed")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
