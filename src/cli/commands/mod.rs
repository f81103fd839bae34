//! CLI command implementations.

pub mod goal;
pub mod init;
pub mod serve;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

use crate::adapters::sqlite::{initialize_from_config, SqliteCompletionLedger, SqliteGoalRepository};
use crate::domain::models::Config;
use crate::domain::ports::{Clock, SystemClock};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{GoalPolicy, GoalService};

pub type SqliteGoalService = GoalService<SqliteGoalRepository, SqliteCompletionLedger>;

/// Load configuration from `path`, or from the project defaults when unset.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => ConfigLoader::load_from_file(p),
        None => ConfigLoader::load(),
    }
}

/// Reference clock for "today", in the configured fixed offset.
pub fn clock_from_config(config: &Config) -> Result<Arc<dyn Clock>> {
    let clock = SystemClock::with_offset_minutes(config.streaks.utc_offset_minutes)
        .with_context(|| {
            format!(
                "Invalid utc_offset_minutes: {}",
                config.streaks.utc_offset_minutes
            )
        })?;
    Ok(Arc::new(clock))
}

/// Open the database and wire the goal service from configuration.
pub async fn build_service(config: &Config) -> Result<(SqlitePool, SqliteGoalService)> {
    let pool = initialize_from_config(&config.database)
        .await
        .context("Failed to open database. Run 'dotoday init' first.")?;

    let service = GoalService::new(
        Arc::new(SqliteGoalRepository::new(pool.clone())),
        Arc::new(SqliteCompletionLedger::new(pool.clone())),
        clock_from_config(config)?,
    )
    .with_policy(GoalPolicy::from(config));

    Ok((pool, service))
}
