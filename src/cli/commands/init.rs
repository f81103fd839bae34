//! Implementation of the `dotoday init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::initialize_from_config;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::{CONFIG_DIR, CONFIG_FILE};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: Option<PathBuf>,
    pub database_path: Option<String>,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if let Some(ref path) = self.config_path {
            lines.push(format!("\nConfiguration written to {}", path.display()));
        }
        if let Some(ref db) = self.database_path {
            lines.push(format!("Database initialized at {}", db));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Create `.dotoday/`, a default config file and the migrated database.
///
/// `config` is the effective configuration; its database path decides where
/// the database is created. The config file written is always the defaults.
pub async fn execute(args: InitArgs, config: &Config, json_mode: bool) -> Result<()> {
    let config_dir = PathBuf::from(CONFIG_DIR);
    let config_path = PathBuf::from(CONFIG_FILE);

    if config_path.exists() && !args.force {
        let out = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to reinitialize.".to_string(),
            config_path: None,
            database_path: None,
        };
        output(&out, json_mode);
        return Ok(());
    }

    fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let yaml = serde_yaml::to_string(&Config::default()).context("Failed to render default config")?;
    fs::write(&config_path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let pool = initialize_from_config(&config.database)
        .await
        .context("Failed to initialize database")?;
    pool.close().await;

    let out = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        config_path: Some(config_path),
        database_path: Some(config.database.path.clone()),
    };
    output(&out, json_mode);
    Ok(())
}
