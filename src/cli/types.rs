//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{goal::GoalArgs, init::InitArgs, serve::ServeArgs};

#[derive(Parser, Debug)]
#[command(name = "dotoday")]
#[command(about = "DoToday - daily habit goals and streaks", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .dotoday/config.yaml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize DoToday configuration and database
    Init(InitArgs),

    /// Run the HTTP API server
    Serve(ServeArgs),

    /// Goal, completion and streak commands
    Goal(GoalArgs),
}
