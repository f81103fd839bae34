//! DoToday - daily habit goals and streaks
//!
//! DoToday records day-by-day completions of habit goals and derives streaks
//! and completion graphs from them.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and the repository, ledger
//!   and clock ports
//! - **Adapters** (`adapters`): SQLite persistence and the HTTP API
//! - **Service Layer** (`services`): Streak calculation, graph series and the
//!   goal lifecycle
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dotoday::adapters::sqlite::{initialize_database, SqliteCompletionLedger, SqliteGoalRepository};
//! use dotoday::domain::ports::SystemClock;
//! use dotoday::services::GoalService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = initialize_database("sqlite:.dotoday/dotoday.db", None).await?;
//!     let service = GoalService::new(
//!         Arc::new(SqliteGoalRepository::new(pool.clone())),
//!         Arc::new(SqliteCompletionLedger::new(pool)),
//!         Arc::new(SystemClock::utc()),
//!     );
//!     let receipt = service.mark_complete(goal_id, "alice").await?;
//!     println!("streak: {}", receipt.current_streak);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult, ErrorKind};
pub use domain::models::{
    Completion, Config, Goal, GoalState, GraphPoint, StreakSummary, UserStats,
};
pub use domain::ports::{Clock, CompletionLedger, FixedClock, GoalRepository, SystemClock};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{GoalPolicy, GoalService, SeriesBuilder, StreakCalculator};
