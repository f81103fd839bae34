//! Common test utilities for integration tests
//!
//! Provides shared fixtures used across multiple integration test files.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use dotoday::adapters::sqlite::{create_migrated_test_pool, SqliteCompletionLedger, SqliteGoalRepository};
use dotoday::domain::ports::FixedClock;
use dotoday::services::{GoalPolicy, GoalService};
use sqlx::SqlitePool;

pub type TestService = GoalService<SqliteGoalRepository, SqliteCompletionLedger>;

/// A fixed "today" used across tests.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

pub fn days_ago(n: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(n)).expect("date in range")
}

/// Goal service over a fresh in-memory database with a pinned clock.
pub struct TestContext {
    pub pool: SqlitePool,
    pub clock: Arc<FixedClock>,
    pub ledger: Arc<SqliteCompletionLedger>,
    pub service: TestService,
}

pub async fn setup(policy: GoalPolicy) -> TestContext {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test pool");
    let clock = Arc::new(FixedClock::new(today()));
    let ledger = Arc::new(SqliteCompletionLedger::new(pool.clone()));
    let service = GoalService::new(
        Arc::new(SqliteGoalRepository::new(pool.clone())),
        ledger.clone(),
        clock.clone(),
    )
    .with_policy(policy);

    TestContext {
        pool,
        clock,
        ledger,
        service,
    }
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
