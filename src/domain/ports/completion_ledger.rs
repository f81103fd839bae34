//! Completion ledger port.
//!
//! The ledger is the source of truth for streak math. Rows are unique per
//! `(goal, date)` and only ever grow: recording a day that already has a row
//! adds to its count.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Completion, DailySeries};

#[async_trait]
pub trait CompletionLedger: Send + Sync {
    /// Upsert the completion for `(goal_id, date)`.
    ///
    /// A new row starts at `increment_by`; an existing row has its count
    /// increased by `increment_by`. Not idempotent in count. Returns the row
    /// as stored after the write.
    async fn record_completion(
        &self,
        goal_id: Uuid,
        date: NaiveDate,
        increment_by: u32,
    ) -> DomainResult<Completion>;

    /// True iff a row exists for exactly that day.
    async fn exists_for_date(&self, goal_id: Uuid, date: NaiveDate) -> DomainResult<bool>;

    /// Full history, newest date first.
    async fn list_by_goal(&self, goal_id: Uuid) -> DomainResult<Vec<Completion>>;

    /// Distinct completion dates, newest first.
    async fn completion_dates(&self, goal_id: Uuid) -> DomainResult<Vec<NaiveDate>>;

    /// Stored counts for days in `[from, to]`.
    async fn counts_between(
        &self,
        goal_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<BTreeMap<NaiveDate, u32>>;

    /// Sum of stored counts over the whole history.
    async fn total_count(&self, goal_id: Uuid) -> DomainResult<u64>;

    /// One entry per day in `[today - window_days, today]`, oldest first.
    async fn daily_series(
        &self,
        goal_id: Uuid,
        window_days: u32,
        today: NaiveDate,
    ) -> DomainResult<DailySeries> {
        let from = today
            .checked_sub_days(Days::new(u64::from(window_days)))
            .ok_or_else(|| window_out_of_range(window_days, today))?;
        let counts = self.counts_between(goal_id, from, today).await?;
        DailySeries::new(today, window_days, counts)
            .ok_or_else(|| window_out_of_range(window_days, today))
    }
}

fn window_out_of_range(window_days: u32, today: NaiveDate) -> DomainError {
    DomainError::ValidationFailed(format!(
        "Window of {window_days} days before {today} is out of the supported date range"
    ))
}
