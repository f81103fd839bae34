//! Streak calculation over the completion ledger.
//!
//! Dates are partitioned into maximal runs of consecutive calendar days.
//! The current streak is the most recent run, but only while that run ends
//! today or yesterday; one missed day is tolerated before the streak drops
//! to zero. The longest streak is the largest run over all history.
//!
//! Everything here is a pure read: nothing is cached and nothing is written.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{StreakRun, StreakSummary};
use crate::domain::ports::{Clock, CompletionLedger};

/// Partition completion dates into runs of consecutive days, most recent
/// run first. Input order and duplicates do not matter.
pub fn streak_runs(dates: &[NaiveDate]) -> Vec<StreakRun> {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let mut runs: Vec<StreakRun> = Vec::new();
    for date in sorted {
        match runs.last_mut() {
            Some(run) if run.start.checked_sub_days(Days::new(1)) == Some(date) => {
                run.start = date;
                run.length += 1;
            }
            _ => runs.push(StreakRun {
                start: date,
                end: date,
                length: 1,
            }),
        }
    }
    runs
}

/// Current streak as of `today`.
///
/// Dates after `today` are ignored.
pub fn current_streak_as_of(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let past: Vec<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    let Some(latest) = streak_runs(&past).into_iter().next() else {
        return 0;
    };

    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    if latest.end == today || latest.end == yesterday {
        latest.length
    } else {
        0
    }
}

/// Longest run over the whole history, 0 when there are no completions.
pub fn longest_streak_of(dates: &[NaiveDate]) -> u32 {
    streak_runs(dates)
        .iter()
        .map(|run| run.length)
        .max()
        .unwrap_or(0)
}

/// Reads the ledger and derives streak figures for a goal.
pub struct StreakCalculator<L: CompletionLedger> {
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L: CompletionLedger> Clone for StreakCalculator<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<L: CompletionLedger> StreakCalculator<L> {
    pub fn new(ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn current_streak(&self, goal_id: Uuid) -> DomainResult<u32> {
        let dates = self.ledger.completion_dates(goal_id).await?;
        Ok(current_streak_as_of(&dates, self.clock.today()))
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn longest_streak(&self, goal_id: Uuid) -> DomainResult<u32> {
        let dates = self.ledger.completion_dates(goal_id).await?;
        Ok(longest_streak_of(&dates))
    }

    /// Current and longest streak plus the number of completed days in the
    /// `window_days` window ending today.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn summary(&self, goal_id: Uuid, window_days: u32) -> DomainResult<StreakSummary> {
        let today = self.clock.today();
        let dates = self.ledger.completion_dates(goal_id).await?;
        let series = self.ledger.daily_series(goal_id, window_days, today).await?;

        Ok(StreakSummary {
            current_streak: current_streak_as_of(&dates, today),
            longest_streak: longest_streak_of(&dates),
            total_completions_in_window: u32::try_from(series.present_days()).unwrap_or(u32::MAX),
        })
    }
}
