//! Graph series for charting a goal's completions.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::GraphPoint;
use crate::domain::ports::{Clock, CompletionLedger};

/// Default chart window: one year back from today, inclusive.
pub const YEARLY_WINDOW_DAYS: u32 = 365;

/// Largest window accepted from configuration or callers, roughly ten years.
pub const MAX_GRAPH_WINDOW_DAYS: u32 = 3660;

pub struct SeriesBuilder<L: CompletionLedger> {
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L: CompletionLedger> Clone for SeriesBuilder<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<L: CompletionLedger> SeriesBuilder<L> {
    pub fn new(ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }

    /// One point per day for `[today - window_days, today]`, oldest first.
    ///
    /// Read only. A window of 0 yields just today; a goal without
    /// completions yields an all-absent series.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn build_series(&self, goal_id: Uuid, window_days: u32) -> DomainResult<Vec<GraphPoint>> {
        let series = self
            .ledger
            .daily_series(goal_id, window_days, self.clock.today())
            .await?;

        Ok(series
            .iter()
            .map(|day| GraphPoint {
                date: day.date,
                completions: u8::from(day.present),
                count: series.count_on(day.date),
            })
            .collect())
    }
}
