//! Completion ledger entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the completion ledger.
///
/// There is at most one completion per `(goal_id, date)`; recording the same
/// day again merges into `count` instead of adding a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: Uuid,
    pub goal_id: Uuid,
    /// Calendar day in the reference zone, no time-of-day
    pub date: NaiveDate,
    pub count: u32,
    pub created_at: DateTime<Utc>,
}
