//! SQLite implementation of the CompletionLedger.
//!
//! The `(goal_id, date)` unique constraint is what keeps one row per day when
//! concurrent writers race past the service's existence check; the upsert
//! turns the loser into a count merge.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Completion;
use crate::domain::ports::CompletionLedger;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DomainError::SerializationError(format!("Invalid date {s}: {e}")))
}

fn parse_count(count: i64) -> DomainResult<u32> {
    u32::try_from(count).map_err(|_| DomainError::SerializationError(format!("Invalid count: {count}")))
}

#[derive(Clone)]
pub struct SqliteCompletionLedger {
    pool: SqlitePool,
}

impl SqliteCompletionLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompletionLedger for SqliteCompletionLedger {
    async fn record_completion(
        &self,
        goal_id: Uuid,
        date: NaiveDate,
        increment_by: u32,
    ) -> DomainResult<Completion> {
        if increment_by == 0 {
            return Err(DomainError::ValidationFailed(
                "Completion increment must be at least 1".to_string(),
            ));
        }

        let row: CompletionRow = sqlx::query_as(
            r#"INSERT INTO completions (id, goal_id, date, count, created_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (goal_id, date) DO UPDATE SET count = completions.count + excluded.count
               RETURNING id, goal_id, date, count, created_at"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(goal_id.to_string())
        .bind(format_date(date))
        .bind(i64::from(increment_by))
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn exists_for_date(&self, goal_id: Uuid, date: NaiveDate) -> DomainResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM completions WHERE goal_id = ? AND date = ?)",
        )
        .bind(goal_id.to_string())
        .bind(format_date(date))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_by_goal(&self, goal_id: Uuid) -> DomainResult<Vec<Completion>> {
        let rows: Vec<CompletionRow> = sqlx::query_as(
            "SELECT id, goal_id, date, count, created_at FROM completions WHERE goal_id = ? ORDER BY date DESC",
        )
        .bind(goal_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn completion_dates(&self, goal_id: Uuid) -> DomainResult<Vec<NaiveDate>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT date FROM completions WHERE goal_id = ? ORDER BY date DESC",
        )
        .bind(goal_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|(date,)| parse_date(date)).collect()
    }

    async fn counts_between(
        &self,
        goal_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<BTreeMap<NaiveDate, u32>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT date, count FROM completions WHERE goal_id = ? AND date >= ? AND date <= ? ORDER BY date",
        )
        .bind(goal_id.to_string())
        .bind(format_date(from))
        .bind(format_date(to))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|(date, count)| Ok((parse_date(date)?, parse_count(*count)?)))
            .collect()
    }

    async fn total_count(&self, goal_id: Uuid) -> DomainResult<u64> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(count), 0) FROM completions WHERE goal_id = ?",
        )
        .bind(goal_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        u64::try_from(total).map_err(|_| DomainError::SerializationError(format!("Invalid total: {total}")))
    }
}

#[derive(sqlx::FromRow)]
struct CompletionRow {
    id: String,
    goal_id: String,
    date: String,
    count: i64,
    created_at: String,
}

impl TryFrom<CompletionRow> for Completion {
    type Error = DomainError;

    fn try_from(row: CompletionRow) -> Result<Self, Self::Error> {
        Ok(Completion {
            id: parse_uuid(&row.id)?,
            goal_id: parse_uuid(&row.goal_id)?,
            date: parse_date(&row.date)?,
            count: parse_count(row.count)?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteGoalRepository};
    use crate::domain::models::Goal;
    use crate::domain::ports::GoalRepository;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn setup() -> (SqliteCompletionLedger, SqliteGoalRepository, Uuid) {
        let pool = create_migrated_test_pool().await.unwrap();
        let goals = SqliteGoalRepository::new(pool.clone());
        let goal = Goal::new("user-1", "Stretch");
        goals.create(&goal).await.unwrap();
        (SqliteCompletionLedger::new(pool), goals, goal.id)
    }

    #[tokio::test]
    async fn test_record_creates_then_merges() {
        let (ledger, _, goal_id) = setup().await;

        let first = ledger.record_completion(goal_id, d(2024, 5, 1), 1).await.unwrap();
        assert_eq!(first.count, 1);

        let second = ledger.record_completion(goal_id, d(2024, 5, 1), 3).await.unwrap();
        assert_eq!(second.count, 4);
        assert_eq!(second.id, first.id);

        let rows = ledger.list_by_goal(goal_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 4);
    }

    #[tokio::test]
    async fn test_zero_increment_rejected() {
        let (ledger, _, goal_id) = setup().await;
        let result = ledger.record_completion(goal_id, d(2024, 5, 1), 0).await;
        assert!(matches!(result, Err(DomainError::ValidationFailed(_))));
        assert!(ledger.list_by_goal(goal_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exists_for_date_is_day_exact() {
        let (ledger, _, goal_id) = setup().await;
        ledger.record_completion(goal_id, d(2024, 5, 2), 1).await.unwrap();

        assert!(ledger.exists_for_date(goal_id, d(2024, 5, 2)).await.unwrap());
        assert!(!ledger.exists_for_date(goal_id, d(2024, 5, 1)).await.unwrap());
        assert!(!ledger.exists_for_date(Uuid::new_v4(), d(2024, 5, 2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (ledger, _, goal_id) = setup().await;
        for day in [3, 1, 2] {
            ledger.record_completion(goal_id, d(2024, 5, day), 1).await.unwrap();
        }

        let dates: Vec<_> = ledger.list_by_goal(goal_id).await.unwrap().into_iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![d(2024, 5, 3), d(2024, 5, 2), d(2024, 5, 1)]);
        assert_eq!(ledger.completion_dates(goal_id).await.unwrap(), dates);
    }

    #[tokio::test]
    async fn test_daily_series_over_sparse_ledger() {
        let (ledger, _, goal_id) = setup().await;
        ledger.record_completion(goal_id, d(2024, 4, 1), 1).await.unwrap();
        ledger.record_completion(goal_id, d(2024, 5, 9), 2).await.unwrap();

        let series = ledger.daily_series(goal_id, 9, d(2024, 5, 10)).await.unwrap();
        assert_eq!(series.len(), 10);
        let present: Vec<_> = series.iter().filter(|day| day.present).map(|day| day.date).collect();
        assert_eq!(present, vec![d(2024, 5, 9)]);
        assert_eq!(series.count_on(d(2024, 5, 9)), 2);
    }

    #[tokio::test]
    async fn test_daily_series_rejects_window_past_earliest_date() {
        let (ledger, _, goal_id) = setup().await;

        let err = ledger.daily_series(goal_id, u32::MAX, d(2024, 5, 10)).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_total_count_and_cascade_delete() {
        let (ledger, goals, goal_id) = setup().await;
        ledger.record_completion(goal_id, d(2024, 5, 1), 2).await.unwrap();
        ledger.record_completion(goal_id, d(2024, 5, 2), 1).await.unwrap();
        assert_eq!(ledger.total_count(goal_id).await.unwrap(), 3);

        goals.delete(goal_id).await.unwrap();
        assert!(ledger.list_by_goal(goal_id).await.unwrap().is_empty());
        assert_eq!(ledger.total_count(goal_id).await.unwrap(), 0);
    }
}
