//! SQLite implementation of the GoalRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_optional_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Frequency, Goal, GoalState};
use crate::domain::ports::{GoalFilter, GoalRepository};

const GOAL_COLUMNS: &str = "id, owner_id, title, category, description, frequency, target_count, deadline, is_public, archived, current_streak, created_at";

#[derive(Clone)]
pub struct SqliteGoalRepository {
    pool: SqlitePool,
}

impl SqliteGoalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalRepository for SqliteGoalRepository {
    async fn create(&self, goal: &Goal) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO goals (id, owner_id, title, category, description, frequency, target_count, deadline, is_public, archived, current_streak, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(goal.id.to_string())
        .bind(&goal.owner_id)
        .bind(&goal.title)
        .bind(&goal.category)
        .bind(&goal.description)
        .bind(goal.frequency.as_str())
        .bind(i64::from(goal.target_count))
        .bind(goal.deadline.map(|d| d.to_rfc3339()))
        .bind(goal.is_public)
        .bind(goal.is_archived())
        .bind(i64::from(goal.current_streak))
        .bind(goal.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Goal>> {
        let row: Option<GoalRow> = sqlx::query_as(&format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn update(&self, goal: &Goal) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE goals SET title = ?, category = ?, description = ?, frequency = ?,
               target_count = ?, deadline = ?, is_public = ?
               WHERE id = ?"#
        )
        .bind(&goal.title)
        .bind(&goal.category)
        .bind(&goal.description)
        .bind(goal.frequency.as_str())
        .bind(i64::from(goal.target_count))
        .bind(goal.deadline.map(|d| d.to_rfc3339()))
        .bind(goal.is_public)
        .bind(goal.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GoalNotFound(goal.id));
        }

        Ok(())
    }

    async fn archive(&self, id: Uuid) -> DomainResult<bool> {
        let result = sqlx::query("UPDATE goals SET archived = 1 WHERE id = ? AND archived = 0")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        match self.get(id).await? {
            Some(_) => Ok(false),
            None => Err(DomainError::GoalNotFound(id)),
        }
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM goals WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GoalNotFound(id));
        }

        Ok(())
    }

    async fn list(&self, filter: GoalFilter) -> DomainResult<Vec<Goal>> {
        let mut query = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(owner_id) = &filter.owner_id {
            query.push_str(" AND owner_id = ?");
            bindings.push(owner_id.clone());
        }

        if filter.public_only {
            query.push_str(" AND is_public = 1");
        }

        if !filter.include_archived {
            query.push_str(" AND archived = 0");
        }

        query.push_str(" ORDER BY created_at DESC");

        if let Some(limit) = filter.limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        let mut q = sqlx::query_as::<_, GoalRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<GoalRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn update_streak(&self, id: Uuid, streak: u32) -> DomainResult<()> {
        let result = sqlx::query("UPDATE goals SET current_streak = ? WHERE id = ?")
            .bind(i64::from(streak))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GoalNotFound(id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct GoalRow {
    id: String,
    owner_id: String,
    title: String,
    category: String,
    description: String,
    frequency: String,
    target_count: i64,
    deadline: Option<String>,
    is_public: bool,
    archived: bool,
    current_streak: i64,
    created_at: String,
}

impl TryFrom<GoalRow> for Goal {
    type Error = DomainError;

    fn try_from(row: GoalRow) -> Result<Self, Self::Error> {
        let target_count = u32::try_from(row.target_count)
            .map_err(|_| DomainError::SerializationError(format!("Invalid target_count: {}", row.target_count)))?;
        let current_streak = u32::try_from(row.current_streak)
            .map_err(|_| DomainError::SerializationError(format!("Invalid current_streak: {}", row.current_streak)))?;

        Ok(Goal {
            id: parse_uuid(&row.id)?,
            owner_id: row.owner_id,
            title: row.title,
            category: row.category,
            description: row.description,
            frequency: Frequency::parse(&row.frequency),
            target_count,
            deadline: parse_optional_datetime(row.deadline)?,
            is_public: row.is_public,
            state: GoalState::from_archived(row.archived),
            current_streak,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
