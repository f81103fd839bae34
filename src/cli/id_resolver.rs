//! Short ID prefix resolution for CLI goal commands.
//!
//! Allows users to specify any unique prefix of a goal UUID instead of the
//! full ID, similar to git short hashes.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

const GOAL_QUERY: &str = "SELECT id FROM goals WHERE id LIKE ? ORDER BY id LIMIT 10";

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        bail!("ID prefix must not be empty");
    }
    if !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        bail!(
            "Invalid ID prefix '{}': must contain only hex characters and dashes",
            prefix
        );
    }
    Ok(())
}

/// Resolve a goal ID prefix to a full UUID.
pub async fn resolve_goal_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    // Fast path: a full UUID is returned as-is
    if let Ok(uuid) = Uuid::parse_str(prefix) {
        return Ok(uuid);
    }

    validate_prefix(prefix)?;

    let pattern = format!("{}%", prefix.to_lowercase());
    let rows: Vec<(String,)> = sqlx::query_as(GOAL_QUERY)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;

    match rows.len() {
        0 => bail!("No goal found matching '{}'", prefix),
        1 => Ok(Uuid::parse_str(&rows[0].0)?),
        n => {
            let mut msg = format!("Ambiguous prefix '{}': matches {} goals:", prefix, n);
            for row in &rows {
                msg.push_str(&format!("\n  {}", row.0));
            }
            bail!("{}", msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteGoalRepository};
    use crate::domain::models::Goal;
    use crate::domain::ports::GoalRepository;

    #[tokio::test]
    async fn test_resolve_unique_prefix() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteGoalRepository::new(pool.clone());
        let goal = Goal::new("alice", "Read");
        repo.create(&goal).await.unwrap();

        let prefix = &goal.id.to_string()[..8];
        assert_eq!(resolve_goal_id(&pool, prefix).await.unwrap(), goal.id);
        assert_eq!(
            resolve_goal_id(&pool, &goal.id.to_string()).await.unwrap(),
            goal.id
        );
    }

    #[tokio::test]
    async fn test_resolve_rejects_bad_input() {
        let pool = create_migrated_test_pool().await.unwrap();
        assert!(resolve_goal_id(&pool, "").await.is_err());
        assert!(resolve_goal_id(&pool, "xyz!").await.is_err());
        assert!(resolve_goal_id(&pool, "abc").await.is_err());
    }
}
