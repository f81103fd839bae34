//! Goal repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Goal;

/// Filter criteria for listing goals.
#[derive(Debug, Clone, Default)]
pub struct GoalFilter {
    pub owner_id: Option<String>,
    pub public_only: bool,
    pub include_archived: bool,
    pub limit: Option<u32>,
}

impl GoalFilter {
    pub fn owned_by(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Default::default()
        }
    }

    pub fn public(limit: u32) -> Self {
        Self {
            public_only: true,
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn with_archived(mut self) -> Self {
        self.include_archived = true;
        self
    }
}

/// Repository interface for Goal persistence.
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Create a new goal.
    async fn create(&self, goal: &Goal) -> DomainResult<()>;

    /// Get a goal by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Goal>>;

    /// Update the descriptive fields of a goal.
    ///
    /// Never writes the state or `current_streak`; see
    /// [`GoalRepository::archive`] and [`GoalRepository::update_streak`].
    async fn update(&self, goal: &Goal) -> DomainResult<()>;

    /// Mark an active goal archived. Returns false if it was already
    /// archived, so concurrent archivers see exactly one success.
    async fn archive(&self, id: Uuid) -> DomainResult<bool>;

    /// Delete a goal and its completions.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// List goals, newest first.
    async fn list(&self, filter: GoalFilter) -> DomainResult<Vec<Goal>>;

    /// Persist the cached current streak of a goal.
    async fn update_streak(&self, id: Uuid, streak: u32) -> DomainResult<()>;
}
