//! Goal lifecycle manager.
//!
//! Owns authorization decisions, the archive transition and the completion
//! write path. It is the only component that writes a goal's cached
//! `current_streak`.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Completion, Config, Goal, GoalPatch, GoalState, GraphPoint, NewGoal, StreakSummary, UserStats,
};
use crate::domain::ports::{Clock, CompletionLedger, GoalFilter, GoalRepository};
use crate::services::series_builder::{SeriesBuilder, MAX_GRAPH_WINDOW_DAYS, YEARLY_WINDOW_DAYS};
use crate::services::streak_calculator::{current_streak_as_of, longest_streak_of, StreakCalculator};

/// Page size used when a public listing asks for a limit outside 1..=100.
pub const DEFAULT_PUBLIC_LIMIT: u32 = 50;
pub const MAX_PUBLIC_LIMIT: u32 = 100;

/// Behavioural switches for the lifecycle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalPolicy {
    pub graph_window_days: u32,
    /// Refuse completions on archived goals
    pub reject_archived_completions: bool,
    /// Answer reads of other users' private goals with NotFound
    pub conceal_private_goals: bool,
}

impl Default for GoalPolicy {
    fn default() -> Self {
        Self {
            graph_window_days: YEARLY_WINDOW_DAYS,
            reject_archived_completions: false,
            conceal_private_goals: false,
        }
    }
}

impl From<&Config> for GoalPolicy {
    fn from(config: &Config) -> Self {
        Self {
            graph_window_days: config.streaks.graph_window_days,
            reject_archived_completions: config.streaks.reject_archived_completions,
            conceal_private_goals: config.access.conceal_private_goals,
        }
    }
}

/// Result of a successful completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionReceipt {
    pub completion: Completion,
    pub current_streak: u32,
}

pub struct GoalService<G: GoalRepository, L: CompletionLedger> {
    goals: Arc<G>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
    calculator: StreakCalculator<L>,
    series: SeriesBuilder<L>,
    policy: GoalPolicy,
}

impl<G: GoalRepository, L: CompletionLedger> GoalService<G, L> {
    pub fn new(goals: Arc<G>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            calculator: StreakCalculator::new(Arc::clone(&ledger), Arc::clone(&clock)),
            series: SeriesBuilder::new(Arc::clone(&ledger), Arc::clone(&clock)),
            goals,
            ledger,
            clock,
            policy: GoalPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: GoalPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> GoalPolicy {
        self.policy
    }

    /// Create a new active goal with a zero streak.
    #[instrument(skip(self, new_goal), fields(title = %new_goal.title))]
    pub async fn create_goal(&self, owner_id: &str, new_goal: NewGoal) -> DomainResult<Goal> {
        let goal = new_goal.into_goal(owner_id);
        goal.validate().map_err(DomainError::ValidationFailed)?;
        self.goals.create(&goal).await?;

        info!(goal_id = %goal.id, user_id = owner_id, "goal created");
        Ok(goal)
    }

    /// Get a goal the requester is allowed to see.
    #[instrument(skip(self))]
    pub async fn get_goal(&self, goal_id: Uuid, requester_id: &str) -> DomainResult<Goal> {
        self.load_visible(goal_id, requester_id).await
    }

    /// Non-archived goals of `owner_id`, newest first.
    #[instrument(skip(self))]
    pub async fn list_user_goals(&self, owner_id: &str) -> DomainResult<Vec<Goal>> {
        self.goals.list(GoalFilter::owned_by(owner_id)).await
    }

    /// Public, non-archived goals of any owner, newest first.
    #[instrument(skip(self))]
    pub async fn list_public_goals(&self, limit: Option<u32>) -> DomainResult<Vec<Goal>> {
        let limit = match limit {
            Some(l) if (1..=MAX_PUBLIC_LIMIT).contains(&l) => l,
            _ => DEFAULT_PUBLIC_LIMIT,
        };
        self.goals.list(GoalFilter::public(limit)).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_goal(
        &self,
        goal_id: Uuid,
        requester_id: &str,
        patch: GoalPatch,
    ) -> DomainResult<Goal> {
        let mut goal = self.load_owned(goal_id, requester_id).await?;
        patch.apply_to(&mut goal);
        goal.validate().map_err(DomainError::ValidationFailed)?;
        self.goals.update(&goal).await?;
        Ok(goal)
    }

    /// Move an active goal to archived. There is no way back.
    #[instrument(skip(self))]
    pub async fn archive_goal(&self, goal_id: Uuid, requester_id: &str) -> DomainResult<Goal> {
        let mut goal = self.load_owned(goal_id, requester_id).await?;
        let from = goal.state;
        let rejected = |from: GoalState| DomainError::InvalidStateTransition {
            from: from.as_str().to_string(),
            to: GoalState::Archived.as_str().to_string(),
        };

        goal.transition_to(GoalState::Archived).map_err(|_| rejected(from))?;
        // Lost a race with another archiver.
        if !self.goals.archive(goal_id).await? {
            return Err(rejected(GoalState::Archived));
        }
        info!(goal_id = %goal_id, user_id = requester_id, "goal archived");
        Ok(goal)
    }

    /// Delete a goal together with its completion history.
    #[instrument(skip(self))]
    pub async fn delete_goal(&self, goal_id: Uuid, requester_id: &str) -> DomainResult<()> {
        self.load_owned(goal_id, requester_id).await?;
        self.goals.delete(goal_id).await?;
        info!(goal_id = %goal_id, user_id = requester_id, "goal deleted");
        Ok(())
    }

    /// Record today's completion for a goal.
    pub async fn mark_complete(
        &self,
        goal_id: Uuid,
        requester_id: &str,
    ) -> DomainResult<CompletionReceipt> {
        self.mark_complete_on(goal_id, requester_id, self.clock.today())
            .await
    }

    /// Record a completion for `as_of`.
    ///
    /// The same-day check is advisory: two concurrent calls can both pass it,
    /// in which case the ledger upsert merges them into one row. Once the
    /// ledger write succeeds it is never undone; a failed streak refresh is
    /// reported as [`DomainError::StreakRefreshFailed`].
    #[instrument(skip(self), fields(streak = tracing::field::Empty))]
    pub async fn mark_complete_on(
        &self,
        goal_id: Uuid,
        requester_id: &str,
        as_of: NaiveDate,
    ) -> DomainResult<CompletionReceipt> {
        let goal = self.load_owned(goal_id, requester_id).await?;

        if goal.is_archived() && self.policy.reject_archived_completions {
            return Err(DomainError::InvalidStateTransition {
                from: goal.state.as_str().to_string(),
                to: GoalState::Active.as_str().to_string(),
            });
        }

        if self.ledger.exists_for_date(goal_id, as_of).await? {
            return Err(DomainError::AlreadyCompletedToday {
                goal_id,
                date: as_of,
            });
        }

        let completion = self.ledger.record_completion(goal_id, as_of, 1).await?;

        let current_streak = self.refresh_streak(goal_id).await.map_err(|e| {
            error!(goal_id = %goal_id, error = %e, "completion recorded but streak cache is stale");
            DomainError::StreakRefreshFailed {
                goal_id,
                reason: e.to_string(),
            }
        })?;

        tracing::Span::current().record("streak", current_streak);
        info!(goal_id = %goal_id, date = %as_of, streak = current_streak, "completion recorded");

        Ok(CompletionReceipt {
            completion,
            current_streak,
        })
    }

    /// Completion history, newest first.
    #[instrument(skip(self))]
    pub async fn get_completions(
        &self,
        goal_id: Uuid,
        requester_id: &str,
    ) -> DomainResult<Vec<Completion>> {
        self.load_visible(goal_id, requester_id).await?;
        self.ledger.list_by_goal(goal_id).await
    }

    /// Streak figures computed live from the ledger.
    #[instrument(skip(self))]
    pub async fn get_streak(&self, goal_id: Uuid, requester_id: &str) -> DomainResult<StreakSummary> {
        self.load_visible(goal_id, requester_id).await?;
        self.calculator
            .summary(goal_id, self.policy.graph_window_days)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_graph(
        &self,
        goal_id: Uuid,
        requester_id: &str,
        window_days: Option<u32>,
    ) -> DomainResult<Vec<GraphPoint>> {
        self.load_visible(goal_id, requester_id).await?;
        let window = window_days.unwrap_or(self.policy.graph_window_days);
        if window > MAX_GRAPH_WINDOW_DAYS {
            return Err(DomainError::ValidationFailed(format!(
                "Graph window of {window} days exceeds the maximum of {MAX_GRAPH_WINDOW_DAYS}"
            )));
        }
        self.series.build_series(goal_id, window).await
    }

    /// Rebuild the cached streak from the ledger and persist it.
    #[instrument(skip(self))]
    pub async fn recompute_streak(&self, goal_id: Uuid, requester_id: &str) -> DomainResult<u32> {
        self.load_owned(goal_id, requester_id).await?;
        let streak = self.refresh_streak(goal_id).await?;
        info!(goal_id = %goal_id, streak, "streak recomputed");
        Ok(streak)
    }

    /// Totals over every goal the user owns, archived ones included.
    #[instrument(skip(self))]
    pub async fn user_stats(&self, user_id: &str) -> DomainResult<UserStats> {
        let goals = self
            .goals
            .list(GoalFilter::owned_by(user_id).with_archived())
            .await?;

        let per_goal = try_join_all(goals.iter().map(|goal| async move {
            let dates = self.ledger.completion_dates(goal.id).await?;
            let total = self.ledger.total_count(goal.id).await?;
            let today = self.clock.today();
            Ok::<_, DomainError>((
                current_streak_as_of(&dates, today),
                longest_streak_of(&dates),
                total,
            ))
        }))
        .await?;

        let mut stats = UserStats {
            total_goals: u32::try_from(goals.len()).unwrap_or(u32::MAX),
            active_goals: u32::try_from(goals.iter().filter(|g| !g.is_archived()).count())
                .unwrap_or(u32::MAX),
            ..UserStats::default()
        };
        for (current, longest, total) in per_goal {
            stats.total_completions += total;
            stats.best_current_streak = stats.best_current_streak.max(current);
            stats.longest_streak = stats.longest_streak.max(longest);
        }
        Ok(stats)
    }

    async fn refresh_streak(&self, goal_id: Uuid) -> DomainResult<u32> {
        let streak = self.calculator.current_streak(goal_id).await?;
        self.goals.update_streak(goal_id, streak).await?;
        Ok(streak)
    }

    async fn load(&self, goal_id: Uuid) -> DomainResult<Goal> {
        self.goals
            .get(goal_id)
            .await?
            .ok_or(DomainError::GoalNotFound(goal_id))
    }

    /// Load a goal for an owner-only operation.
    async fn load_owned(&self, goal_id: Uuid, requester_id: &str) -> DomainResult<Goal> {
        let goal = self.load(goal_id).await?;
        if !goal.is_owned_by(requester_id) {
            warn!(goal_id = %goal_id, user_id = requester_id, "owner-only operation refused");
            return Err(DomainError::Forbidden {
                goal_id,
                user_id: requester_id.to_string(),
            });
        }
        Ok(goal)
    }

    /// Load a goal for a read; private goals are visible to their owner only.
    async fn load_visible(&self, goal_id: Uuid, requester_id: &str) -> DomainResult<Goal> {
        let goal = self.load(goal_id).await?;
        if goal.is_visible_to(requester_id) {
            return Ok(goal);
        }
        if self.policy.conceal_private_goals {
            Err(DomainError::GoalNotFound(goal_id))
        } else {
            Err(DomainError::Forbidden {
                goal_id,
                user_id: requester_id.to_string(),
            })
        }
    }
}
