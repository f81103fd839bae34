//! Goal CLI commands.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Subcommand};

use crate::cli::commands::build_service;
use crate::cli::id_resolver::resolve_goal_id;
use crate::cli::output::table::{format_goals, format_graph, GoalRow};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, Goal, GraphPoint, NewGoal, StreakSummary, UserStats};
use crate::services::CompletionReceipt;

#[derive(Args, Debug)]
pub struct GoalArgs {
    /// Acting user id
    #[arg(short, long, global = true, env = "DOTODAY_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: GoalCommands,
}

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Create a new goal
    Create {
        /// Goal title
        title: String,
        /// Goal description
        #[arg(short, long)]
        description: Option<String>,
        /// Category label
        #[arg(long)]
        category: Option<String>,
        /// Frequency (daily, weekly, ...)
        #[arg(short, long)]
        frequency: Option<String>,
        /// Completions targeted per period
        #[arg(short, long)]
        target: Option<u32>,
        /// Deadline as an RFC 3339 timestamp
        #[arg(long)]
        deadline: Option<DateTime<Utc>>,
        /// Make the goal visible to other users
        #[arg(long)]
        public: bool,
    },
    /// List your goals, or public goals with --public
    List {
        /// List public goals of all users
        #[arg(long)]
        public: bool,
        /// Maximum number of public goals (1-100)
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show goal details
    Show {
        /// Goal ID or unique prefix
        id: String,
    },
    /// Archive a goal
    Archive {
        /// Goal ID or unique prefix
        id: String,
    },
    /// Delete a goal and its completions
    Delete {
        /// Goal ID or unique prefix
        id: String,
    },
    /// Record today's completion
    Complete {
        /// Goal ID or unique prefix
        id: String,
        /// Record for another day (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show current and longest streak
    Streak {
        /// Goal ID or unique prefix
        id: String,
    },
    /// Show the completion graph
    Graph {
        /// Goal ID or unique prefix
        id: String,
        /// Days back from today (defaults to streaks.graph_window_days)
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Rebuild the cached streak from the completion history
    Recompute {
        /// Goal ID or unique prefix
        id: String,
    },
    /// Show totals across your goals
    Stats,
}

#[derive(Debug, serde::Serialize)]
pub struct GoalOutput {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub frequency: String,
    pub target_count: u32,
    pub deadline: Option<String>,
    pub is_public: bool,
    pub state: String,
    pub current_streak: u32,
    pub created_at: String,
}

impl From<&Goal> for GoalOutput {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id.to_string(),
            owner_id: goal.owner_id.clone(),
            title: goal.title.clone(),
            description: goal.description.clone(),
            category: goal.category.clone(),
            frequency: goal.frequency.as_str().to_string(),
            target_count: goal.target_count,
            deadline: goal.deadline.map(|d| d.to_rfc3339()),
            is_public: goal.is_public,
            state: goal.state.as_str().to_string(),
            current_streak: goal.current_streak,
            created_at: goal.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct GoalListOutput {
    pub goals: Vec<GoalOutput>,
    pub total: usize,
}

impl CommandOutput for GoalListOutput {
    fn to_human(&self) -> String {
        if self.goals.is_empty() {
            return "No goals found.".to_string();
        }

        let rows: Vec<GoalRow<'_>> = self
            .goals
            .iter()
            .map(|g| GoalRow {
                id: &g.id,
                title: &g.title,
                state: &g.state,
                streak: g.current_streak,
                is_public: g.is_public,
            })
            .collect();

        format!("Found {} goal(s):\n{}", self.total, format_goals(&rows))
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct GoalDetailOutput {
    pub goal: GoalOutput,
}

impl CommandOutput for GoalDetailOutput {
    fn to_human(&self) -> String {
        let g = &self.goal;
        let mut lines = vec![
            format!("Goal: {}", g.title),
            format!("ID: {}", g.id),
            format!("Owner: {}", g.owner_id),
            format!("State: {}", g.state),
            format!("Frequency: {} (target {})", g.frequency, g.target_count),
            format!("Public: {}", if g.is_public { "yes" } else { "no" }),
            format!("Current streak: {}", g.current_streak),
        ];
        if !g.category.is_empty() {
            lines.push(format!("Category: {}", g.category));
        }
        if !g.description.is_empty() {
            lines.push(format!("Description: {}", g.description));
        }
        if let Some(ref deadline) = g.deadline {
            lines.push(format!("Deadline: {}", deadline));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct GoalActionOutput {
    pub success: bool,
    pub message: String,
    pub goal: Option<GoalOutput>,
}

impl CommandOutput for GoalActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CompletionOutput {
    pub goal_id: String,
    #[serde(flatten)]
    pub receipt: CompletionReceipt,
}

impl CommandOutput for CompletionOutput {
    fn to_human(&self) -> String {
        format!(
            "Completed {} on {}. Current streak: {} day(s)",
            &self.goal_id[..8.min(self.goal_id.len())],
            self.receipt.completion.date,
            self.receipt.current_streak
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct StreakOutput {
    pub goal_id: String,
    #[serde(flatten)]
    pub summary: StreakSummary,
    pub window_days: u32,
}

impl CommandOutput for StreakOutput {
    fn to_human(&self) -> String {
        [
            format!("Current streak: {}", self.summary.current_streak),
            format!("Longest streak: {}", self.summary.longest_streak),
            format!(
                "Days completed in the last {} days: {}",
                self.window_days, self.summary.total_completions_in_window
            ),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct GraphOutput {
    pub goal_id: String,
    pub points: Vec<GraphPoint>,
}

impl CommandOutput for GraphOutput {
    fn to_human(&self) -> String {
        let present = self.points.iter().filter(|p| p.completions > 0).count();
        format!(
            "{}\n{} of {} day(s) completed",
            format_graph(&self.points),
            present,
            self.points.len()
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct StatsOutput {
    pub user_id: String,
    #[serde(flatten)]
    pub stats: UserStats,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        [
            format!("Goals: {} ({} active)", self.stats.total_goals, self.stats.active_goals),
            format!("Total completions: {}", self.stats.total_completions),
            format!("Best current streak: {}", self.stats.best_current_streak),
            format!("Longest streak: {}", self.stats.longest_streak),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: GoalArgs, config: &Config, json_mode: bool) -> Result<()> {
    let user = args
        .user
        .filter(|u| !u.trim().is_empty())
        .context("No acting user. Pass --user or set DOTODAY_USER.")?;

    let (pool, service) = build_service(config).await?;

    match args.command {
        GoalCommands::Create {
            title,
            description,
            category,
            frequency,
            target,
            deadline,
            public,
        } => {
            let new_goal = NewGoal {
                title,
                category: category.unwrap_or_default(),
                description: description.unwrap_or_default(),
                frequency,
                target_count: target,
                deadline,
                is_public: public,
            };
            let goal = service.create_goal(&user, new_goal).await?;

            let out = GoalActionOutput {
                success: true,
                message: format!("Goal created: {}", goal.id),
                goal: Some(GoalOutput::from(&goal)),
            };
            output(&out, json_mode);
        }

        GoalCommands::List { public, limit } => {
            let goals = if public {
                service.list_public_goals(limit).await?
            } else {
                service.list_user_goals(&user).await?
            };
            let out = GoalListOutput {
                total: goals.len(),
                goals: goals.iter().map(GoalOutput::from).collect(),
            };
            output(&out, json_mode);
        }

        GoalCommands::Show { id } => {
            let goal_id = resolve_goal_id(&pool, &id).await?;
            let goal = service.get_goal(goal_id, &user).await?;
            output(&GoalDetailOutput { goal: GoalOutput::from(&goal) }, json_mode);
        }

        GoalCommands::Archive { id } => {
            let goal_id = resolve_goal_id(&pool, &id).await?;
            let goal = service.archive_goal(goal_id, &user).await?;

            let out = GoalActionOutput {
                success: true,
                message: format!("Goal archived: {}", goal.id),
                goal: Some(GoalOutput::from(&goal)),
            };
            output(&out, json_mode);
        }

        GoalCommands::Delete { id } => {
            let goal_id = resolve_goal_id(&pool, &id).await?;
            service.delete_goal(goal_id, &user).await?;

            let out = GoalActionOutput {
                success: true,
                message: format!("Goal deleted: {}", goal_id),
                goal: None,
            };
            output(&out, json_mode);
        }

        GoalCommands::Complete { id, date } => {
            let goal_id = resolve_goal_id(&pool, &id).await?;
            let receipt = match date {
                Some(day) => service.mark_complete_on(goal_id, &user, day).await?,
                None => service.mark_complete(goal_id, &user).await?,
            };
            let out = CompletionOutput {
                goal_id: goal_id.to_string(),
                receipt,
            };
            output(&out, json_mode);
        }

        GoalCommands::Streak { id } => {
            let goal_id = resolve_goal_id(&pool, &id).await?;
            let summary = service.get_streak(goal_id, &user).await?;
            let out = StreakOutput {
                goal_id: goal_id.to_string(),
                summary,
                window_days: service.policy().graph_window_days,
            };
            output(&out, json_mode);
        }

        GoalCommands::Graph { id, days } => {
            let goal_id = resolve_goal_id(&pool, &id).await?;
            let points = service.get_graph(goal_id, &user, days).await?;
            let out = GraphOutput {
                goal_id: goal_id.to_string(),
                points,
            };
            output(&out, json_mode);
        }

        GoalCommands::Recompute { id } => {
            let goal_id = resolve_goal_id(&pool, &id).await?;
            let streak = service.recompute_streak(goal_id, &user).await?;

            let out = GoalActionOutput {
                success: true,
                message: format!("Streak recomputed for {}: {} day(s)", goal_id, streak),
                goal: None,
            };
            output(&out, json_mode);
        }

        GoalCommands::Stats => {
            let stats = service.user_stats(&user).await?;
            output(&StatsOutput { user_id: user, stats }, json_mode);
        }
    }

    pool.close().await;
    Ok(())
}
