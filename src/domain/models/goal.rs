//! Goal domain model.
//!
//! A goal is a habit a user commits to repeating. Completions are recorded
//! against it day by day; the goal itself only carries a cached copy of the
//! current streak, refreshed when a completion is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a goal.
///
/// - Active: accepting completions and shown in the owner's list
/// - Archived: hidden from lists; one-way, there is no un-archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalState {
    #[default]
    Active,
    Archived,
}

impl GoalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    pub fn from_archived(archived: bool) -> Self {
        if archived {
            Self::Archived
        } else {
            Self::Active
        }
    }

    /// Check if this state can transition to another state.
    ///
    /// `active -> active` covers updates and completions.
    pub fn can_transition_to(&self, new_state: Self) -> bool {
        matches!(
            (self, new_state),
            (Self::Active, Self::Active) | (Self::Active, Self::Archived)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived)
    }
}

/// How often a goal is meant to be completed.
///
/// Only daily semantics are implemented by the streak math; other values are
/// stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Custom(String),
}

impl Frequency {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Custom(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// A tracked habit goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    /// Opaque identifier of the owning user, as supplied by the identity provider
    pub owner_id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub frequency: Frequency,
    pub target_count: u32,
    pub deadline: Option<DateTime<Utc>>,
    pub is_public: bool,
    pub state: GoalState,
    /// Denormalized streak, written only after a completion or a recompute
    pub current_streak: u32,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            title: title.into(),
            category: String::new(),
            description: String::new(),
            frequency: Frequency::default(),
            target_count: 1,
            deadline: None,
            is_public: false,
            state: GoalState::default(),
            current_streak: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_target_count(mut self, target_count: u32) -> Self {
        self.target_count = target_count;
        self
    }

    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Owners always see their goals; everyone else only public ones.
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.is_public || self.is_owned_by(user_id)
    }

    pub fn is_archived(&self) -> bool {
        self.state == GoalState::Archived
    }

    pub fn transition_to(&mut self, new_state: GoalState) -> Result<(), String> {
        if !self.state.can_transition_to(new_state) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.state.as_str(),
                new_state.as_str()
            ));
        }
        self.state = new_state;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Goal title cannot be empty".to_string());
        }
        if self.owner_id.trim().is_empty() {
            return Err("Goal owner cannot be empty".to_string());
        }
        if self.target_count == 0 {
            return Err("Target count must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Fields supplied when creating a goal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewGoal {
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub target_count: Option<u32>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_public: bool,
}

impl NewGoal {
    pub fn into_goal(self, owner_id: impl Into<String>) -> Goal {
        let mut goal = Goal::new(owner_id, self.title)
            .with_category(self.category)
            .with_description(self.description)
            .with_frequency(self.frequency.as_deref().map(Frequency::parse).unwrap_or_default())
            .with_target_count(self.target_count.unwrap_or(1));
        goal.deadline = self.deadline;
        goal.is_public = self.is_public;
        goal
    }
}

/// Partial update of a goal's descriptive fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl GoalPatch {
    pub fn apply_to(self, goal: &mut Goal) {
        if let Some(title) = self.title {
            goal.title = title;
        }
        if let Some(description) = self.description {
            goal.description = description;
        }
        if let Some(deadline) = self.deadline {
            goal.deadline = Some(deadline);
        }
        if let Some(is_public) = self.is_public {
            goal.is_public = is_public;
        }
    }
}
