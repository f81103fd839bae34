//! Domain errors for the DoToday tracking system.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Coarse classification of a [`DomainError`], used by transports to pick a
/// status code and by clients to tell "already done today" apart from a
/// generic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    Validation,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::Validation => "VALIDATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Domain-level errors that can occur in the DoToday system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Goal not found: {0}")]
    GoalNotFound(Uuid),

    #[error("User {user_id} is not allowed to access goal {goal_id}")]
    Forbidden { goal_id: Uuid, user_id: String },

    #[error("already completed today")]
    AlreadyCompletedToday { goal_id: Uuid, date: NaiveDate },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The completion was recorded but the cached streak could not be
    /// refreshed. The ledger row stays; the cache is stale until the next
    /// successful completion or an explicit recompute.
    #[error("Completion recorded for goal {goal_id} but streak refresh failed: {reason}")]
    StreakRefreshFailed { goal_id: Uuid, reason: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GoalNotFound(_) => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::AlreadyCompletedToday { .. } | Self::InvalidStateTransition { .. } => {
                ErrorKind::Conflict
            }
            Self::ValidationFailed(_) => ErrorKind::Validation,
            Self::StreakRefreshFailed { .. }
            | Self::DatabaseError(_)
            | Self::SerializationError(_) => ErrorKind::Internal,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_distinct_from_internal() {
        let conflict = DomainError::AlreadyCompletedToday {
            goal_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert_eq!(conflict.to_string(), "already completed today");

        let internal = DomainError::DatabaseError("disk I/O error".into());
        assert_eq!(internal.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_refresh_failure_is_internal() {
        let err = DomainError::StreakRefreshFailed {
            goal_id: Uuid::new_v4(),
            reason: "locked".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.kind().as_str(), "INTERNAL_ERROR");
    }
}
