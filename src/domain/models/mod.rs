pub mod completion;
pub mod config;
pub mod goal;
pub mod streak;

pub use completion::Completion;
pub use config::{
    AccessConfig, Config, DatabaseConfig, LoggingConfig, ServerConfig, StreakConfig,
};
pub use goal::{Frequency, Goal, GoalPatch, GoalState, NewGoal};
pub use streak::{
    DailySeries, GraphPoint, SeriesDay, SeriesIter, StreakRun, StreakSummary, UserStats,
};
