pub mod goal_service;
pub mod series_builder;
pub mod streak_calculator;

pub use goal_service::{CompletionReceipt, GoalPolicy, GoalService};
pub use series_builder::SeriesBuilder;
pub use streak_calculator::StreakCalculator;
