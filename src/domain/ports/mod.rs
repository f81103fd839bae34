//! Port trait definitions (Hexagonal Architecture)
//!
//! - GoalRepository: goal rows and the cached streak column
//! - CompletionLedger: append-only completion history
//! - Clock: the reference "today"

pub mod clock;
pub mod completion_ledger;
pub mod goal_repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use completion_ledger::CompletionLedger;
pub use goal_repository::{GoalFilter, GoalRepository};
