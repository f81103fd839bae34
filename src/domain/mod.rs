//! Domain layer for the DoToday tracking system
//!
//! This module contains core business logic, domain models and the ports
//! adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, ErrorKind};
