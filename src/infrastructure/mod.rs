//! Infrastructure layer module
//!
//! Configuration loading and logging setup shared by the CLI and the HTTP
//! server.

pub mod config;
pub mod logging;
