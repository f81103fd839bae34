//! Adapters binding the domain ports to concrete technology.

pub mod http;
pub mod sqlite;
