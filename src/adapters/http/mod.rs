//! HTTP adapters.
//!
//! The goals server exposes the goal, completion and streak operations to
//! clients. Requester identity is supplied by an upstream identity provider
//! in the `x-user-id` header and trusted as-is.

pub mod goals_http;

pub use goals_http::{ErrorResponse, GoalResponse, GoalsHttpConfig, GoalsHttpServer, RequesterId, USER_ID_HEADER};
