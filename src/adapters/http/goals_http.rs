//! Goals HTTP Server.
//!
//! Provides endpoints for managing goals, recording daily completions and
//! reading streaks and graph series.

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::domain::errors::{DomainError, ErrorKind};
use crate::domain::models::{
    Completion, Goal, GoalPatch, GraphPoint, NewGoal, ServerConfig, StreakSummary, UserStats,
};
use crate::domain::ports::{CompletionLedger, GoalRepository};
use crate::services::{CompletionReceipt, GoalService};

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Configuration for the goals HTTP server.
#[derive(Debug, Clone)]
pub struct GoalsHttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
}

impl Default for GoalsHttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

impl From<&ServerConfig> for GoalsHttpConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
        }
    }
}

/// Query parameters for the public goal listing.
#[derive(Debug, Deserialize)]
pub struct PublicGoalsParams {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Query parameters for the graph endpoint.
#[derive(Debug, Deserialize)]
pub struct GraphParams {
    #[serde(default)]
    pub days: Option<u32>,
}

/// Response with a goal.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoalResponse {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub frequency: String,
    pub target_count: u32,
    pub deadline: Option<String>,
    pub is_public: bool,
    pub state: String,
    pub current_streak: u32,
    pub created_at: String,
}

impl From<Goal> for GoalResponse {
    fn from(g: Goal) -> Self {
        Self {
            id: g.id,
            frequency: g.frequency.as_str().to_string(),
            owner_id: g.owner_id,
            title: g.title,
            category: g.category,
            description: g.description,
            target_count: g.target_count,
            deadline: g.deadline.map(|dt| dt.to_rfc3339()),
            is_public: g.is_public,
            state: g.state.as_str().to_string(),
            current_streak: g.current_streak,
            created_at: g.created_at.to_rfc3339(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(e: DomainError) -> ApiError {
    let kind = e.kind();
    if kind == ErrorKind::Internal {
        tracing::error!(error = %e, "request failed");
    }
    (
        status_for(kind),
        Json(ErrorResponse {
            error: e.to_string(),
            code: kind.as_str().to_string(),
        }),
    )
}

/// Authenticated requester, taken from the [`USER_ID_HEADER`] header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RequesterId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match user_id {
            Some(id) => Ok(Self(id.to_string())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: format!("Missing {} header", USER_ID_HEADER),
                    code: "UNAUTHORIZED".to_string(),
                }),
            )),
        }
    }
}

/// Shared state for the goals HTTP server.
struct AppState<G: GoalRepository, L: CompletionLedger> {
    service: GoalService<G, L>,
}

/// Goals HTTP Server.
pub struct GoalsHttpServer<G: GoalRepository + 'static, L: CompletionLedger + 'static> {
    config: GoalsHttpConfig,
    service: GoalService<G, L>,
}

impl<G: GoalRepository + 'static, L: CompletionLedger + 'static> GoalsHttpServer<G, L> {
    pub fn new(service: GoalService<G, L>, config: GoalsHttpConfig) -> Self {
        Self { config, service }
    }

    /// Build the router.
    pub fn router(self) -> Router {
        let state = Arc::new(AppState {
            service: self.service,
        });

        let app = Router::new()
            // Goal CRUD operations
            .route("/api/v1/goals", get(list_goals::<G, L>).post(create_goal::<G, L>))
            .route("/api/v1/goals/public", get(list_public_goals::<G, L>))
            .route(
                "/api/v1/goals/{id}",
                get(get_goal::<G, L>)
                    .put(update_goal::<G, L>)
                    .delete(delete_goal::<G, L>),
            )
            .route("/api/v1/goals/{id}/archive", post(archive_goal::<G, L>))
            // Completions and streaks
            .route("/api/v1/goals/{id}/complete", post(complete_goal::<G, L>))
            .route("/api/v1/goals/{id}/completions", get(list_completions::<G, L>))
            .route("/api/v1/goals/{id}/streak", get(get_streak::<G, L>))
            .route("/api/v1/goals/{id}/streak/recompute", post(recompute_streak::<G, L>))
            .route("/api/v1/goals/{id}/graph", get(get_graph::<G, L>))
            // Statistics
            .route("/api/v1/users/me/stats", get(get_user_stats::<G, L>))
            // Health check
            .route("/health", get(health_check))
            .with_state(state);

        if self.config.enable_cors {
            app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(TraceLayer::new_for_http())
        } else {
            app.layer(TraceLayer::new_for_http())
        }
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.router();

        tracing::info!("Goals HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn create_goal<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
    Json(req): Json<NewGoal>,
) -> Result<(StatusCode, Json<GoalResponse>), ApiError> {
    let goal = state.service.create_goal(&user_id, req).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(GoalResponse::from(goal))))
}

async fn list_goals<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
) -> Result<Json<Vec<GoalResponse>>, ApiError> {
    let goals = state.service.list_user_goals(&user_id).await.map_err(api_error)?;
    Ok(Json(goals.into_iter().map(GoalResponse::from).collect()))
}

async fn list_public_goals<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    Query(params): Query<PublicGoalsParams>,
) -> Result<Json<Vec<GoalResponse>>, ApiError> {
    let goals = state
        .service
        .list_public_goals(params.limit)
        .await
        .map_err(api_error)?;
    Ok(Json(goals.into_iter().map(GoalResponse::from).collect()))
}

async fn get_goal<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalResponse>, ApiError> {
    let goal = state.service.get_goal(id, &user_id).await.map_err(api_error)?;
    Ok(Json(GoalResponse::from(goal)))
}

async fn update_goal<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
    Path(id): Path<Uuid>,
    Json(patch): Json<GoalPatch>,
) -> Result<Json<GoalResponse>, ApiError> {
    let goal = state
        .service
        .update_goal(id, &user_id, patch)
        .await
        .map_err(api_error)?;
    Ok(Json(GoalResponse::from(goal)))
}

async fn delete_goal<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_goal(id, &user_id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn archive_goal<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalResponse>, ApiError> {
    let goal = state.service.archive_goal(id, &user_id).await.map_err(api_error)?;
    Ok(Json(GoalResponse::from(goal)))
}

async fn complete_goal<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<CompletionReceipt>), ApiError> {
    let receipt = state.service.mark_complete(id, &user_id).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn list_completions<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Completion>>, ApiError> {
    let completions = state
        .service
        .get_completions(id, &user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(completions))
}

async fn get_streak<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
    Path(id): Path<Uuid>,
) -> Result<Json<StreakSummary>, ApiError> {
    let summary = state.service.get_streak(id, &user_id).await.map_err(api_error)?;
    Ok(Json(summary))
}

#[derive(Debug, Serialize)]
struct RecomputeResponse {
    goal_id: Uuid,
    current_streak: u32,
}

async fn recompute_streak<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
    Path(id): Path<Uuid>,
) -> Result<Json<RecomputeResponse>, ApiError> {
    let current_streak = state
        .service
        .recompute_streak(id, &user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(RecomputeResponse {
        goal_id: id,
        current_streak,
    }))
}

async fn get_graph<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
    Path(id): Path<Uuid>,
    Query(params): Query<GraphParams>,
) -> Result<Json<Vec<GraphPoint>>, ApiError> {
    let points = state
        .service
        .get_graph(id, &user_id, params.days)
        .await
        .map_err(api_error)?;
    Ok(Json(points))
}

async fn get_user_stats<G: GoalRepository + 'static, L: CompletionLedger + 'static>(
    State(state): State<Arc<AppState<G, L>>>,
    RequesterId(user_id): RequesterId,
) -> Result<Json<UserStats>, ApiError> {
    let stats = state.service.user_stats(&user_id).await.map_err(api_error)?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_config_default() {
        let config = GoalsHttpConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.enable_cors);
    }

    #[test]
    fn test_error_kinds_map_to_status() {
        let (status, Json(body)) = api_error(DomainError::AlreadyCompletedToday {
            goal_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        });
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "CONFLICT");
        assert_eq!(body.error, "already completed today");

        let (status, _) = api_error(DomainError::GoalNotFound(Uuid::new_v4()));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = api_error(DomainError::Forbidden {
            goal_id: Uuid::new_v4(),
            user_id: "bob".into(),
        });
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, Json(body)) = api_error(DomainError::DatabaseError("locked".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "INTERNAL_ERROR");
    }

    #[test]
    fn test_goal_response_serialization() {
        let goal = Goal::new("alice", "Read").public();
        let id = goal.id;
        let json = serde_json::to_string(&GoalResponse::from(goal)).unwrap();
        assert!(json.contains(&format!("\"id\":\"{}\"", id)));
        assert!(json.contains("\"state\":\"active\""));
        assert!(json.contains("\"frequency\":\"daily\""));
        assert!(json.contains("\"is_public\":true"));
    }
}
