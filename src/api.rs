//! HTTP API endpoints for running contests.
//!
//! These endpoints are used by the host to upload a roster, draw a winner and
//! inspect the accumulated history.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{self, AuthConfig};
use crate::error::ContestError;
use crate::state::AppState;
use crate::types::{DrawOutcome, HistoryRecord, LeaderboardEntry, ParticipantWeight, RosterSummary};

/// JSON body returned for failed requests
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for ContestError {
    fn into_response(self) -> Response {
        let status = match &self {
            ContestError::Validation(_) | ContestError::EmptyInput => StatusCode::BAD_REQUEST,
            ContestError::NotFound(_) => StatusCode::NOT_FOUND,
            ContestError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router.
///
/// Everything under `/api` sits behind host authentication.
pub fn router(state: Arc<AppState>, auth_config: Arc<AuthConfig>) -> Router {
    let host_routes = Router::new()
        .route(
            "/api/roster",
            post(upload_roster).get(current_roster).delete(clear_roster),
        )
        .route("/api/weights", get(preview_weights))
        .route("/api/draw", post(draw_winner))
        .route("/api/draw/last", get(last_draw))
        .route("/api/history", get(history))
        .route("/api/leaderboard", get(leaderboard))
        .layer(middleware::from_fn_with_state(
            auth_config,
            auth::host_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(host_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// Upload the roster for the next draw.
///
/// POST /api/roster
///
/// The body is the roster CSV; it must have a `username` column.
pub async fn upload_roster(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RosterSummary>, ContestError> {
    state.load_roster(&body).await.map(Json)
}

/// GET /api/roster
pub async fn current_roster(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RosterSummary>, ContestError> {
    state
        .get_roster()
        .await
        .map(Json)
        .ok_or_else(|| ContestError::NotFound("No roster loaded".to_string()))
}

/// DELETE /api/roster
pub async fn clear_roster(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.clear_roster().await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Weight breakdown the next draw would use.
///
/// GET /api/weights
pub async fn preview_weights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ParticipantWeight>>, ContestError> {
    state.preview_weights().await.map(Json)
}

/// Draw a winner and persist the updated history.
///
/// POST /api/draw
pub async fn draw_winner(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DrawOutcome>, ContestError> {
    state.pick_winner().await.map(Json)
}

/// GET /api/draw/last
pub async fn last_draw(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DrawOutcome>, ContestError> {
    state
        .get_last_draw()
        .await
        .map(Json)
        .ok_or_else(|| ContestError::NotFound("No draw has been made yet".to_string()))
}

/// GET /api/history
pub async fn history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<HistoryRecord>>, ContestError> {
    state.get_history().await.map(Json)
}

/// GET /api/leaderboard
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ContestError> {
    state.get_leaderboard().await.map(Json)
}
