//! Dashboard sub-application mounted under `/dashboard`

use std::path::Path;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::services::ServeFile;

use super::AppState;
use crate::application::errors::StorageError;
use crate::domain::entities::SessionStatus;
use crate::infrastructure::database::{GroupSummary, Stats};

pub fn router(static_dir: &Path) -> Router<AppState> {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/api/status", get(status_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/groups", get(groups_handler))
}

/// Storage failure surfaced as a 500 JSON body
struct ApiError(StorageError);

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("Dashboard query failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct StatusBody {
    bot: String,
    version: &'static str,
    session: SessionStatus,
    ready: bool,
    uptime_secs: u64,
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusBody> {
    let session = state.status.borrow().clone();
    Json(StatusBody {
        bot: state.bot_name.clone(),
        version: state.version,
        ready: session.is_ready(),
        session,
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

async fn stats_handler(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.db.stats()?))
}

async fn groups_handler(State(state): State<AppState>) -> Result<Json<Vec<GroupSummary>>, ApiError> {
    Ok(Json(state.db.group_summaries()?))
}
