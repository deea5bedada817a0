use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Error response for the file endpoints
#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    NotFound(String),
    InternalError(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            HttpError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            HttpError::InternalError(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };

        (status, message).into_response()
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => HttpError::NotFound("File not found".to_string()),
            _ => HttpError::InternalError(err.to_string()),
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Version information endpoint
pub async fn version_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "online",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "ffmpeg": state.config.tools.ffmpeg_path.display().to_string(),
        "yt_dlp": state.config.tools.ytdlp_path.display().to_string(),
        "jobs": {
            "running": state.jobs.in_use(),
            "max": state.jobs.max_jobs(),
        },
    }))
}
