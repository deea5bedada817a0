//! Conversion endpoint
//!
//! The pipeline is blocking (it waits on child processes), so each run goes
//! to the blocking pool once a job slot is free.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::pipeline::{ConversionRequest, ConversionResult, OutputFormat};
use crate::state::AppState;

/// Body of `POST /convert`
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub url: Option<String>,
    /// `audio`/`mp3` or `video`/`mp4`; audio when absent
    pub format: Option<String>,
}

fn reject(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ConversionResult::failure(message))).into_response()
}

/// Validate the body into a pipeline request
pub fn parse_request(body: ConvertRequest) -> Result<ConversionRequest, String> {
    let url = body
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| "URL is required".to_string())?;

    let format = match body.format.as_deref().map(str::trim) {
        None | Some("") => OutputFormat::default(),
        Some(f) => f.parse::<OutputFormat>().map_err(|e| e.to_string())?,
    };

    Ok(ConversionRequest::new(url, format))
}

/// Run a conversion
/// POST /convert
pub async fn convert(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ConvertRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return reject(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let request = match parse_request(body) {
        Ok(request) => request,
        Err(message) => return reject(StatusCode::BAD_REQUEST, message),
    };

    let _permit = match state.jobs.acquire().await {
        Ok(permit) => permit,
        Err(e) => return reject(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let pipeline = Arc::clone(&state.pipeline);
    let result = tokio::task::spawn_blocking(move || pipeline.process_video(&request))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Conversion task panicked: {}", e);
            ConversionResult::failure(format!("Conversion task failed: {}", e))
        });

    Json(result).into_response()
}
