//! File retrieval endpoint
//!
//! Only bare filenames inside the output directory are served. Anything that
//! could walk out of it is refused before the filesystem is touched.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::Component;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use super::handlers::HttpError;
use crate::state::AppState;

/// RFC 5987 `attr-char` minus alphanumerics
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Accept `name` only if it is a single normal path component
pub fn validate_filename(name: &str) -> Result<&str, HttpError> {
    if name.contains(|c: char| matches!(c, '/' | '\\' | '\0')) {
        return Err(HttpError::BadRequest("Invalid filename".to_string()));
    }

    let mut components = std::path::Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(HttpError::BadRequest("Invalid filename".to_string())),
    }
}

/// Content type by extension
pub fn content_type_for(name: &str) -> &'static str {
    let ext = std::path::Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

/// `attachment` disposition with an ASCII fallback and a UTF-8 `filename*`
pub fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(name, ATTR_CHAR)
    )
}

/// Serve a finished file, streamed from disk
/// GET /download/{filename}
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpError> {
    let name = validate_filename(&filename)?;
    let path = state.config.output_dir.join(name);

    let metadata = tokio::fs::metadata(&path).await?;
    if !metadata.is_file() {
        return Err(HttpError::NotFound("File not found".to_string()));
    }
    let file = tokio::fs::File::open(&path).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(name)),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(name))
            .map_err(|e| HttpError::InternalError(e.to_string()))?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()));

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((headers, body).into_response())
}
