//! Response construction.
//!
//! # Responsibilities
//! - Turn a resolver `Decision` into an HTTP response
//! - Pick a best-effort content type from the file name
//! - Map compile failures to 500
//!
//! # Design Decisions
//! - Bodies are read whole; files in a dev tree are small
//! - No caching headers, every response reflects the disk

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::path::Path;

use crate::compile::CompileError;
use crate::routing::Decision;

/// Best-effort content type for a file path.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Response carrying `body` with the given content type.
pub fn bytes_response(content_type: &str, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    let value = HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    response.headers_mut().insert(header::CONTENT_TYPE, value);
    response
}

/// Response for a file read from disk.
pub fn file_response(path: &Path, body: Bytes) -> Response {
    bytes_response(&content_type_for(path), body)
}

impl IntoResponse for Decision {
    fn into_response(self) -> Response {
        match self {
            Decision::Compiled { asset, .. } => bytes_response(&asset.content_type, asset.body),
            Decision::Static { path, body } | Decision::Fallback { path, body } => {
                file_response(&path, body)
            }
            Decision::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        }
    }
}

impl IntoResponse for CompileError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Compile error: {}", self),
        )
            .into_response()
    }
}
