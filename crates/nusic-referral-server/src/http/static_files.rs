// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";

/// Content type for a servable image name, `None` for anything else. Names
/// are single path segments of `[A-Za-z0-9._-]` without a leading dot.
fn image_content_type(file: &str) -> Option<&'static str> {
    if file.is_empty()
        || file.starts_with('.')
        || !file
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
    {
        return None;
    }
    let (_, ext) = file.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

pub(crate) async fn image_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Response {
    let Some(content_type) = image_content_type(&file) else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };
    let path = state.api.images_dir.join(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mut resp = (StatusCode::OK, bytes).into_response();
            resp.headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            resp.headers_mut().insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static(IMAGE_CACHE_CONTROL),
            );
            resp
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), "image read failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "image unavailable").into_response()
        }
    }
}
