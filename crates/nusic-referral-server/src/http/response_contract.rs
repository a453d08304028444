// SPDX-License-Identifier: Apache-2.0

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use nusic_referral_api::{map_error, ApiEnvelope, ApiError};
use serde::Serialize;
use tracing::{error, warn};

#[must_use]
pub(crate) fn api_error_status(err: &ApiError) -> StatusCode {
    StatusCode::from_u16(map_error(err).status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[must_use]
pub(crate) fn api_error_response(err: &ApiError) -> Response {
    let status = api_error_status(err);
    if map_error(err).server_fault {
        error!(code = err.code.as_str(), status = status.as_u16(), "request failed: {}", err.message);
    } else if status != StatusCode::OK {
        warn!(code = err.code.as_str(), status = status.as_u16(), "request rejected: {}", err.message);
    }
    let mut resp = (status, Json(ApiEnvelope::<()>::failure(err))).into_response();
    if status == StatusCode::SERVICE_UNAVAILABLE {
        resp.headers_mut()
            .insert("retry-after", HeaderValue::from_static("1"));
    }
    resp
}

#[must_use]
pub(crate) fn envelope_response<T: Serialize>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiEnvelope::ok(data))).into_response(),
        Err(err) => api_error_response(&err),
    }
}
