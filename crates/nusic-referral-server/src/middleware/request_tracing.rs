// SPDX-License-Identifier: Apache-2.0

use crate::http::request_tracing::{extract_request_trace, RequestTrace};
use crate::AppState;
use axum::body::Body;
use axum::extract::{MatchedPath, State};
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::Instrument;

pub(crate) async fn request_tracing_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());
    let trace = extract_request_trace(request.headers(), &state);
    request.extensions_mut().insert(trace.clone());

    let span = tracing::info_span!(
        "http.request",
        request_id = %trace.request_id,
        method = %method,
        route = %route,
    );

    let mut response = next.run(request).instrument(span).await;
    state
        .metrics
        .observe_request(&route, response.status(), started.elapsed())
        .await;
    if let Ok(value) = HeaderValue::from_str(&trace.request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Trace attached by [`request_tracing_middleware`], if it ran.
pub(crate) fn request_trace(request: &Request<Body>) -> Option<&RequestTrace> {
    request.extensions().get::<RequestTrace>()
}
