// SPDX-License-Identifier: Apache-2.0

use crate::http::request_tracing::normalized_header_value;
use crate::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const ALLOW_METHODS: &str = "GET,POST,OPTIONS";
const ALLOW_HEADERS: &str = "content-type,authorization,accept,x-request-id";
const EXPOSE_HEADERS: &str = "www-authenticate,server-authorization,x-request-id";
const MAX_AGE_SECS: &str = "5";

fn allowed_origin(state: &AppState, origin: Option<String>) -> Option<HeaderValue> {
    let origin = origin?;
    if !state.api.cors_allowed_origins.iter().any(|x| x == &origin) {
        return None;
    }
    HeaderValue::from_str(&origin).ok()
}

fn put_allow_origin(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert("access-control-allow-origin", origin);
    headers.insert(
        "access-control-allow-credentials",
        HeaderValue::from_static("true"),
    );
    headers.insert("vary", HeaderValue::from_static("Origin"));
}

/// Echoes allow-listed origins. Requests without an `Origin` header pass
/// through untouched; unknown origins get no CORS headers.
pub(crate) async fn cors_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = allowed_origin(&state, normalized_header_value(req.headers(), "origin", 256));
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        if let Some(origin) = origin {
            let headers = resp.headers_mut();
            put_allow_origin(headers, origin);
            headers.insert(
                "access-control-allow-methods",
                HeaderValue::from_static(ALLOW_METHODS),
            );
            headers.insert(
                "access-control-allow-headers",
                HeaderValue::from_static(ALLOW_HEADERS),
            );
            headers.insert(
                "access-control-max-age",
                HeaderValue::from_static(MAX_AGE_SECS),
            );
        }
        return resp;
    }

    let mut resp = next.run(req).await;
    if let Some(origin) = origin {
        let headers = resp.headers_mut();
        put_allow_origin(headers, origin);
        headers.insert(
            "access-control-expose-headers",
            HeaderValue::from_static(EXPOSE_HEADERS),
        );
    }
    resp
}
