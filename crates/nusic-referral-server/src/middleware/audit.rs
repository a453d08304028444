// SPDX-License-Identifier: Apache-2.0

use crate::middleware::request_tracing::request_trace;
use crate::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::info;

pub(crate) async fn audit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.api.enable_audit_log {
        return next.run(req).await;
    }
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let (request_id, client_ip) = request_trace(&req).map_or_else(
        || (String::new(), "unknown".to_string()),
        |t| (t.request_id.clone(), t.client_ip.clone()),
    );
    let resp = next.run(req).await;
    info!(
        target: "nusic_audit",
        method = %method,
        path = %path,
        status = resp.status().as_u16(),
        request_id = %request_id,
        client_ip = %client_ip,
        latency_ms = started.elapsed().as_millis() as u64,
        "audit"
    );
    resp
}
