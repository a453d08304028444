// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use nusic_referral_query::SqliteStore;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

mod config;
mod http;
mod middleware;
mod telemetry;

pub use config::{validate_startup_config_contract, ApiConfig};
pub use telemetry::metrics::RequestMetrics;

pub const CRATE_NAME: &str = "nusic-referral-server";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub api: ApiConfig,
    pub metrics: Arc<RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<SqliteStore>, api: ApiConfig) -> Self {
        Self {
            store,
            api,
            metrics: Arc::new(RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

fn referral_routes() -> Router<AppState> {
    Router::new()
        .route("/test", get(http::handlers::hello_handler))
        .route(
            "/getTopReferers",
            post(http::handlers::top_referers_handler),
        )
        .route(
            "/getTopReferersByDate",
            post(http::handlers::top_referers_by_date_handler),
        )
        .route("/getAllReferee", post(http::handlers::all_referee_handler))
        .route(
            "/getDirectReferee",
            post(http::handlers::direct_referee_handler),
        )
        .route(
            "/getNFTsForOwner",
            post(http::handlers::nfts_for_owner_handler),
        )
        .route(
            "/metadata/:token_id",
            get(http::handlers::metadata_handler),
        )
}

pub fn build_router(state: AppState) -> Router {
    let base = Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/metrics", get(telemetry::metrics::metrics_handler))
        .route("/images/:file", get(http::static_files::image_handler));
    let app = if state.api.base_path.is_empty() {
        base.merge(referral_routes())
    } else {
        base.nest(&state.api.base_path, referral_routes())
    };
    app.fallback(http::handlers::not_found_handler)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::cors::cors_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::audit::audit_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
