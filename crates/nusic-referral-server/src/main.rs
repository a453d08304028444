// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use nusic_referral_query::{SqliteStore, StoreConfig};
use nusic_referral_server::{build_router, validate_startup_config_contract, ApiConfig, AppState};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default: Duration) -> Duration {
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(env_u64(name, default_ms))
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_list(name: &str) -> Option<Vec<String>> {
    let raw = env::var(name).ok()?;
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
    )
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                warn!("signal handlers unavailable; falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("NUSIC_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn load_config() -> (ApiConfig, StoreConfig) {
    let api_defaults = ApiConfig::default();
    let api_cfg = ApiConfig {
        base_path: env_string("NUSIC_API_BASE_PATH", &api_defaults.base_path),
        public_base_url: env_string("NUSIC_BASE_URL", &api_defaults.public_base_url),
        images_dir: env::var("NUSIC_IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| api_defaults.images_dir.clone()),
        max_body_bytes: env_usize("NUSIC_MAX_BODY_BYTES", api_defaults.max_body_bytes),
        request_timeout: env_duration_ms("NUSIC_REQUEST_TIMEOUT_MS", api_defaults.request_timeout),
        sql_timeout: env_duration_ms("NUSIC_SQL_TIMEOUT_MS", api_defaults.sql_timeout),
        max_crawl_levels: env_usize("NUSIC_MAX_CRAWL_LEVELS", api_defaults.max_crawl_levels),
        cors_allowed_origins: env_list("NUSIC_CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| api_defaults.cors_allowed_origins.clone()),
        enable_audit_log: env_bool("NUSIC_ENABLE_AUDIT_LOG", api_defaults.enable_audit_log),
    };
    let store_defaults = StoreConfig::default();
    let store_cfg = StoreConfig {
        db_path: env::var("NUSIC_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| store_defaults.db_path.clone()),
        referral_table: env_string("NUSIC_TABLE_NAME", &store_defaults.referral_table),
        nft_table: env_string("NUSIC_NFT_TABLE_NAME", &store_defaults.nft_table),
        max_connections: env_usize("NUSIC_MAX_CONNECTIONS", store_defaults.max_connections),
        batch_size: env_usize("NUSIC_BATCH_SIZE", store_defaults.batch_size),
        statement_timeout: api_cfg.sql_timeout,
        ..store_defaults
    };
    (api_cfg, store_cfg)
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env_string("NUSIC_BIND", "0.0.0.0:8080");
    let (api_cfg, store_cfg) = load_config();
    validate_startup_config_contract(&api_cfg, &store_cfg)?;

    let store = SqliteStore::open(store_cfg)
        .await
        .map_err(|e| format!("store open failed: {e}"))?;
    let state = AppState::new(Arc::new(store), api_cfg);
    let app = build_router(state.clone());

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!(
        base_path = %state.api.base_path,
        db_path = %state.store.config().db_path.display(),
        "nusic-referral-server listening on {bind_addr}"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            let drain_ms = env_u64("NUSIC_SHUTDOWN_DRAIN_MS", 2000);
            info!(drain_ms, "shutdown signal received; draining");
            tokio::time::sleep(Duration::from_millis(drain_ms)).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
