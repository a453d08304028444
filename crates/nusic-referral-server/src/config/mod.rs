// SPDX-License-Identifier: Apache-2.0

use nusic_referral_query::{StoreConfig, MAX_CRAWL_LEVELS};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// Prefix for the referral endpoints, e.g. `/api`. Empty mounts them at
    /// the root.
    pub base_path: String,
    /// Public origin used when building NFT image URLs.
    pub public_base_url: String,
    pub images_dir: PathBuf,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    pub sql_timeout: Duration,
    pub max_crawl_levels: usize,
    pub cors_allowed_origins: Vec<String>,
    pub enable_audit_log: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: "/api".to_string(),
            public_base_url: "http://127.0.0.1:8080".to_string(),
            images_dir: PathBuf::from("images"),
            max_body_bytes: 16 * 1024,
            request_timeout: Duration::from_secs(5),
            sql_timeout: Duration::from_millis(800),
            max_crawl_levels: MAX_CRAWL_LEVELS,
            cors_allowed_origins: vec![
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:3000".to_string(),
                "https://nusic.vip".to_string(),
                "https://box.nusic.vip".to_string(),
                "https://www.nusic.vip".to_string(),
                "https://mysterybox-web.vercel.app".to_string(),
            ],
            enable_audit_log: false,
        }
    }
}

pub fn validate_startup_config_contract(
    api: &ApiConfig,
    store: &StoreConfig,
) -> Result<(), String> {
    if api.max_body_bytes == 0 {
        return Err("max_body_bytes must be > 0".to_string());
    }
    if api.request_timeout.is_zero() || api.sql_timeout.is_zero() {
        return Err("timeouts must be > 0".to_string());
    }
    if api.sql_timeout > api.request_timeout {
        return Err("sql_timeout must not exceed request_timeout".to_string());
    }
    if !api.base_path.is_empty()
        && (!api.base_path.starts_with('/') || api.base_path.ends_with('/'))
    {
        return Err(format!(
            "base_path must be empty or start with '/' and not end with '/': {:?}",
            api.base_path
        ));
    }
    if api.max_crawl_levels > MAX_CRAWL_LEVELS {
        return Err(format!(
            "max_crawl_levels must be <= {MAX_CRAWL_LEVELS}"
        ));
    }
    if store.max_connections == 0 || store.batch_size == 0 {
        return Err("store capacity limits must be > 0".to_string());
    }
    nusic_referral_query::validate_table_name(&store.referral_table)
        .map_err(|e| e.to_string())?;
    nusic_referral_query::validate_table_name(&store.nft_table).map_err(|e| e.to_string())?;
    Ok(())
}
