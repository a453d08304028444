// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

const METRIC_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Latency samples kept per route; older samples are dropped first.
const MAX_LATENCY_SAMPLES: usize = 2_048;

/// In-process request and crawl counters rendered at `/metrics`.
#[derive(Default)]
pub struct RequestMetrics {
    counts: Mutex<HashMap<(String, u16), u64>>,
    latency_ns: Mutex<HashMap<String, Vec<u64>>>,
    crawls: AtomicU64,
    crawl_levels: AtomicU64,
    crawl_skipped_rows: AtomicU64,
}

fn percentile_ns(values: &[u64], pct: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut v = values.to_vec();
    v.sort_unstable();
    let idx = ((v.len() as f64 - 1.0) * pct).round() as usize;
    v[idx.min(v.len() - 1)]
}

impl RequestMetrics {
    pub async fn observe_request(&self, route: &str, status: StatusCode, latency: Duration) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency_ns.lock().await;
        let samples = latency_map.entry(route.to_string()).or_default();
        if samples.len() >= MAX_LATENCY_SAMPLES {
            samples.remove(0);
        }
        samples.push(u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX));
    }

    pub fn observe_crawl(&self, levels: usize, skipped_rows: usize) {
        self.crawls.fetch_add(1, Ordering::Relaxed);
        self.crawl_levels
            .fetch_add(levels as u64, Ordering::Relaxed);
        self.crawl_skipped_rows
            .fetch_add(skipped_rows as u64, Ordering::Relaxed);
    }

    pub async fn request_count(&self, route: &str, status: u16) -> u64 {
        self.counts
            .lock()
            .await
            .get(&(route.to_string(), status))
            .copied()
            .unwrap_or(0)
    }

    /// Prometheus text exposition of every counter. Lines are sorted so the
    /// output is stable between scrapes.
    pub async fn render(&self, available_connections: usize) -> String {
        let mut body = String::new();
        let _ = writeln!(
            body,
            "nusic_build_info{{version=\"{METRIC_VERSION}\"}} 1"
        );

        let mut counts: Vec<((String, u16), u64)> = self
            .counts
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        counts.sort();
        for ((route, status), n) in counts {
            let _ = writeln!(
                body,
                "nusic_http_requests_total{{route=\"{route}\",status=\"{status}\"}} {n}"
            );
        }

        let mut latency: Vec<(String, Vec<u64>)> = self
            .latency_ns
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        latency.sort_by(|a, b| a.0.cmp(&b.0));
        for (route, samples) in latency {
            for (label, pct) in [("0.5", 0.5), ("0.95", 0.95), ("0.99", 0.99)] {
                let seconds = percentile_ns(&samples, pct) as f64 / 1e9;
                let _ = writeln!(
                    body,
                    "nusic_http_request_latency_seconds{{route=\"{route}\",quantile=\"{label}\"}} {seconds:.6}"
                );
            }
        }

        let _ = writeln!(
            body,
            "nusic_crawl_total {}\nnusic_crawl_levels_total {}\nnusic_crawl_skipped_rows_total {}\nnusic_store_available_connections {available_connections}",
            self.crawls.load(Ordering::Relaxed),
            self.crawl_levels.load(Ordering::Relaxed),
            self.crawl_skipped_rows.load(Ordering::Relaxed),
        );
        body
    }
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> Response {
    let body = state
        .metrics
        .render(state.store.pool().available_permits())
        .await;
    let mut resp = (StatusCode::OK, body).into_response();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_picks_nearest_rank() {
        assert_eq!(percentile_ns(&[], 0.95), 0);
        assert_eq!(percentile_ns(&[5, 1, 3], 0.5), 3);
        assert_eq!(percentile_ns(&[5, 1, 3], 0.99), 5);
    }

    #[tokio::test]
    async fn render_lists_requests_and_crawl_counters() {
        let metrics = RequestMetrics::default();
        metrics
            .observe_request("/api/getAllReferee", StatusCode::OK, Duration::from_millis(3))
            .await;
        metrics
            .observe_request("/api/getAllReferee", StatusCode::OK, Duration::from_millis(5))
            .await;
        metrics.observe_crawl(3, 1);
        assert_eq!(metrics.request_count("/api/getAllReferee", 200).await, 2);

        let text = metrics.render(4).await;
        assert!(text.contains(
            "nusic_http_requests_total{route=\"/api/getAllReferee\",status=\"200\"} 2"
        ));
        assert!(text.contains("nusic_crawl_total 1"));
        assert!(text.contains("nusic_crawl_levels_total 3"));
        assert!(text.contains("nusic_crawl_skipped_rows_total 1"));
        assert!(text.contains("nusic_store_available_connections 4"));
        assert!(text.contains("quantile=\"0.95\""));
    }
}
