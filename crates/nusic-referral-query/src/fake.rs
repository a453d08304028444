// SPDX-License-Identifier: Apache-2.0

use crate::{EdgeStore, QueryError};
use async_trait::async_trait;
use nusic_referral_model::{Address, EdgeRow, TeamId};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// In-memory edge store for crawler tests. Rows are returned in insertion
/// order, filtered the same way the SQLite query filters them.
pub struct FakeEdgeStore {
    pub edges: Mutex<Vec<EdgeRow>>,
    pub query_calls: AtomicU64,
    /// 1-based call number that fails with a store error.
    pub fail_on_call: Option<u64>,
    pub delay: Option<Duration>,
}

impl Default for FakeEdgeStore {
    fn default() -> Self {
        Self {
            edges: Mutex::new(Vec::new()),
            query_calls: AtomicU64::new(0),
            fail_on_call: None,
            delay: None,
        }
    }
}

impl FakeEdgeStore {
    #[must_use]
    pub fn with_edges(edges: Vec<EdgeRow>) -> Self {
        Self {
            edges: Mutex::new(edges),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn calls(&self) -> u64 {
        self.query_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EdgeStore for FakeEdgeStore {
    fn backend_tag(&self) -> &'static str {
        "fake"
    }

    async fn query_edges(
        &self,
        referers: &[Address],
        team: TeamId,
    ) -> Result<Vec<EdgeRow>, QueryError> {
        let call = self.query_calls.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on_call == Some(call) {
            return Err(QueryError::store(format!("injected failure on call {call}")));
        }
        let wanted: HashSet<&str> = referers.iter().map(Address::as_str).collect();
        let edges = self.edges.lock().await;
        Ok(edges
            .iter()
            .filter(|row| row.team == team && wanted.contains(row.referer.as_str()))
            .cloned()
            .collect())
    }
}
