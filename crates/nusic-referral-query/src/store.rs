// SPDX-License-Identifier: Apache-2.0

use crate::QueryError;
use async_trait::async_trait;
use nusic_referral_model::{Address, EdgeRow, TeamId};

/// The only capability the crawler needs from storage: one batched
/// `referer IN (...)` lookup scoped to a team. An empty result is a valid
/// outcome meaning the frontier has no outgoing edges.
#[async_trait]
pub trait EdgeStore: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    async fn query_edges(
        &self,
        referers: &[Address],
        team: TeamId,
    ) -> Result<Vec<EdgeRow>, QueryError>;
}
