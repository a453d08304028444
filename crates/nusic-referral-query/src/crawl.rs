// SPDX-License-Identifier: Apache-2.0

use crate::frontier::VisitedSet;
use crate::{EdgeStore, QueryError};
use nusic_referral_model::{Address, EdgeRow, ReferralTree, TeamId, VisitedNode};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Hard ceiling on crawl depth regardless of what the caller asks for.
pub const MAX_CRAWL_LEVELS: usize = 50;

#[must_use]
pub fn effective_levels(requested: usize) -> usize {
    requested.min(MAX_CRAWL_LEVELS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    pub max_levels: usize,
    pub query_timeout: Duration,
    /// Overall budget; defaults to one `query_timeout` per effective level.
    pub deadline: Option<Duration>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_levels: MAX_CRAWL_LEVELS,
            query_timeout: Duration::from_millis(800),
            deadline: None,
        }
    }
}

impl CrawlOptions {
    #[must_use]
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            max_levels,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn overall_deadline(&self) -> Duration {
        self.deadline.unwrap_or_else(|| {
            let levels = u32::try_from(effective_levels(self.max_levels).max(1)).unwrap_or(1);
            self.query_timeout.saturating_mul(levels)
        })
    }
}

struct LevelBatch {
    referees: Vec<VisitedNode>,
    funded: Vec<VisitedNode>,
    skipped: usize,
}

/// Walks referer -> referee edges breadth-first from `root`.
///
/// Each expanded level issues exactly one `query_edges` call for the whole
/// frontier. The walk stops at the level cap, on an empty result, or when a
/// level discovers nothing new. Any store failure aborts the crawl.
pub async fn crawl<S: EdgeStore + ?Sized>(
    store: &S,
    root: &Address,
    team: TeamId,
    options: &CrawlOptions,
) -> Result<ReferralTree, QueryError> {
    let budget = options.overall_deadline();
    match timeout(budget, crawl_levels(store, root, team, options)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(root = %root, team = %team, budget_ms = budget.as_millis() as u64, "crawl deadline exceeded");
            Err(QueryError::timeout(format!(
                "crawl exceeded its deadline of {} ms",
                budget.as_millis()
            )))
        }
    }
}

async fn crawl_levels<S: EdgeStore + ?Sized>(
    store: &S,
    root: &Address,
    team: TeamId,
    options: &CrawlOptions,
) -> Result<ReferralTree, QueryError> {
    let started = Instant::now();
    let max_levels = effective_levels(options.max_levels);
    let mut all = VisitedSet::seeded(VisitedNode::root(root.clone()));
    let mut funded = VisitedSet::seeded(VisitedNode::root(root.clone()));
    let mut frontier = vec![root.clone()];
    let mut expanded = 0_usize;
    let mut skipped = 0_usize;

    while expanded < max_levels && !frontier.is_empty() {
        let rows = timeout(options.query_timeout, store.query_edges(&frontier, team))
            .await
            .map_err(|_| {
                QueryError::timeout(format!(
                    "edge query for level {} exceeded {} ms",
                    expanded + 1,
                    options.query_timeout.as_millis()
                ))
            })??;
        expanded += 1;
        if rows.is_empty() {
            break;
        }

        let row_count = rows.len();
        let batch = classify_rows(rows);
        skipped += batch.skipped;
        frontier = all.extend_unseen(batch.referees);
        funded.extend_unseen(batch.funded);
        debug!(
            level = expanded,
            rows = row_count,
            discovered = frontier.len(),
            "crawl level expanded"
        );
    }

    info!(
        root = %root,
        team = %team,
        backend = store.backend_tag(),
        levels = expanded,
        visited = all.len(),
        funded = funded.len(),
        skipped_rows = skipped,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "crawl complete"
    );
    Ok(ReferralTree::new(
        all.into_nodes(),
        funded.into_nodes(),
        expanded,
        skipped,
    ))
}

fn classify_rows(rows: Vec<EdgeRow>) -> LevelBatch {
    let mut batch = LevelBatch {
        referees: Vec::with_capacity(rows.len()),
        funded: Vec::new(),
        skipped: 0,
    };
    for row in rows {
        let address = match Address::parse(&row.referee) {
            Ok(v) => v,
            Err(e) => {
                warn!(referer = %row.referer, referee = %row.referee, "skipping edge: {e}");
                batch.skipped += 1;
                continue;
            }
        };
        let node = match VisitedNode::from_raw(address, &row.amount, &row.rate) {
            Ok(v) => v,
            Err(e) => {
                warn!(referer = %row.referer, referee = %row.referee, "skipping edge: {e}");
                batch.skipped += 1;
                continue;
            }
        };
        if row.funded {
            batch.funded.push(node.clone());
        }
        batch.referees.push(node);
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_levels_clamps_to_hard_cap() {
        assert_eq!(effective_levels(0), 0);
        assert_eq!(effective_levels(5), 5);
        assert_eq!(effective_levels(MAX_CRAWL_LEVELS), MAX_CRAWL_LEVELS);
        assert_eq!(effective_levels(usize::MAX), MAX_CRAWL_LEVELS);
    }

    #[test]
    fn overall_deadline_scales_with_effective_levels() {
        let options = CrawlOptions {
            max_levels: 500,
            query_timeout: Duration::from_millis(10),
            deadline: None,
        };
        assert_eq!(options.overall_deadline(), Duration::from_millis(500));
        let explicit = CrawlOptions {
            deadline: Some(Duration::from_secs(1)),
            ..options
        };
        assert_eq!(explicit.overall_deadline(), Duration::from_secs(1));
        assert_eq!(
            CrawlOptions::with_max_levels(0).overall_deadline(),
            Duration::from_millis(800)
        );
    }

    #[test]
    fn classify_rows_counts_malformed_rows_and_splits_funded() {
        let team = TeamId::default();
        let rows = vec![
            EdgeRow::new("a", "b", "1000000000000000000000", "500", true, team),
            EdgeRow::new("a", "c", "not-a-number", "500", true, team),
            EdgeRow::new("a", "", "1", "1", false, team),
            EdgeRow::new("a", "d", "0", "0", false, team),
        ];
        let batch = classify_rows(rows);
        assert_eq!(batch.skipped, 2);
        assert_eq!(batch.referees.len(), 2);
        assert_eq!(batch.funded.len(), 1);
        assert_eq!(batch.funded[0].address.as_str(), "b");
    }
}
