// SPDX-License-Identifier: Apache-2.0

use nusic_referral_model::{Address, VisitedNode};
use std::collections::HashSet;

/// Returns the candidates whose address is absent from `already_visited`,
/// in batch order. A candidate repeated inside the batch keeps only its first
/// occurrence, so a node reachable through two referers of the same level is
/// attributed to whichever row the store returned first.
#[must_use]
pub fn dedupe(candidates: Vec<VisitedNode>, already_visited: &[VisitedNode]) -> Vec<VisitedNode> {
    let visited: HashSet<&Address> = already_visited.iter().map(|n| &n.address).collect();
    retain_unseen(candidates, |address| visited.contains(address))
}

fn retain_unseen(
    candidates: Vec<VisitedNode>,
    is_visited: impl Fn(&Address) -> bool,
) -> Vec<VisitedNode> {
    let mut in_batch: HashSet<Address> = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|node| !is_visited(&node.address) && in_batch.insert(node.address.clone()))
        .collect()
}

/// Ordered accumulator of visited nodes with an address index, so each
/// level's dedupe is linear in the batch size.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    nodes: Vec<VisitedNode>,
    index: HashSet<Address>,
}

impl VisitedSet {
    #[must_use]
    pub fn seeded(root: VisitedNode) -> Self {
        let mut set = Self::default();
        set.index.insert(root.address.clone());
        set.nodes.push(root);
        set
    }

    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains(address)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn nodes(&self) -> &[VisitedNode] {
        &self.nodes
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<VisitedNode> {
        self.nodes
    }

    /// Appends the unseen candidates and returns their addresses in the order
    /// they were appended.
    pub fn extend_unseen(&mut self, candidates: Vec<VisitedNode>) -> Vec<Address> {
        let survivors = retain_unseen(candidates, |address| self.index.contains(address));
        let mut added = Vec::with_capacity(survivors.len());
        for node in survivors {
            self.index.insert(node.address.clone());
            added.push(node.address.clone());
            self.nodes.push(node);
        }
        added
    }
}
