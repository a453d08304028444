// SPDX-License-Identifier: Apache-2.0

use nusic_referral_model::{Address, EdgeRow, TeamId};
use nusic_referral_query::{crawl, CrawlOptions, FakeEdgeStore};
use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};

fn node_name(i: u8) -> String {
    format!("0x{i:02x}")
}

fn graph_strategy() -> impl Strategy<Value = Vec<(u8, u8, bool)>> {
    proptest::collection::vec((0_u8..12, 0_u8..12, any::<bool>()), 0..40)
}

fn reachable(edges: &[(u8, u8, bool)], root: u8) -> HashSet<String> {
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    while let Some(at) = queue.pop_front() {
        for (from, to, _) in edges {
            if *from == at && seen.insert(*to) {
                queue.push_back(*to);
            }
        }
    }
    seen.into_iter().map(node_name).collect()
}

proptest! {
    #[test]
    fn crawl_visits_each_reachable_node_exactly_once(edges in graph_strategy(), root in 0_u8..12) {
        let rows: Vec<EdgeRow> = edges
            .iter()
            .map(|(from, to, funded)| {
                EdgeRow::new(node_name(*from), node_name(*to), "1000", "1", *funded, TeamId::default())
            })
            .collect();
        let store = FakeEdgeStore::with_edges(rows);
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        let root_addr = Address::parse(&node_name(root)).expect("address");
        let tree = rt
            .block_on(crawl(&store, &root_addr, TeamId::default(), &CrawlOptions::default()))
            .expect("crawl");

        let listed: Vec<&str> = tree.addresses().collect();
        let unique: HashSet<&str> = listed.iter().copied().collect();
        prop_assert_eq!(listed.len(), unique.len());
        let root_name = node_name(root);
        prop_assert_eq!(listed.first().copied(), Some(root_name.as_str()));

        let expected = reachable(&edges, root);
        let got: HashSet<String> = unique.iter().map(|s| (*s).to_string()).collect();
        prop_assert_eq!(got, expected);

        let funded: HashSet<&str> = tree.funded_addresses().collect();
        prop_assert!(funded.is_subset(&unique));
        prop_assert_eq!(tree.funded_count, tree.funded_list.len());
        prop_assert!(tree.levels <= 12);
        prop_assert_eq!(store.calls(), tree.levels as u64);
    }
}
