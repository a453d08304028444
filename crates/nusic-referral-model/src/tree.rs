// SPDX-License-Identifier: Apache-2.0

use crate::address::Address;
use crate::reward::{normalize_reward, parse_raw_integer, Reward, RewardError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitedNode {
    pub address: Address,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
    pub number: Reward,
}

impl VisitedNode {
    /// Level-0 entry for the crawl root; it carries no reward of its own.
    #[must_use]
    pub fn root(address: Address) -> Self {
        Self {
            address,
            amount: Decimal::ZERO,
            rate: Decimal::ZERO,
            number: Reward::ZERO,
        }
    }

    pub fn from_raw(address: Address, amount: &str, rate: &str) -> Result<Self, RewardError> {
        let number = normalize_reward(amount, rate)?;
        Ok(Self {
            address,
            amount: parse_raw_integer("amount", amount)?,
            rate: parse_raw_integer("rate", rate)?,
            number,
        })
    }
}

/// Accumulated result of one crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralTree {
    pub list: Vec<VisitedNode>,
    pub count: usize,
    pub funded_list: Vec<VisitedNode>,
    pub funded_count: usize,
    /// Levels actually expanded, equal to the number of store queries issued.
    pub levels: usize,
    /// Rows dropped because their amount or rate could not be normalized.
    pub skipped_rows: usize,
}

impl ReferralTree {
    #[must_use]
    pub fn new(
        list: Vec<VisitedNode>,
        funded_list: Vec<VisitedNode>,
        levels: usize,
        skipped_rows: usize,
    ) -> Self {
        Self {
            count: list.len(),
            funded_count: funded_list.len(),
            list,
            funded_list,
            levels,
            skipped_rows,
        }
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.list.iter().map(|n| n.address.as_str())
    }

    pub fn funded_addresses(&self) -> impl Iterator<Item = &str> {
        self.funded_list.iter().map(|n| n.address.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visited_node_serializes_exact_raw_fields_and_float_number() {
        let node = VisitedNode::from_raw(
            Address::parse("0xb").expect("address"),
            "1000000000000000000000",
            "500",
        )
        .expect("node");
        let value = serde_json::to_value(&node).expect("json");
        assert_eq!(value["address"], "0xb");
        assert_eq!(value["amount"], "1000000000000000000000");
        assert_eq!(value["rate"], "500");
        assert_eq!(value["number"], 0.5);
    }

    #[test]
    fn referral_tree_uses_camel_case_wire_names() {
        let root = VisitedNode::root(Address::parse("0xa").expect("address"));
        let tree = ReferralTree::new(vec![root.clone()], vec![root], 0, 0);
        let value = serde_json::to_value(&tree).expect("json");
        assert_eq!(value["count"], 1);
        assert_eq!(value["fundedCount"], 1);
        assert_eq!(value["skippedRows"], 0);
        assert_eq!(value["fundedList"][0]["number"], 0.0);
    }
}
