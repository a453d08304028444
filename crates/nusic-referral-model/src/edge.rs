// SPDX-License-Identifier: Apache-2.0

use crate::address::TeamId;
use crate::reward::Reward;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One referral row exactly as the store returned it. Numeric columns are
/// kept as text because their magnitude exceeds 64-bit integers; parsing
/// happens in the reward normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub referer: String,
    pub referee: String,
    pub amount: String,
    pub rate: String,
    pub funded: bool,
    pub team: TeamId,
}

impl EdgeRow {
    #[must_use]
    pub fn new(
        referer: impl Into<String>,
        referee: impl Into<String>,
        amount: impl Into<String>,
        rate: impl Into<String>,
        funded: bool,
        team: TeamId,
    ) -> Self {
        Self {
            referer: referer.into(),
            referee: referee.into(),
            amount: amount.into(),
            rate: rate.into(),
            funded,
            team,
        }
    }
}

/// Direct referee listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralEdge {
    pub referer: String,
    pub referee: String,
    pub funded: u8,
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub number: Reward,
    pub team: TeamId,
}

/// Leaderboard entry. `count` is the summed normalized reward; `referrals` is
/// the number of edges that contributed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefererScore {
    pub referer: String,
    pub count: Reward,
    pub referrals: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftToken {
    pub chain_id: i64,
    pub nft_address: String,
    pub token_id: String,
}
