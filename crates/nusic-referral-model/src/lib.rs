// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Referral model SSOT.
//!
//! Addresses, team partitions, raw edge rows as read from the store, visited
//! nodes produced by the crawler and the reward normalizer that turns raw
//! `(amount, rate)` integers into decimal rewards.

mod address;
mod edge;
mod reward;
mod tree;

pub use address::{Address, ParseError, TeamId, ADDRESS_MAX_LEN};
pub use edge::{EdgeRow, NftToken, ReferralEdge, RefererScore};
pub use reward::{
    normalize_reward, parse_raw_integer, Reward, RewardError, REWARD_SCALE_EXPONENT,
};
pub use rust_decimal::Decimal;
pub use tree::{ReferralTree, VisitedNode};

pub const CRATE_NAME: &str = "nusic-referral-model";
