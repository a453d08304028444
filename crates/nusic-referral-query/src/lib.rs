// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Referral graph queries.
//!
//! The level crawler walks referer -> referee edges outward from a root
//! address through the [`EdgeStore`] boundary. [`SqliteStore`] implements that
//! boundary over a pooled, read-only SQLite database and also serves the
//! leaderboard, direct-referee and NFT ownership lookups.

mod crawl;
mod fake;
mod frontier;
mod pool;
mod query_error;
mod sqlite;
mod store;
mod window;

pub use crawl::{crawl, effective_levels, CrawlOptions, MAX_CRAWL_LEVELS};
pub use fake::FakeEdgeStore;
pub use frontier::{dedupe, VisitedSet};
pub use pool::ConnectionPool;
pub use query_error::{QueryError, QueryErrorCode};
pub use sqlite::{
    validate_table_name, DirectReferees, LeaderboardRanking, SqliteStore, StoreConfig,
};
pub use store::EdgeStore;
pub use window::{unix_now, utc_day_start, TimeWindow, SECONDS_PER_DAY};

pub const CRATE_NAME: &str = "nusic-referral-query";
