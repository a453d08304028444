// SPDX-License-Identifier: Apache-2.0

use crate::pool::ConnectionPool;
use crate::window::TimeWindow;
use crate::{EdgeStore, QueryError, QueryErrorCode};
use async_trait::async_trait;
use nusic_referral_model::{
    normalize_reward, parse_raw_integer, Address, EdgeRow, NftToken, ReferralEdge, RefererScore,
    Reward, TeamId,
};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const MAX_TABLE_NAME_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub referral_table: String,
    pub nft_table: String,
    pub max_connections: usize,
    /// Upper bound on addresses bound into one `IN (...)` statement.
    pub batch_size: usize,
    pub acquire_timeout: Duration,
    pub statement_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("artifacts/referral.sqlite"),
            referral_table: "referrals".to_string(),
            nft_table: "nft_owners".to_string(),
            max_connections: 8,
            batch_size: 500,
            acquire_timeout: Duration::from_millis(500),
            statement_timeout: Duration::from_millis(800),
        }
    }
}

/// Table names cannot be bound as parameters, so they are restricted to plain
/// identifiers before being spliced into SQL text.
pub fn validate_table_name(name: &str) -> Result<(), QueryError> {
    let mut chars = name.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_head
        || name.len() > MAX_TABLE_NAME_LEN
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(QueryError::invalid_input(format!(
            "invalid table name: {name:?}"
        )));
    }
    Ok(())
}

/// What a leaderboard ranks by and reports in `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardRanking {
    /// Summed normalized reward.
    RewardSum,
    /// Number of referrals; the reward sum breaks ties.
    ReferralCount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectReferees {
    pub list: Vec<ReferralEdge>,
    pub skipped_rows: usize,
}

pub struct SqliteStore {
    cfg: StoreConfig,
    pool: ConnectionPool,
}

impl SqliteStore {
    pub fn new(cfg: StoreConfig) -> Result<Self, QueryError> {
        validate_table_name(&cfg.referral_table)?;
        validate_table_name(&cfg.nft_table)?;
        if cfg.batch_size == 0 {
            return Err(QueryError::invalid_input("batch_size must be > 0"));
        }
        let pool = ConnectionPool::new(
            cfg.db_path.clone(),
            cfg.max_connections,
            cfg.acquire_timeout,
            cfg.statement_timeout,
        );
        Ok(Self { cfg, pool })
    }

    /// Builds the store and checks that the database can be opened.
    pub async fn open(cfg: StoreConfig) -> Result<Self, QueryError> {
        let store = Self::new(cfg)?;
        store.pool.warm_up().await?;
        Ok(store)
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    #[must_use]
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Referers with edges created inside `window`, best first.
    pub async fn top_referers(
        &self,
        team: TeamId,
        window: TimeWindow,
        limit: usize,
        ranking: LeaderboardRanking,
    ) -> Result<Vec<RefererScore>, QueryError> {
        let sql = format!(
            "SELECT referer, amount, rate FROM {} WHERE team = ?1 AND createAt >= ?2 AND createAt <= ?3",
            self.cfg.referral_table
        );
        self.pool
            .run(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                let mut rows = stmt.query(rusqlite::params![team.get(), window.start, window.end])?;
                let mut scores: BTreeMap<String, (Reward, u64)> = BTreeMap::new();
                while let Some(row) = rows.next()? {
                    let referer = text_column(row, 0)?;
                    let amount = numeric_text(row.get_ref(1)?);
                    let rate = numeric_text(row.get_ref(2)?);
                    let number = match normalize_reward(&amount, &rate) {
                        Ok(v) => v,
                        Err(e) => {
                            warn!(referer = %referer, "leaderboard row skipped: {e}");
                            continue;
                        }
                    };
                    let entry = scores.entry(referer).or_insert((Reward::ZERO, 0));
                    entry.0 = entry.0.checked_add(number).ok_or_else(|| {
                        QueryError::new(
                            QueryErrorCode::InvalidNumericInput,
                            "leaderboard reward sum overflowed",
                        )
                    })?;
                    entry.1 += 1;
                }
                Ok(rank_scores(scores, limit, ranking))
            })
            .await
    }

    pub async fn direct_referees(
        &self,
        referer: &Address,
        team: TeamId,
    ) -> Result<DirectReferees, QueryError> {
        let sql = format!(
            "SELECT referer, referee, amount, rate, funded, team FROM {} WHERE referer = ?1 AND team = ?2 ORDER BY rowid",
            self.cfg.referral_table
        );
        let referer = referer.as_str().to_string();
        self.pool
            .run(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                let mut rows = stmt.query(rusqlite::params![referer, team.get()])?;
                let mut out = DirectReferees {
                    list: Vec::new(),
                    skipped_rows: 0,
                };
                while let Some(row) = rows.next()? {
                    let edge = decode_edge(row)?;
                    match referral_edge(&edge) {
                        Ok(v) => out.list.push(v),
                        Err(e) => {
                            warn!(referer = %edge.referer, referee = %edge.referee, "direct referee skipped: {e}");
                            out.skipped_rows += 1;
                        }
                    }
                }
                Ok(out)
            })
            .await
    }

    /// Tokens of `nft_address` on `chain_id` held by `owner`; both addresses
    /// compare case-insensitively.
    pub async fn nfts_for_owner(
        &self,
        chain_id: i64,
        owner: &str,
        nft_address: &str,
    ) -> Result<Vec<NftToken>, QueryError> {
        let sql = format!(
            "SELECT chainId, nftAddress, tokenId FROM {} WHERE chainId = ?1 AND lower(owner) = lower(?2) AND lower(nftAddress) = lower(?3) ORDER BY rowid",
            self.cfg.nft_table
        );
        let owner = owner.to_string();
        let nft_address = nft_address.to_string();
        self.pool
            .run(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                let rows = stmt.query_map(rusqlite::params![chain_id, owner, nft_address], |row| {
                    Ok(NftToken {
                        chain_id: row.get(0)?,
                        nft_address: text_column(row, 1)?,
                        token_id: numeric_text(row.get_ref(2)?),
                    })
                })?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
    }
}

#[async_trait]
impl EdgeStore for SqliteStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn query_edges(
        &self,
        referers: &[Address],
        team: TeamId,
    ) -> Result<Vec<EdgeRow>, QueryError> {
        if referers.is_empty() {
            return Ok(Vec::new());
        }
        let table = self.cfg.referral_table.clone();
        let chunks: Vec<Vec<String>> = referers
            .chunks(self.cfg.batch_size)
            .map(|chunk| chunk.iter().map(|a| a.as_str().to_string()).collect())
            .collect();
        self.pool
            .run(move |conn| {
                let mut out = Vec::new();
                for chunk in &chunks {
                    query_edge_chunk(conn, &table, chunk, team, &mut out)?;
                }
                Ok(out)
            })
            .await
    }
}

fn query_edge_chunk(
    conn: &Connection,
    table: &str,
    referers: &[String],
    team: TeamId,
    out: &mut Vec<EdgeRow>,
) -> Result<(), QueryError> {
    let sql = format!(
        "SELECT referer, referee, amount, rate, funded, team FROM {table} WHERE team = ?1 AND referer IN ({}) ORDER BY rowid",
        placeholders(2, referers.len())
    );
    let mut params: Vec<Value> = Vec::with_capacity(referers.len() + 1);
    params.push(Value::Integer(team.get()));
    params.extend(referers.iter().cloned().map(Value::Text));
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    while let Some(row) = rows.next()? {
        out.push(decode_edge(row)?);
    }
    Ok(())
}

fn rank_scores(
    scores: BTreeMap<String, (Reward, u64)>,
    limit: usize,
    ranking: LeaderboardRanking,
) -> Vec<RefererScore> {
    let mut ranked: Vec<(String, Reward, u64)> = scores
        .into_iter()
        .map(|(referer, (sum, referrals))| (referer, sum, referrals))
        .collect();
    match ranking {
        LeaderboardRanking::RewardSum => {
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        }
        LeaderboardRanking::ReferralCount => ranked.sort_by(|a, b| {
            b.2.cmp(&a.2)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.0.cmp(&b.0))
        }),
    }
    ranked.truncate(limit);
    ranked
        .into_iter()
        .map(|(referer, sum, referrals)| RefererScore {
            referer,
            count: match ranking {
                LeaderboardRanking::RewardSum => sum,
                LeaderboardRanking::ReferralCount => Reward::whole(referrals),
            },
            referrals,
        })
        .collect()
}

/// `?first, ?first+1, ...` for `count` bound values.
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn decode_edge(row: &Row<'_>) -> Result<EdgeRow, QueryError> {
    Ok(EdgeRow {
        referer: text_column(row, 0)?,
        referee: text_column(row, 1)?,
        amount: numeric_text(row.get_ref(2)?),
        rate: numeric_text(row.get_ref(3)?),
        funded: flag_is_set(row.get_ref(4)?),
        team: TeamId(row.get::<_, Option<i64>>(5)?.unwrap_or_default()),
    })
}

fn referral_edge(edge: &EdgeRow) -> Result<ReferralEdge, QueryError> {
    Ok(ReferralEdge {
        referer: edge.referer.clone(),
        referee: edge.referee.clone(),
        funded: u8::from(edge.funded),
        rate: parse_raw_integer("rate", &edge.rate)?,
        amount: parse_raw_integer("amount", &edge.amount)?,
        number: normalize_reward(&edge.amount, &edge.rate)?,
        team: edge.team,
    })
}

fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Null | ValueRef::Blob(_) => String::new(),
    })
}

/// Raw textual form of a numeric column. Anything that is not an integer
/// representation comes out in a form the reward normalizer will reject.
fn numeric_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).trim().to_string(),
        ValueRef::Null | ValueRef::Blob(_) => String::new(),
    }
}

fn flag_is_set(value: ValueRef<'_>) -> bool {
    match value {
        ValueRef::Integer(i) => i == 1,
        ValueRef::Real(f) => f == 1.0,
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            == Some(1),
        ValueRef::Null | ValueRef::Blob(_) => false,
    }
}
