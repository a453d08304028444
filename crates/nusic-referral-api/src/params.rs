// SPDX-License-Identifier: Apache-2.0

use crate::dto::{
    AllRefereeRequest, DirectRefereeRequest, IntParam, NftsForOwnerRequest,
    TopReferersByDateRequest, TopReferersRequest,
};
use crate::errors::ApiError;
use nusic_referral_model::{Address, TeamId};
use nusic_referral_query::effective_levels;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardParams {
    pub team: TeamId,
    pub limit: usize,
    /// Any instant inside the requested UTC day; `None` means today.
    pub day: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlParams {
    pub address: Address,
    pub team: TeamId,
    pub levels: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectParams {
    pub address: Address,
    pub team: TeamId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftOwnerParams {
    pub owner: Address,
    pub chain_id: i64,
    pub nft_address: Address,
}

/// Integer prefix of `raw` after leading whitespace: `" 42abc"` is 42,
/// `"-7"` is -7, `"abc"` and `""` have none. Values outside `i64` have none.
#[must_use]
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn int_value(param: &IntParam) -> Option<i64> {
    match param {
        IntParam::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < 9.0e18)
                .map(|f| f.trunc() as i64)
        }),
        IntParam::Text(s) => parse_leading_int(s),
    }
}

fn optional_int(name: &str, param: Option<&IntParam>) -> Result<Option<i64>, ApiError> {
    match param {
        None => Ok(None),
        Some(p) => int_value(p)
            .map(Some)
            .ok_or_else(|| ApiError::invalid_param(name, &p.raw())),
    }
}

fn team(param: Option<&IntParam>) -> Result<TeamId, ApiError> {
    Ok(TeamId(optional_int("team", param)?.unwrap_or_default()))
}

fn limit(param: Option<&IntParam>) -> Result<usize, ApiError> {
    match optional_int("limit", param)? {
        None => Ok(DEFAULT_LEADERBOARD_LIMIT),
        Some(v) if v < 1 => Err(ApiError::invalid_param("limit", &v.to_string())),
        Some(v) => Ok(usize::try_from(v)
            .unwrap_or(MAX_LEADERBOARD_LIMIT)
            .min(MAX_LEADERBOARD_LIMIT)),
    }
}

fn address(name: &str, raw: Option<&String>) -> Result<Address, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::missing_param(name))?;
    Address::parse(raw).map_err(|e| ApiError::invalid_param(name, &e.to_string()))
}

pub fn parse_top_referers(req: &TopReferersRequest) -> Result<LeaderboardParams, ApiError> {
    Ok(LeaderboardParams {
        team: team(req.team.as_ref())?,
        limit: limit(req.limit.as_ref())?,
        day: None,
    })
}

pub fn parse_top_referers_by_date(
    req: &TopReferersByDateRequest,
) -> Result<LeaderboardParams, ApiError> {
    let timestamp = optional_int("timestamp", req.timestamp.as_ref())?
        .ok_or_else(|| ApiError::missing_param("timestamp"))?;
    if timestamp < 0 {
        return Err(ApiError::invalid_param("timestamp", &timestamp.to_string()));
    }
    Ok(LeaderboardParams {
        team: team(req.team.as_ref())?,
        limit: limit(req.limit.as_ref())?,
        day: Some(timestamp),
    })
}

/// `max_levels` is the server's configured ceiling; the hard crawl cap still
/// applies on top of it.
pub fn parse_all_referee(
    req: &AllRefereeRequest,
    max_levels: usize,
) -> Result<CrawlParams, ApiError> {
    let ceiling = effective_levels(max_levels);
    let levels = match optional_int("levels", req.levels.as_ref())? {
        None => ceiling,
        Some(v) if v < 0 => return Err(ApiError::invalid_param("levels", &v.to_string())),
        Some(v) => usize::try_from(v).unwrap_or(usize::MAX).min(ceiling),
    };
    Ok(CrawlParams {
        address: address("address", req.address.as_ref())?,
        team: team(req.team.as_ref())?,
        levels,
    })
}

pub fn parse_direct_referee(req: &DirectRefereeRequest) -> Result<DirectParams, ApiError> {
    Ok(DirectParams {
        address: address("address", req.address.as_ref())?,
        team: team(req.team.as_ref())?,
    })
}

pub fn parse_nfts_for_owner(req: &NftsForOwnerRequest) -> Result<NftOwnerParams, ApiError> {
    let chain_id = optional_int("chainId", req.chain_id.as_ref())?
        .ok_or_else(|| ApiError::missing_param("chainId"))?;
    Ok(NftOwnerParams {
        owner: address("address", req.address.as_ref())?,
        chain_id,
        nft_address: address("nftAddress", req.nft_address.as_ref())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_matches_lenient_number_parsing() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  42abc"), Some(42));
        assert_eq!(parse_leading_int("-7"), Some(-7));
        assert_eq!(parse_leading_int("+3"), Some(3));
        assert_eq!(parse_leading_int("3.9"), Some(3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999999999999"), None);
    }

    #[test]
    fn fractional_numbers_truncate() {
        let n: IntParam = serde_json::from_str("2.7").expect("json");
        assert_eq!(int_value(&n), Some(2));
    }
}
