// SPDX-License-Identifier: Apache-2.0

use nusic_referral_api::{
    parse_all_referee, parse_direct_referee, parse_leading_int, parse_nfts_for_owner,
    parse_top_referers, parse_top_referers_by_date, AllRefereeRequest, ApiErrorCode,
    DirectRefereeRequest, IntParam, NftsForOwnerRequest, TopReferersByDateRequest,
    TopReferersRequest, DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT,
};
use nusic_referral_model::TeamId;
use nusic_referral_query::MAX_CRAWL_LEVELS;
use proptest::prelude::*;

fn text(s: &str) -> Option<IntParam> {
    Some(IntParam::Text(s.to_string()))
}

fn crawl_request(levels: Option<IntParam>) -> AllRefereeRequest {
    AllRefereeRequest {
        address: Some("0xroot".to_string()),
        team: None,
        levels,
    }
}

#[test]
fn crawl_defaults_to_the_level_cap_and_team_zero() {
    let params = parse_all_referee(&crawl_request(None), MAX_CRAWL_LEVELS).expect("params");
    assert_eq!(params.levels, MAX_CRAWL_LEVELS);
    assert_eq!(params.team, TeamId(0));
    assert_eq!(params.address.as_str(), "0xroot");
}

#[test]
fn crawl_levels_are_clamped_and_negative_is_rejected() {
    let over = parse_all_referee(&crawl_request(Some(IntParam::from(500))), MAX_CRAWL_LEVELS)
        .expect("clamped");
    assert_eq!(over.levels, MAX_CRAWL_LEVELS);

    let configured = parse_all_referee(&crawl_request(text("30")), 10).expect("configured cap");
    assert_eq!(configured.levels, 10);

    let zero = parse_all_referee(&crawl_request(text("0")), MAX_CRAWL_LEVELS).expect("zero");
    assert_eq!(zero.levels, 0);

    let negative = parse_all_referee(&crawl_request(text("-1")), MAX_CRAWL_LEVELS)
        .expect_err("negative levels");
    assert_eq!(negative.code, ApiErrorCode::InvalidInput);

    let garbage = parse_all_referee(&crawl_request(text("many")), MAX_CRAWL_LEVELS)
        .expect_err("non-numeric levels");
    assert_eq!(garbage.code, ApiErrorCode::InvalidInput);
}

#[test]
fn missing_or_blank_address_is_invalid_input() {
    let missing = parse_all_referee(&AllRefereeRequest::default(), MAX_CRAWL_LEVELS)
        .expect_err("missing");
    assert_eq!(missing.code, ApiErrorCode::InvalidInput);

    let blank = parse_direct_referee(&DirectRefereeRequest {
        address: Some(String::new()),
        team: None,
    })
    .expect_err("blank");
    assert_eq!(blank.code, ApiErrorCode::InvalidInput);

    let padded = parse_direct_referee(&DirectRefereeRequest {
        address: Some(" 0xabc".to_string()),
        team: text("2"),
    })
    .expect_err("padded");
    assert_eq!(padded.code, ApiErrorCode::InvalidInput);
}

#[test]
fn leaderboard_limit_defaults_and_caps() {
    let default = parse_top_referers(&TopReferersRequest::default()).expect("default");
    assert_eq!(default.limit, DEFAULT_LEADERBOARD_LIMIT);
    assert_eq!(default.day, None);

    let capped = parse_top_referers(&TopReferersRequest {
        limit: text("1000"),
        team: text("4"),
    })
    .expect("capped");
    assert_eq!(capped.limit, MAX_LEADERBOARD_LIMIT);
    assert_eq!(capped.team, TeamId(4));

    let zero = parse_top_referers(&TopReferersRequest {
        limit: Some(IntParam::from(0)),
        team: None,
    })
    .expect_err("zero limit");
    assert_eq!(zero.code, ApiErrorCode::InvalidInput);
}

#[test]
fn by_date_requires_a_timestamp() {
    let missing =
        parse_top_referers_by_date(&TopReferersByDateRequest::default()).expect_err("missing");
    assert_eq!(missing.code, ApiErrorCode::InvalidInput);

    let ok = parse_top_referers_by_date(&TopReferersByDateRequest {
        timestamp: text("1700000000"),
        limit: None,
        team: None,
    })
    .expect("timestamp");
    assert_eq!(ok.day, Some(1_700_000_000));
}

#[test]
fn nft_lookup_needs_owner_chain_and_contract() {
    let ok = parse_nfts_for_owner(&NftsForOwnerRequest {
        address: Some("0xOwner".to_string()),
        chain_id: text("137"),
        nft_address: Some("0xNft".to_string()),
    })
    .expect("params");
    assert_eq!(ok.chain_id, 137);
    assert_eq!(ok.owner.as_str(), "0xOwner");

    let no_chain = parse_nfts_for_owner(&NftsForOwnerRequest {
        address: Some("0xOwner".to_string()),
        chain_id: None,
        nft_address: Some("0xNft".to_string()),
    })
    .expect_err("chain");
    assert_eq!(no_chain.code, ApiErrorCode::InvalidInput);
}

proptest! {
    #[test]
    fn leading_int_round_trips_plain_integers(v in any::<i64>().prop_filter("min has no positive twin", |v| *v != i64::MIN)) {
        prop_assert_eq!(parse_leading_int(&v.to_string()), Some(v));
        prop_assert_eq!(parse_leading_int(&format!("{v}px")), Some(v));
    }

    #[test]
    fn crawl_levels_never_exceed_the_cap(levels in 0_i64..10_000) {
        let params = parse_all_referee(&crawl_request(Some(IntParam::from(levels))), MAX_CRAWL_LEVELS)
            .expect("params");
        prop_assert!(params.levels <= MAX_CRAWL_LEVELS);
    }
}
