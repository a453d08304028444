// SPDX-License-Identifier: Apache-2.0

use crate::http::response_contract::{api_error_response, envelope_response};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nusic_referral_api::{
    parse_all_referee, parse_direct_referee, parse_nfts_for_owner, parse_top_referers,
    parse_top_referers_by_date, AllRefereeRequest, ApiError, ApiErrorCode, DirectRefereeData,
    DirectRefereeRequest, LeaderboardData, LeaderboardParams, NftListData, NftMetadata,
    NftsForOwnerRequest, TopReferersByDateRequest, TopReferersRequest, NO_DATA_MESSAGE,
};
use nusic_referral_model::ReferralTree;
use nusic_referral_query::{crawl, unix_now, CrawlOptions, LeaderboardRanking, TimeWindow};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::info;

fn no_data() -> ApiError {
    ApiError::new(ApiErrorCode::NoData, NO_DATA_MESSAGE)
}

/// Raw request body, or why it could not be read (e.g. over the size limit).
type RawBody = Result<Bytes, BytesRejection>;

fn body_rejection(rejection: &BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(
            ApiErrorCode::PayloadTooLarge,
            format!("request body too large: {}", rejection.body_text()),
        )
    } else {
        ApiError::invalid_body(rejection.body_text())
    }
}

/// An empty body is read as `{}` so every optional field takes its default.
fn parse_body<T: DeserializeOwned + Default>(body: &RawBody) -> Result<T, ApiError> {
    let body = body.as_ref().map_err(body_rejection)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(ApiError::invalid_body)
}

async fn with_request_deadline<T>(
    state: &AppState,
    work: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    let budget = state.api.request_timeout;
    tokio::time::timeout(budget, work).await.unwrap_or_else(|_| {
        Err(ApiError::new(
            ApiErrorCode::Timeout,
            format!("request exceeded {} ms", budget.as_millis()),
        ))
    })
}

pub(crate) async fn hello_handler() -> &'static str {
    "Hello World!"
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn leaderboard(
    state: &AppState,
    params: LeaderboardParams,
) -> Result<LeaderboardData, ApiError> {
    // Today's board ranks by reward; a past day's board ranks by referrals.
    let (window, ranking) = match params.day {
        Some(ts) => (TimeWindow::utc_day_of(ts), LeaderboardRanking::ReferralCount),
        None => (TimeWindow::today(unix_now()), LeaderboardRanking::RewardSum),
    };
    let list = state
        .store
        .top_referers(params.team, window, params.limit, ranking)
        .await?;
    if list.is_empty() {
        return Err(no_data());
    }
    Ok(LeaderboardData {
        list,
        start_timestamp: window.start,
        end_timestamp: window.end,
    })
}

pub(crate) async fn top_referers_handler(State(state): State<AppState>, body: RawBody) -> Response {
    let work = async {
        let req: TopReferersRequest = parse_body(&body)?;
        leaderboard(&state, parse_top_referers(&req)?).await
    };
    envelope_response(with_request_deadline(&state, work).await)
}

pub(crate) async fn top_referers_by_date_handler(
    State(state): State<AppState>,
    body: RawBody,
) -> Response {
    let work = async {
        let req: TopReferersByDateRequest = parse_body(&body)?;
        leaderboard(&state, parse_top_referers_by_date(&req)?).await
    };
    envelope_response(with_request_deadline(&state, work).await)
}

async fn all_referee(state: &AppState, body: &RawBody) -> Result<ReferralTree, ApiError> {
    let req: AllRefereeRequest = parse_body(body)?;
    let params = parse_all_referee(&req, state.api.max_crawl_levels)?;
    let options = CrawlOptions {
        max_levels: params.levels,
        query_timeout: state.api.sql_timeout,
        deadline: None,
    };
    let tree = crawl(state.store.as_ref(), &params.address, params.team, &options).await?;
    state.metrics.observe_crawl(tree.levels, tree.skipped_rows);
    info!(
        address = %params.address,
        team = %params.team,
        requested_levels = params.levels,
        levels = tree.levels,
        count = tree.count,
        funded_count = tree.funded_count,
        "referral tree served"
    );
    Ok(tree)
}

pub(crate) async fn all_referee_handler(State(state): State<AppState>, body: RawBody) -> Response {
    envelope_response(with_request_deadline(&state, all_referee(&state, &body)).await)
}

async fn direct_referee(state: &AppState, body: &RawBody) -> Result<DirectRefereeData, ApiError> {
    let req: DirectRefereeRequest = parse_body(body)?;
    let params = parse_direct_referee(&req)?;
    let direct = state
        .store
        .direct_referees(&params.address, params.team)
        .await?;
    if direct.list.is_empty() {
        return Err(no_data());
    }
    Ok(DirectRefereeData {
        list: direct.list,
        skipped_rows: direct.skipped_rows,
    })
}

pub(crate) async fn direct_referee_handler(
    State(state): State<AppState>,
    body: RawBody,
) -> Response {
    envelope_response(with_request_deadline(&state, direct_referee(&state, &body)).await)
}

async fn nfts_for_owner(state: &AppState, body: &RawBody) -> Result<NftListData, ApiError> {
    let req: NftsForOwnerRequest = parse_body(body)?;
    let params = parse_nfts_for_owner(&req)?;
    let list = state
        .store
        .nfts_for_owner(
            params.chain_id,
            params.owner.as_str(),
            params.nft_address.as_str(),
        )
        .await?;
    Ok(NftListData { list })
}

pub(crate) async fn nfts_for_owner_handler(
    State(state): State<AppState>,
    body: RawBody,
) -> Response {
    envelope_response(with_request_deadline(&state, nfts_for_owner(&state, &body)).await)
}

pub(crate) async fn not_found_handler() -> Response {
    api_error_response(&ApiError::new(ApiErrorCode::NotFound, "route not found"))
}

pub(crate) async fn metadata_handler(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> Response {
    match NftMetadata::for_token(&token_id, &state.api.public_base_url) {
        Ok(meta) => (StatusCode::OK, Json(meta)).into_response(),
        Err(err) => api_error_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_reads_as_defaults() {
        let req: TopReferersRequest = parse_body(&Ok(Bytes::from_static(b"  \n"))).expect("empty");
        assert_eq!(req, TopReferersRequest::default());
    }

    #[test]
    fn malformed_body_is_invalid_input() {
        let err = parse_body::<AllRefereeRequest>(&Ok(Bytes::from_static(b"{\"address\":")))
            .expect_err("truncated json");
        assert_eq!(err.code, ApiErrorCode::InvalidInput);
    }
}
