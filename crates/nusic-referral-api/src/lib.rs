// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! HTTP wire contract: request bodies, their validation into typed
//! parameters, the `{success, data | message, code}` envelope and the
//! mapping from query errors to status codes.

mod dto;
mod error_mapping;
mod errors;
mod metadata;
mod params;
mod responses;

pub use dto::{
    AllRefereeRequest, DirectRefereeRequest, IntParam, NftsForOwnerRequest,
    TopReferersByDateRequest, TopReferersRequest,
};
pub use error_mapping::{map_error, ApiErrorMapping};
pub use errors::{ApiError, ApiErrorCode};
pub use metadata::{image_index, NftMetadata, METADATA_DESCRIPTION, METADATA_NAME};
pub use params::{
    parse_all_referee, parse_direct_referee, parse_leading_int, parse_nfts_for_owner,
    parse_top_referers, parse_top_referers_by_date, CrawlParams, DirectParams, LeaderboardParams,
    NftOwnerParams, DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT,
};
pub use responses::{
    ApiEnvelope, DirectRefereeData, LeaderboardData, NftListData, NO_DATA_MESSAGE,
};

pub const CRATE_NAME: &str = "nusic-referral-api";
