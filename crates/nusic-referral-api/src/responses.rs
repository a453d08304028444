// SPDX-License-Identifier: Apache-2.0

use crate::errors::{ApiError, ApiErrorCode};
use nusic_referral_model::{NftToken, ReferralEdge, RefererScore};
use serde::{Deserialize, Serialize};

pub const NO_DATA_MESSAGE: &str = "no data";

/// `{success: true, data}` or `{success: false, message, code}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ApiErrorCode>,
}

impl<T> ApiEnvelope<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            code: None,
        }
    }

    #[must_use]
    pub fn failure(error: &ApiError) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(error.message.clone()),
            code: Some(error.code),
        }
    }

    #[must_use]
    pub fn no_data() -> Self {
        Self::failure(&ApiError::new(ApiErrorCode::NoData, NO_DATA_MESSAGE))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardData {
    pub list: Vec<RefererScore>,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectRefereeData {
    pub list: Vec<ReferralEdge>,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftListData {
    pub list: Vec<NftToken>,
}
