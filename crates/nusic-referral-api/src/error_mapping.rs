// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
    /// Whether the failure is worth an `error!` line rather than `warn!`.
    pub server_fault: bool,
}

/// "No data" is reported inside a 200 envelope; every other code gets a real
/// HTTP status next to the envelope.
#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    let status_code = match error.code {
        ApiErrorCode::NoData => 200,
        ApiErrorCode::InvalidInput | ApiErrorCode::InvalidNumericInput => 400,
        ApiErrorCode::NotFound => 404,
        ApiErrorCode::PayloadTooLarge => 413,
        ApiErrorCode::Timeout => 503,
        ApiErrorCode::StoreQueryFailure | ApiErrorCode::Internal => 500,
    };
    ApiErrorMapping {
        status_code,
        server_fault: status_code >= 500,
    }
}
