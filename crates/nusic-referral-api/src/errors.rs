// SPDX-License-Identifier: Apache-2.0

use nusic_referral_query::{QueryError, QueryErrorCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    InvalidInput,
    InvalidNumericInput,
    StoreQueryFailure,
    Timeout,
    PayloadTooLarge,
    NotFound,
    NoData,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::InvalidNumericInput => "InvalidNumericInput",
            Self::StoreQueryFailure => "StoreQueryFailure",
            Self::Timeout => "Timeout",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::NotFound => "NotFound",
            Self::NoData => "NoData",
            Self::Internal => "Internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidInput,
            format!("invalid parameter {name}: {value:?}"),
        )
    }

    #[must_use]
    pub fn missing_param(name: &str) -> Self {
        Self::new(ApiErrorCode::InvalidInput, format!("missing parameter: {name}"))
    }

    #[must_use]
    pub fn invalid_body(reason: impl std::fmt::Display) -> Self {
        Self::new(ApiErrorCode::InvalidInput, format!("invalid request body: {reason}"))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<QueryError> for ApiError {
    fn from(value: QueryError) -> Self {
        let code = match value.code {
            QueryErrorCode::InvalidInput => ApiErrorCode::InvalidInput,
            QueryErrorCode::InvalidNumericInput => ApiErrorCode::InvalidNumericInput,
            QueryErrorCode::StoreQueryFailure => ApiErrorCode::StoreQueryFailure,
            QueryErrorCode::Timeout => ApiErrorCode::Timeout,
            _ => ApiErrorCode::Internal,
        };
        Self::new(code, value.message)
    }
}
