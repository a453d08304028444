// SPDX-License-Identifier: Apache-2.0

use nusic_referral_model::{ParseError, RewardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryErrorCode {
    InvalidInput,
    StoreQueryFailure,
    Timeout,
    InvalidNumericInput,
}

impl QueryErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::StoreQueryFailure => "StoreQueryFailure",
            Self::Timeout => "Timeout",
            Self::InvalidNumericInput => "InvalidNumericInput",
        }
    }

    /// Timeouts are store failures too; callers that only care about the
    /// coarse class check this instead of matching both codes.
    #[must_use]
    pub const fn is_store_failure(self) -> bool {
        matches!(self, Self::StoreQueryFailure | Self::Timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub code: QueryErrorCode,
    pub message: String,
}

impl QueryError {
    #[must_use]
    pub fn new(code: QueryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::InvalidInput, message)
    }

    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::StoreQueryFailure, message)
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::Timeout, message)
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for QueryError {}

impl From<ParseError> for QueryError {
    fn from(value: ParseError) -> Self {
        Self::invalid_input(value.to_string())
    }
}

impl From<RewardError> for QueryError {
    fn from(value: RewardError) -> Self {
        Self::new(QueryErrorCode::InvalidNumericInput, value.to_string())
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::OperationInterrupted =>
            {
                Self::timeout("store statement exceeded its time budget")
            }
            _ => Self::store(value.to_string()),
        }
    }
}
