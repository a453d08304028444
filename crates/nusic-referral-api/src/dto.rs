// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Integer body field that clients send either as a JSON number or as a
/// numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntParam {
    Number(serde_json::Number),
    Text(String),
}

impl IntParam {
    /// Raw form used in validation messages.
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for IntParam {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopReferersRequest {
    #[serde(default)]
    pub limit: Option<IntParam>,
    #[serde(default)]
    pub team: Option<IntParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopReferersByDateRequest {
    #[serde(default)]
    pub timestamp: Option<IntParam>,
    #[serde(default)]
    pub limit: Option<IntParam>,
    #[serde(default)]
    pub team: Option<IntParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllRefereeRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub team: Option<IntParam>,
    #[serde(default)]
    pub levels: Option<IntParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectRefereeRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub team: Option<IntParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftsForOwnerRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub chain_id: Option<IntParam>,
    #[serde(default)]
    pub nft_address: Option<String>,
}
