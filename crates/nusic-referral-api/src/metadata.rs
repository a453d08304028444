// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiError;
use serde::{Deserialize, Serialize};

pub const METADATA_NAME: &str = "SNFT";
pub const METADATA_DESCRIPTION: &str = "SNFT for NUSIC mysterybox";
const IMAGE_VARIANTS: u32 = 5;

/// ERC-721 style metadata document served for each token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
}

impl NftMetadata {
    pub fn for_token(token_id: &str, public_base_url: &str) -> Result<Self, ApiError> {
        let index = image_index(token_id)?;
        Ok(Self {
            name: METADATA_NAME.to_string(),
            description: METADATA_DESCRIPTION.to_string(),
            image: format!(
                "{}/images/{index}.jpg",
                public_base_url.trim_end_matches('/')
            ),
        })
    }
}

/// `token_id mod 5 + 1` for a decimal token id of any length.
pub fn image_index(token_id: &str) -> Result<u32, ApiError> {
    if token_id.is_empty() || !token_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::invalid_param("tokenId", token_id));
    }
    let rem = token_id
        .bytes()
        .fold(0_u32, |acc, b| (acc * 10 + u32::from(b - b'0')) % IMAGE_VARIANTS);
    Ok(rem + 1)
}
