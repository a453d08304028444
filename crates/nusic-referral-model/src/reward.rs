// SPDX-License-Identifier: Apache-2.0

//! Reward normalization: `number = amount * rate / 10^24`.
//!
//! Amounts and rates are token-style fixed-point integers in the 10^18..10^24
//! range. Their product is formed as a 256-bit integer and kept as-is: a
//! [`Reward`] is that integer read with 24 implied fractional digits, so no
//! digit of the result is ever rounded away.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const REWARD_SCALE_EXPONENT: u32 = 24;
const SCALE_DIGITS: usize = REWARD_SCALE_EXPONENT as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RewardError {
    NotAnInteger { field: &'static str, value: String },
    OutOfRange { field: &'static str, value: String },
}

impl Display for RewardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnInteger { field, value } => {
                write!(f, "{field} is not a non-negative integer: {value:?}")
            }
            Self::OutOfRange { field, value } => {
                write!(f, "{field} is out of the supported numeric range: {value:?}")
            }
        }
    }
}

impl std::error::Error for RewardError {}

/// Exact non-negative reward with 24 fractional digits.
///
/// Ordering and addition work on the underlying integer. On the wire the
/// value is a JSON number; [`Display`] gives the exact decimal text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reward(U256);

impl Reward {
    pub const ZERO: Self = Self(U256::ZERO);

    /// Reward from its raw integer in units of `10^-24`.
    #[must_use]
    pub const fn from_scaled(units: U256) -> Self {
        Self(units)
    }

    /// Whole-number reward, e.g. a referral count reported in the same field.
    #[must_use]
    pub fn whole(n: u64) -> Self {
        Self(U256::from_limbs([n, 0, 0, 0]).saturating_mul(scale_factor()))
    }

    #[must_use]
    pub const fn scaled(&self) -> U256 {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Nearest `f64`, for the JSON wire form.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse::<f64>().unwrap_or(f64::MAX)
    }
}

impl Display for Reward {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let digits = self.0.to_string();
        let padded = format!("{digits:0>width$}", width = SCALE_DIGITS + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - SCALE_DIGITS);
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            f.write_str(int_part)
        } else {
            write!(f, "{int_part}.{frac_part}")
        }
    }
}

impl FromStr for Reward {
    type Err = RewardError;

    /// Parses plain decimal text with at most 24 fractional digits.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let not_a_reward = || RewardError::NotAnInteger {
            field: "reward",
            value: raw.to_string(),
        };
        let (int_part, frac_part) = match raw.split_once('.') {
            Some((_, "")) => return Err(not_a_reward()),
            Some(parts) => parts,
            None => (raw, ""),
        };
        if int_part.is_empty()
            || frac_part.len() > SCALE_DIGITS
            || !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(not_a_reward());
        }
        let units = format!("{int_part}{frac_part:0<width$}", width = SCALE_DIGITS);
        U256::from_str_radix(&units, 10)
            .map(Self)
            .map_err(|_| RewardError::OutOfRange {
                field: "reward",
                value: raw.to_string(),
            })
    }
}

impl Serialize for Reward {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RewardRepr {
    Text(String),
    Number(f64),
}

impl<'de> Deserialize<'de> for Reward {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match RewardRepr::deserialize(deserializer)? {
            RewardRepr::Text(s) => s,
            RewardRepr::Number(n) => n.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a raw store value as a non-negative integer.
pub fn parse_raw_integer(field: &'static str, raw: &str) -> Result<Decimal, RewardError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RewardError::NotAnInteger {
            field,
            value: raw.to_string(),
        });
    }
    Decimal::from_str_exact(trimmed).map_err(|_| RewardError::OutOfRange {
        field,
        value: raw.to_string(),
    })
}

const fn wide_from_u128(units: u128) -> U256 {
    // Limbs are little-endian u64 words.
    U256::from_limbs([units as u64, (units >> 64) as u64, 0, 0])
}

const fn scale_factor() -> U256 {
    wide_from_u128(10_u128.pow(REWARD_SCALE_EXPONENT))
}

fn wide_integer(value: Decimal, field: &'static str, raw: &str) -> Result<U256, RewardError> {
    // Digit-only text parses with scale 0, so the mantissa is the integer.
    let units = u128::try_from(value.mantissa()).map_err(|_| RewardError::OutOfRange {
        field,
        value: raw.to_string(),
    })?;
    Ok(wide_from_u128(units))
}

pub fn normalize_reward(amount: &str, rate: &str) -> Result<Reward, RewardError> {
    let amount_units = wide_integer(parse_raw_integer("amount", amount)?, "amount", amount)?;
    let rate_units = wide_integer(parse_raw_integer("rate", rate)?, "rate", rate)?;
    amount_units
        .checked_mul(rate_units)
        .map(Reward)
        .ok_or_else(|| RewardError::OutOfRange {
            field: "amount*rate",
            value: format!("{amount}*{rate}"),
        })
}
