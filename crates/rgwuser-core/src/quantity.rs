//! Byte quantities as they appear in declarative specs (`10G`, `512Mi`, `1.5T`, `1e9`).
//!
//! Quantities are normalized to a raw byte count at parse time; the original
//! notation is not retained.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A non-negative number of bytes that fits the gateway's signed 64-bit quota fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "QuantityRepr", into = "u64")]
pub struct ByteQuantity(u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum QuantityRepr {
    Bytes(u64),
    Text(String),
}

impl TryFrom<QuantityRepr> for ByteQuantity {
    type Error = CoreError;

    fn try_from(repr: QuantityRepr) -> Result<Self, Self::Error> {
        match repr {
            QuantityRepr::Bytes(bytes) => Self::from_bytes(bytes),
            QuantityRepr::Text(text) => text.parse(),
        }
    }
}

impl From<ByteQuantity> for u64 {
    fn from(quantity: ByteQuantity) -> Self {
        quantity.0
    }
}

impl ByteQuantity {
    /// Largest accepted value; quota sizes travel as signed 64-bit integers.
    pub const MAX: u64 = i64::MAX as u64;

    pub fn from_bytes(bytes: u64) -> Result<Self, CoreError> {
        if bytes > Self::MAX {
            return Err(CoreError::invalid_quantity(
                bytes.to_string(),
                "exceeds the largest representable quota",
            ));
        }
        Ok(Self(bytes))
    }

    pub fn bytes(self) -> u64 {
        self.0
    }

    /// Byte count as the signed integer the admin API expects.
    pub fn as_i64(self) -> i64 {
        // from_bytes and parsing both cap at i64::MAX
        self.0 as i64
    }
}

fn suffix_multiplier(suffix: &str) -> Option<u128> {
    let m = match suffix {
        "" => 1,
        "k" => 1_000,
        "M" => 1_000u128.pow(2),
        "G" => 1_000u128.pow(3),
        "T" => 1_000u128.pow(4),
        "P" => 1_000u128.pow(5),
        "E" => 1_000u128.pow(6),
        "Ki" => 1 << 10,
        "Mi" => 1 << 20,
        "Gi" => 1 << 30,
        "Ti" => 1 << 40,
        "Pi" => 1 << 50,
        "Ei" => 1 << 60,
        _ => return None,
    };
    Some(m)
}

/// Decimal exponent notation (`e9`, `E3`); a bare `E` is the exa suffix.
fn exponent_multiplier(suffix: &str) -> Option<u128> {
    let rest = suffix
        .strip_prefix('e')
        .or_else(|| suffix.strip_prefix('E'))?;
    let rest = rest.strip_prefix('+').unwrap_or(rest);
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let exp: u32 = rest.parse().ok()?;
    10u128.checked_pow(exp)
}

impl FromStr for ByteQuantity {
    type Err = CoreError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        let text = text.strip_prefix('+').unwrap_or(text);
        if text.starts_with('-') {
            return Err(CoreError::invalid_quantity(input, "must not be negative"));
        }

        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(text.len());
        let (number, suffix) = text.split_at(split);
        if number.is_empty() || number == "." {
            return Err(CoreError::invalid_quantity(input, "missing numeric value"));
        }

        let multiplier = suffix_multiplier(suffix)
            .or_else(|| exponent_multiplier(suffix))
            .ok_or_else(|| CoreError::invalid_quantity(input, format!("unknown suffix {suffix:?}")))?;

        let (whole, fraction) = match number.split_once('.') {
            Some((w, f)) => (w, f),
            None => (number, ""),
        };
        if fraction.contains('.') {
            return Err(CoreError::invalid_quantity(input, "malformed number"));
        }

        let overflow = || CoreError::invalid_quantity(input, "exceeds the largest representable quota");

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut bytes = whole.checked_mul(multiplier).ok_or_else(overflow)?;

        let fraction = fraction.trim_end_matches('0');
        if !fraction.is_empty() {
            let scale = u32::try_from(fraction.len())
                .ok()
                .and_then(|len| 10u128.checked_pow(len))
                .ok_or_else(overflow)?;
            let digits: u128 = fraction.parse().map_err(|_| overflow())?;
            let scaled = digits.checked_mul(multiplier).ok_or_else(overflow)?;
            if scaled % scale != 0 {
                return Err(CoreError::invalid_quantity(
                    input,
                    "does not resolve to a whole number of bytes",
                ));
            }
            bytes = bytes.checked_add(scaled / scale).ok_or_else(overflow)?;
        }

        if bytes > u128::from(Self::MAX) {
            return Err(overflow());
        }
        Ok(Self(bytes as u64))
    }
}

impl fmt::Display for ByteQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
