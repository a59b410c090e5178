use std::{fmt::Display, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------        Vnd          ---------------------------------------------------------
/// An amount of Vietnamese dong. The dong has no minor unit in circulation, so amounts are whole numbers.
///
/// Incoming JSON is accepted as an integer, a float (rounded to the nearest dong) or a numeric string, since
/// browsers and the payment gateway are not consistent about which one they send.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize)]
#[sqlx(transparent)]
pub struct Vnd(i64);

op!(binary Vnd, Add, add);
op!(binary Vnd, Sub, sub);
op!(inplace Vnd, AddAssign, add_assign);
op!(inplace Vnd, SubAssign, sub_assign);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented in dong: {0}")]
pub struct VndConversionError(String);

impl From<i64> for Vnd {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Vnd {
    type Error = VndConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value).map(Self).map_err(|_| VndConversionError(format!("{value} is too large")))
    }
}

impl TryFrom<f64> for Vnd {
    type Error = VndConversionError;

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(VndConversionError(format!("{value} is not a finite number")));
        }
        let rounded = value.round();
        if rounded > i64::MAX as f64 || rounded < i64::MIN as f64 {
            return Err(VndConversionError(format!("{value} is out of range")));
        }
        Ok(Self(rounded as i64))
    }
}

impl FromStr for Vnd {
    type Err = VndConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Self(v));
        }
        s.parse::<f64>().map_err(|_| VndConversionError(format!("'{s}' is not a number"))).and_then(Self::try_from)
    }
}

impl<'de> Deserialize<'de> for Vnd {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Float(f64),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Int(v) => Ok(Self(v)),
            Repr::Float(v) => Self::try_from(v).map_err(de::Error::custom),
            Repr::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

/// vi-VN formatting, e.g. `3.000đ`
impl Display for Vnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}đ", self.format_grouped())
    }
}

impl Vnd {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// The amount with `.` as the thousands separator and no currency symbol.
    pub fn format_grouped(&self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if self.0 < 0 {
            grouped.push('-');
        }
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        grouped
    }
}
