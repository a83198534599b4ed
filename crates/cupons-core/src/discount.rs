//! # Discount Percentages
//!
//! The legacy `cupom.per_desc_cupom` column stores a fraction (`0.15`);
//! the API speaks whole percentages (`15`).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   frontend / API             DiscountPercent            database        │
//! │   percentual_desconto: 15 ──► DiscountPercent(15) ──► 0.15              │
//! │                          to_stored_fraction()                            │
//! │                                                                         │
//! │   0.15 ──► DiscountPercent(15) ──► percentual_desconto: 15              │
//! │      from_stored_fraction()                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These two methods are the only place the ×100 / ÷100 happens.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;

/// Whole-number discount percentage, 0 to 100.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(try_from = "i64", into = "i64")]
#[ts(export)]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    pub const MAX: u8 = 100;

    /// Creates a percentage, rejecting values above 100.
    pub fn new(percent: i64) -> Result<Self, ValidationError> {
        if !(0..=i64::from(Self::MAX)).contains(&percent) {
            return Err(ValidationError::OutOfRange {
                field: "percentualDesconto".to_string(),
                min: 0,
                max: i64::from(Self::MAX),
            });
        }
        Ok(DiscountPercent(percent as u8))
    }

    /// Reads the legacy stored fraction, rounding to the nearest percent.
    ///
    /// Out-of-range fractions are clamped.
    pub fn from_stored_fraction(fraction: f64) -> Self {
        let percent = (fraction * 100.0).round();
        if percent.is_nan() {
            return DiscountPercent(0);
        }
        DiscountPercent(percent.clamp(0.0, f64::from(Self::MAX)) as u8)
    }

    /// The value to write to the legacy fraction column.
    pub fn to_stored_fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for DiscountPercent {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        DiscountPercent::new(value)
    }
}

impl From<DiscountPercent> for i64 {
    fn from(p: DiscountPercent) -> Self {
        i64::from(p.0)
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
