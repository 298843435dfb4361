use core::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RatioError;

/// Numerator/denominator pair exactly as it appears in an OCF `ratio` object.
///
/// Both sides are kept as decimal strings so no precision is lost before the
/// calculator sees them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioInput {
    pub numerator: String,
    pub denominator: String,
}

impl RatioInput {
    pub fn new(numerator: impl Into<String>, denominator: impl Into<String>) -> Self {
        Self {
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }
}

/// Exact conversion ratio, stored as a decimal fraction.
///
/// Division only happens in [`ConversionRatio::to_f64`], i.e. at the point where a
/// spreadsheet needs a plain number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversionRatio {
    numerator: Decimal,
    denominator: Decimal,
}

impl ConversionRatio {
    pub const ONE: ConversionRatio = ConversionRatio {
        numerator: Decimal::ONE,
        denominator: Decimal::ONE,
    };

    /// Build a ratio from already-parsed decimals.
    pub fn new(numerator: Decimal, denominator: Decimal) -> Result<Self, RatioError> {
        if denominator.is_zero() {
            return Err(RatioError::ZeroDenominator);
        }
        if numerator <= Decimal::ZERO || denominator < Decimal::ZERO {
            return Err(RatioError::NonPositive {
                numerator: numerator.to_string(),
                denominator: denominator.to_string(),
            });
        }
        Ok(Self {
            numerator: numerator.normalize(),
            denominator: denominator.normalize(),
        })
    }

    #[must_use]
    pub fn numerator(&self) -> Decimal {
        self.numerator
    }

    #[must_use]
    pub fn denominator(&self) -> Decimal {
        self.denominator
    }

    /// `true` when the ratio is exactly 1, i.e. the class does not convert.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.numerator == self.denominator
    }

    /// Nearest `f64` to the exact quotient.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        // Decimal -> string -> f64 is correctly rounded; going through
        // `Decimal::to_f64` on each side would round twice.
        if let Some(quotient) = self.numerator.checked_div(self.denominator) {
            if let Ok(value) = quotient.to_string().parse::<f64>() {
                return value;
            }
        }
        let numerator = self.numerator.to_f64().unwrap_or(f64::NAN);
        let denominator = self.denominator.to_f64().unwrap_or(f64::NAN);
        numerator / denominator
    }
}

impl Default for ConversionRatio {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for ConversionRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Convert an OCF ratio into an exact [`ConversionRatio`].
pub fn convert_ratio_to_decimal_number(ratio: &RatioInput) -> Result<ConversionRatio, RatioError> {
    let numerator = parse_decimal(&ratio.numerator)?;
    let denominator = parse_decimal(&ratio.denominator)?;
    ConversionRatio::new(numerator, denominator)
}

fn parse_decimal(value: &str) -> Result<Decimal, RatioError> {
    let trimmed = value.trim();
    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(trimmed)
    };
    parsed.map_err(|err| RatioError::InvalidDecimal {
        value: value.to_string(),
        reason: err.to_string(),
    })
}
