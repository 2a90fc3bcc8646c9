use std::fmt::Display;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const DEFAULT_CURRENCY_CODE: &str = "INR";

const MINOR_UNITS_PER_MAJOR: i64 = 100;

//--------------------------------------     MinorUnits       ---------------------------------------------------------
/// An amount in the smallest unit of a currency (paise for INR, cents for USD). This is what the payment gateway
/// works in, and what is stored against every order.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct MinorUnits(i64);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Value cannot be represented in minor currency units: {0}")]
pub struct MinorUnitsConversionError(String);

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl MinorUnits {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts an amount in major units into minor units.
    ///
    /// The scaled amount is rounded to the nearest integer *before* it is truncated to an integer, so that
    /// `19.999999` becomes `2000` rather than `1999`. Only strictly positive amounts are accepted.
    pub fn try_from_major(amount: Decimal) -> Result<Self, MinorUnitsConversionError> {
        if amount <= Decimal::ZERO {
            return Err(MinorUnitsConversionError(format!("{amount} is not a positive amount")));
        }
        let scaled = amount
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .ok_or_else(|| MinorUnitsConversionError(format!("{amount} is too large")))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let units = scaled.to_i64().ok_or_else(|| MinorUnitsConversionError(format!("{amount} is too large")))?;
        if units == 0 {
            return Err(MinorUnitsConversionError(format!("{amount} is less than one minor unit")));
        }
        Ok(Self(units))
    }

    pub fn to_major(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.to_major())
    }
}
