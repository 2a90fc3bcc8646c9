//! Listing price heuristics.
//!
//! A listing is scored once, when it is created, by scanning its text for a handful of quality keywords. The score
//! then determines a small premium on top of the flat levy that every listing pays. All arithmetic is done in
//! [`Decimal`] so that scores compare exactly against their thresholds.
//!
//! Prices are rounded to two decimal places using **half-up** rounding (midpoint away from zero), so a raw price of
//! `0.105` is listed as `0.11`.
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Invalid input. {0}")]
    InvalidInput(String),
}

/// Every listing starts with this score.
pub const BASE_QUALITY_SCORE: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
pub const MAX_QUALITY_SCORE: Decimal = Decimal::ONE;

/// The flat 5% levy applied to every listing.
const LEVY_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
const HIGH_QUALITY_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 2);
const HIGH_QUALITY_BONUS: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
const GOOD_QUALITY_BONUS: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

const ORGANIC_BONUS: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
const PREMIUM_BONUS: Decimal = Decimal::from_parts(15, 0, 0, false, 2);
const GRADE_A_BONUS: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Derives a quality score in `[0.50, 1.00]` from the listing text. Matching is case-insensitive and runs over the
/// name, description and category joined by spaces.
pub fn quality_score(name: &str, description: &str, category: &str) -> Decimal {
    let text = format!("{name} {description} {category}").to_lowercase();
    let mut score = BASE_QUALITY_SCORE;
    if text.contains("organic") {
        score += ORGANIC_BONUS;
    }
    if text.contains("premium") || text.contains("pure") {
        score += PREMIUM_BONUS;
    }
    if text.contains("grade a") {
        score += GRADE_A_BONUS;
    }
    score.min(MAX_QUALITY_SCORE)
}

/// Calculates the buyer-facing price, `base_price × (1 + levy + bonus)`, rounded half-up to 2 decimal places.
///
/// The bonus is 5% for scores above 0.80, 2% for scores above 0.50 and nothing otherwise.
pub fn adjusted_price(base_price: Decimal, quality_score: Decimal) -> Result<Decimal, PricingError> {
    if base_price <= Decimal::ZERO {
        return Err(PricingError::InvalidInput(format!("Base price must be positive, but was {base_price}")));
    }
    let bonus = if quality_score > HIGH_QUALITY_THRESHOLD {
        HIGH_QUALITY_BONUS
    } else if quality_score > BASE_QUALITY_SCORE {
        GOOD_QUALITY_BONUS
    } else {
        Decimal::ZERO
    };
    let multiplier = Decimal::ONE + LEVY_RATE + bonus;
    let price = base_price
        .checked_mul(multiplier)
        .ok_or_else(|| PricingError::InvalidInput(format!("Base price {base_price} is too large")))?;
    Ok(price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Parses a base price as submitted in a listing form.
pub fn parse_base_price(value: &str) -> Result<Decimal, PricingError> {
    let price = Decimal::from_str(value.trim())
        .map_err(|e| PricingError::InvalidInput(format!("'{value}' is not a valid price. {e}")))?;
    if price <= Decimal::ZERO {
        return Err(PricingError::InvalidInput(format!("Base price must be positive, but was {price}")));
    }
    Ok(price)
}
