//! Pure helper functions with no database or network dependencies.
//!
//! * [`pricing`] derives the quality score and buyer-facing price of a listing.
//! * [`signature`] computes the hex-encoded HMAC-SHA256 signatures the payment gateway uses.
pub mod pricing;
pub mod signature;

pub use pricing::{adjusted_price, parse_base_price, quality_score, PricingError};
pub use signature::{calculate_signature, verify_signature};
