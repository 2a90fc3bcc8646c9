mod minor_units;
mod secret;

pub mod helpers;

pub use minor_units::{MinorUnits, MinorUnitsConversionError, DEFAULT_CURRENCY_CODE};
pub use secret::Secret;
