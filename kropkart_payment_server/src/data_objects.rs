use std::fmt::Display;

use kropkart_payment_engine::{db_types::Order, order_objects::VerificationOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Body returned by `/payments/verify` on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub success: bool,
    /// One of `verified`, `already_verified` or `already_captured`
    pub outcome: String,
    pub order: Order,
}

impl From<VerificationOutcome> for VerificationResponse {
    fn from(outcome: VerificationOutcome) -> Self {
        let (label, order) = match outcome {
            VerificationOutcome::Verified(o) => ("verified", o),
            VerificationOutcome::AlreadyVerified(o) => ("already_verified", o),
            VerificationOutcome::AlreadyCaptured(o) => ("already_captured", o),
        };
        Self { success: true, outcome: label.to_string(), order }
    }
}
