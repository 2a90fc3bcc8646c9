use kpg_common::MinorUnits;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Invalid order amount. {0}")]
    InvalidAmount(String),
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),
    #[error("The payment gateway did not respond in time.")]
    Timeout,
    #[error("Could not reach the payment gateway. {0}")]
    RequestFailed(String),
    #[error("The payment gateway rejected the request ({status}). {message}")]
    Rejected { status: u16, message: String },
    #[error("Unexpected response from the payment gateway. {0}")]
    InvalidResponse(String),
}

/// An order as reported back by the gateway when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

/// The external payment gateway capability.
///
/// Implementations make exactly one attempt per call and must bound it with a timeout. Retry policy belongs to the
/// caller.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Registers a payment intent for `amount` with the gateway. `receipt` is a caller-chosen reference that the
    /// gateway echoes back in its dashboard.
    async fn create_order(
        &self,
        amount: MinorUnits,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError>;
}
