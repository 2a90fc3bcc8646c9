use thiserror::Error;

use crate::{
    db_types::GatewayOrderId,
    helpers::PricingError,
    traits::{GatewayError, StoreError},
};

/// Everything that can go wrong while handling a checkout, a client confirmation or a webhook.
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid input. {0}")]
    InvalidInput(String),
    #[error("Payment gateway error. {0}")]
    Gateway(GatewayError),
    #[error("Signature verification failed.")]
    Signature,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Order {0} cannot be updated. {1}")]
    Conflict(GatewayOrderId, String),
    #[error("Database error. {0}")]
    Database(#[from] StoreError),
}

impl From<GatewayError> for OrderFlowError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::InvalidAmount(s) => OrderFlowError::InvalidInput(s),
            GatewayError::InvalidCurrency(s) => OrderFlowError::InvalidInput(format!("Invalid currency code: {s}")),
            e => OrderFlowError::Gateway(e),
        }
    }
}

impl From<PricingError> for OrderFlowError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::InvalidInput(s) => OrderFlowError::InvalidInput(s),
        }
    }
}
