//! Request and result types for the engine's order flows. The server deserializes its request bodies straight into
//! these.
use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db_types::{GatewayOrderId, Order, OrderTransition, PaymentId};

//--------------------------------------    CheckoutRequest    ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// The amount in major units, e.g. rupees.
    pub amount: Decimal,
    /// Falls back to the configured default currency if absent.
    #[serde(default)]
    pub currency: Option<String>,
    pub buyer_id: String,
    #[serde(default)]
    pub listing_id: Option<i64>,
}

//--------------------------------------  VerifyPaymentRequest ---------------------------------------------------------
/// The confirmation a buyer's client submits after completing payment in the gateway's checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub gateway_order_id: GatewayOrderId,
    pub payment_id: PaymentId,
    pub signature: String,
}

//--------------------------------------  VerificationOutcome  ---------------------------------------------------------
#[derive(Debug, Clone)]
pub enum VerificationOutcome {
    /// This confirmation moved the order to `ClientVerified`.
    Verified(Order),
    /// The same confirmation had already been applied. Nothing was written.
    AlreadyVerified(Order),
    /// The gateway has already reported the capture. Nothing was written.
    AlreadyCaptured(Order),
}

impl VerificationOutcome {
    pub fn order(&self) -> &Order {
        match self {
            Self::Verified(o) | Self::AlreadyVerified(o) | Self::AlreadyCaptured(o) => o,
        }
    }
}

impl Display for VerificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verified(o) => write!(f, "Order {} verified", o.gateway_order_id),
            Self::AlreadyVerified(o) => write!(f, "Order {} was already verified", o.gateway_order_id),
            Self::AlreadyCaptured(o) => write!(f, "Order {} has already been captured", o.gateway_order_id),
        }
    }
}

//--------------------------------------    WebhookOutcome     ---------------------------------------------------------
/// The result of a webhook delivery whose signature checked out. Every variant is acknowledged to the gateway.
#[derive(Debug, Clone)]
pub enum WebhookOutcome {
    Captured(Order),
    AlreadyCaptured(Order),
    /// Nothing to do. The reason is for the logs.
    Ignored(String),
}

impl Display for WebhookOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Captured(o) => write!(f, "Order {} captured", o.gateway_order_id),
            Self::AlreadyCaptured(o) => write!(f, "Order {} was already captured", o.gateway_order_id),
            Self::Ignored(reason) => write!(f, "Ignored. {reason}"),
        }
    }
}

//--------------------------------------     WebhookEvent      ---------------------------------------------------------
/// The subset of the gateway's webhook body that reconciliation needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub payment: WebhookPayment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayment {
    pub entity: PaymentEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntity {
    pub id: PaymentId,
    #[serde(default)]
    pub order_id: Option<GatewayOrderId>,
    /// In minor units
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub const PAYMENT_CAPTURED_EVENT: &str = "payment.captured";

//--------------------------------------   NewListingRequest   ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListingRequest {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Accepts a JSON number or a numeric string
    pub base_price: serde_json::Value,
}

//--------------------------------------   OrderWithHistory    ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithHistory {
    pub order: Order,
    pub transitions: Vec<OrderTransition>,
}
