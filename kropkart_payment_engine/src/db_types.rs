use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use kpg_common::MinorUnits;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------    GatewayOrderId     ---------------------------------------------------------
/// The opaque identifier the payment gateway assigns to an order intent. It is the unique key for [`Order`] records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct GatewayOrderId(pub String);

impl From<String> for GatewayOrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GatewayOrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for GatewayOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

impl GatewayOrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       PaymentId       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct PaymentId(pub String);

impl From<String> for PaymentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PaymentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PaymentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// An order intent was created with the gateway, and no confirmation has been seen yet.
    Created,
    /// The buyer's client submitted a correctly signed payment confirmation. Settlement is tentative until the
    /// gateway confirms the capture.
    ClientVerified,
    /// The gateway notified us that the payment was captured. Terminal.
    Captured,
    /// A client-side confirmation failed signature verification before any capture was seen. A later capture webhook
    /// still supersedes this.
    Failed,
}

impl OrderStatusType {
    /// The statuses an order may hold immediately before moving into `self`.
    ///
    /// | From \ To      | ClientVerified | Captured | Failed |
    /// |----------------|----------------|----------|--------|
    /// | Created        | yes            | yes      | yes    |
    /// | ClientVerified | -              | yes      | yes    |
    /// | Failed         | no             | yes      | -      |
    /// | Captured       | no             | -        | no     |
    ///
    /// Nothing ever moves back into `Created`.
    pub fn predecessors(&self) -> &'static [OrderStatusType] {
        use OrderStatusType::*;
        match self {
            Created => &[],
            ClientVerified => &[Created],
            Captured => &[Created, ClientVerified, Failed],
            Failed => &[Created, ClientVerified],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        next.predecessors().contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Captured)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Created => write!(f, "Created"),
            OrderStatusType::ClientVerified => write!(f, "ClientVerified"),
            OrderStatusType::Captured => write!(f, "Captured"),
            OrderStatusType::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Self::Created),
            "ClientVerified" => Ok(Self::ClientVerified),
            "Captured" => Ok(Self::Captured),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   TransitionSource    ---------------------------------------------------------
/// Which trust boundary a status change came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum TransitionSource {
    /// The buyer's client, via `/payments/verify`
    Client,
    /// The gateway's servers, via `/webhook`
    Webhook,
}

impl Display for TransitionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionSource::Client => write!(f, "Client"),
            TransitionSource::Webhook => write!(f, "Webhook"),
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub gateway_order_id: GatewayOrderId,
    pub buyer_id: String,
    pub listing_id: Option<i64>,
    pub amount: MinorUnits,
    pub currency: String,
    pub status: OrderStatusType,
    pub payment_id: Option<PaymentId>,
    pub created_at: DateTime<Utc>,
    pub client_verified_at: Option<DateTime<Utc>>,
    pub captured_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub gateway_order_id: GatewayOrderId,
    pub buyer_id: String,
    pub listing_id: Option<i64>,
    pub amount: MinorUnits,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(gateway_order_id: GatewayOrderId, buyer_id: String, amount: MinorUnits, currency: &str) -> Self {
        Self { gateway_order_id, buyer_id, listing_id: None, amount, currency: currency.to_string(), created_at: Utc::now() }
    }

    pub fn with_listing(mut self, listing_id: i64) -> Self {
        self.listing_id = Some(listing_id);
        self
    }
}

impl Display for NewOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Order {} for {} {} (buyer: {})", self.gateway_order_id, self.amount, self.currency, self.buyer_id)
    }
}

//--------------------------------------    OrderTransition    ---------------------------------------------------------
/// An append-only record of a single applied status change.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderTransition {
    pub id: i64,
    pub gateway_order_id: GatewayOrderId,
    pub from_status: OrderStatusType,
    pub to_status: OrderStatusType,
    pub payment_id: Option<PaymentId>,
    pub source: TransitionSource,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        Listing        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Decimal,
    pub quality_score: Decimal,
    /// The price shown to buyers. Fixed when the listing is created and never recomputed.
    pub adjusted_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewListing {
    pub owner: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Decimal,
    pub quality_score: Decimal,
    pub adjusted_price: Decimal,
}
