use std::fmt::Debug;

use kpg_common::MinorUnits;
use log::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{GatewayOrderId, PaymentId},
    traits::{GatewayError, PaymentGateway},
};

/// A payment intent registered with the gateway. The buyer's client uses the id to open the gateway's checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub id: GatewayOrderId,
    pub amount: MinorUnits,
    pub currency: String,
    pub status: String,
}

/// The bytes a buyer's client confirmation is signed over.
pub fn client_signature_payload(order_id: &GatewayOrderId, payment_id: &PaymentId) -> Vec<u8> {
    format!("{}|{}", order_id.as_str(), payment_id.as_str()).into_bytes()
}

/// Thin wrapper around a [`PaymentGateway`] that validates amounts and currencies before anything goes over the
/// wire. It keeps no state of its own.
#[derive(Clone)]
pub struct GatewayClient<G> {
    gateway: G,
}

impl<G> Debug for GatewayClient<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GatewayClient")
    }
}

impl<G> GatewayClient<G>
where G: PaymentGateway
{
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Creates an order intent for `amount` (in major units, e.g. rupees) with the gateway.
    ///
    /// The amount is converted to minor units by rounding, so `19.9` becomes `1990` and `19.999999` becomes `2000`.
    /// Invalid amounts and currency codes are rejected before the gateway is contacted.
    pub async fn create_order_intent(&self, amount: Decimal, currency: &str) -> Result<OrderIntent, GatewayError> {
        let minor = MinorUnits::try_from_major(amount).map_err(|e| GatewayError::InvalidAmount(e.to_string()))?;
        let currency = normalize_currency(currency)?;
        let receipt = format!("rcpt_{:016x}", rand::random::<u64>());
        trace!("💳️ Requesting order intent for {minor} {currency} ({receipt})");
        let order = self.gateway.create_order(minor, &currency, &receipt).await.map_err(|e| {
            warn!("💳️ Could not create order intent for {minor} {currency}. {e}");
            e
        })?;
        if order.amount != minor.value() {
            warn!(
                "💳️ Gateway order {} reports an amount of {} minor units, but {} was requested",
                order.id,
                order.amount,
                minor.value()
            );
        }
        debug!("💳️ Order intent [{}] created for {minor} {currency}", order.id);
        Ok(OrderIntent { id: GatewayOrderId(order.id), amount: minor, currency, status: order.status })
    }
}

fn normalize_currency(currency: &str) -> Result<String, GatewayError> {
    let code = currency.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(GatewayError::InvalidCurrency(currency.to_string()))
    }
}
