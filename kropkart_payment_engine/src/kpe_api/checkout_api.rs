use std::fmt::Debug;

use log::*;
use rust_decimal::Decimal;

use crate::{
    db_types::NewOrder,
    kpe_api::{
        errors::OrderFlowError,
        gateway_client::{GatewayClient, OrderIntent},
        order_objects::CheckoutRequest,
    },
    traits::{MarketplaceDatabase, PaymentGateway},
};

/// `CheckoutApi` registers a buyer's order with the payment gateway and records it locally in the `Created` state.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: GatewayClient<G>,
    default_currency: String,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({})", self.default_currency)
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(db: B, gateway: GatewayClient<G>, default_currency: &str) -> Self {
        Self { db, gateway, default_currency: default_currency.to_string() }
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: MarketplaceDatabase,
    G: PaymentGateway,
{
    /// Creates a gateway order intent for the request and stores the matching order.
    ///
    /// If the request names a listing, the amount must be exactly the listing's adjusted price. Nothing is stored
    /// if the gateway call fails.
    pub async fn create_order(&self, request: CheckoutRequest) -> Result<OrderIntent, OrderFlowError> {
        if request.amount <= Decimal::ZERO {
            return Err(OrderFlowError::InvalidInput(format!("Amount must be positive, got {}", request.amount)));
        }
        if request.buyer_id.trim().is_empty() {
            return Err(OrderFlowError::InvalidInput("A buyer id is required".to_string()));
        }
        if let Some(listing_id) = request.listing_id {
            let listing = self
                .db
                .fetch_listing(listing_id)
                .await?
                .ok_or_else(|| OrderFlowError::NotFound(format!("Listing #{listing_id}")))?;
            if listing.adjusted_price != request.amount {
                info!(
                    "🔄️📦️ Checkout for listing #{listing_id} by {} offered {} but the listed price is {}",
                    request.buyer_id, request.amount, listing.adjusted_price
                );
                return Err(OrderFlowError::InvalidInput(format!(
                    "Amount {} does not match the listed price of {}",
                    request.amount, listing.adjusted_price
                )));
            }
        }
        let currency = request.currency.as_deref().unwrap_or(&self.default_currency);
        let intent = self.gateway.create_order_intent(request.amount, currency).await?;
        let mut order = NewOrder::new(intent.id.clone(), request.buyer_id, intent.amount, &intent.currency);
        if let Some(listing_id) = request.listing_id {
            order = order.with_listing(listing_id);
        }
        debug!("🔄️📦️ Recording new order. {order}");
        let (stored, inserted) = self.db.insert_order(order).await?;
        if !inserted {
            warn!(
                "🔄️📦️ The gateway returned order id {} which we have already stored (status {}). Keeping the stored \
                 record.",
                stored.gateway_order_id, stored.status
            );
        }
        info!("🔄️📦️ Order {} created for {} {}", intent.id, intent.amount, intent.currency);
        Ok(intent)
    }
}
