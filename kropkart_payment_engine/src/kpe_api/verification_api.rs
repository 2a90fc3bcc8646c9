use std::fmt::Debug;

use kpg_common::Secret;
use log::*;

use crate::{
    db_types::{GatewayOrderId, Order, OrderStatusType, TransitionSource},
    events::{EventProducers, OrderVerifiedEvent},
    helpers::verify_signature,
    kpe_api::{
        errors::OrderFlowError,
        gateway_client::client_signature_payload,
        order_objects::{VerificationOutcome, VerifyPaymentRequest},
    },
    traits::OrderManagement,
};

/// Number of conditional writes attempted before a request is reported as a conflict.
const MAX_WRITE_ATTEMPTS: usize = 2;

/// `VerificationApi` handles the payment confirmation that the buyer's client sends after completing payment.
///
/// A valid confirmation is only a tentative signal: the order moves to `ClientVerified`, and the gateway's capture
/// webhook (see [`crate::ReconciliationApi`]) has the final say.
pub struct VerificationApi<B> {
    db: B,
    secret: Secret<String>,
    producers: EventProducers,
}

impl<B> Debug for VerificationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerificationApi")
    }
}

impl<B> VerificationApi<B> {
    pub fn new(db: B, secret: Secret<String>, producers: EventProducers) -> Self {
        Self { db, secret, producers }
    }
}

impl<B> VerificationApi<B>
where B: OrderManagement
{
    /// Verifies a client payment confirmation and records it against the order.
    ///
    /// Submitting the same confirmation twice is harmless: the second call returns
    /// [`VerificationOutcome::AlreadyVerified`] and writes nothing. A confirmation with a different payment id for an
    /// order that is already verified is a [`OrderFlowError::Conflict`].
    ///
    /// A confirmation with a bad signature marks a `Created` or `ClientVerified` order as `Failed`. Captured orders
    /// are left alone.
    pub async fn verify_payment(&self, request: VerifyPaymentRequest) -> Result<VerificationOutcome, OrderFlowError> {
        let VerifyPaymentRequest { gateway_order_id: oid, payment_id, signature } = request;
        let payload = client_signature_payload(&oid, &payment_id);
        if !verify_signature(&payload, Some(&signature), &self.secret) {
            warn!("🔄️🔏️ Client confirmation for order {oid} (payment {payment_id}) has an invalid signature");
            self.mark_failed(&oid).await;
            return Err(OrderFlowError::Signature);
        }
        let mut order = self.fetch_order(&oid).await?;
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let status = order.status;
            match status {
                OrderStatusType::Captured => {
                    if order.payment_id.as_ref() != Some(&payment_id) {
                        warn!(
                            "🔄️🔏️ Order {oid} was captured with payment {:?}, but the client confirmed payment \
                             {payment_id}",
                            order.payment_id
                        );
                    }
                    return Ok(VerificationOutcome::AlreadyCaptured(order));
                },
                OrderStatusType::ClientVerified if order.payment_id.as_ref() == Some(&payment_id) => {
                    debug!("🔄️🔏️ Order {oid} was already verified with payment {payment_id}");
                    return Ok(VerificationOutcome::AlreadyVerified(order));
                },
                OrderStatusType::ClientVerified => {
                    warn!(
                        "🔄️🔏️ Order {oid} is already verified with payment {:?}. Rejecting confirmation for payment \
                         {payment_id}",
                        order.payment_id
                    );
                    return Err(OrderFlowError::Conflict(
                        oid,
                        "The order has already been verified with a different payment".to_string(),
                    ));
                },
                OrderStatusType::Failed => {
                    return Err(OrderFlowError::Conflict(
                        oid,
                        "A previous confirmation for this order failed verification".to_string(),
                    ));
                },
                OrderStatusType::Created => {
                    let updated = self
                        .db
                        .compare_and_set_status(
                            &oid,
                            OrderStatusType::Created,
                            OrderStatusType::ClientVerified,
                            Some(&payment_id),
                            TransitionSource::Client,
                        )
                        .await?;
                    if let Some(updated) = updated {
                        info!("🔄️🔏️ Order {oid} verified by client with payment {payment_id}");
                        self.call_order_verified_hook(&updated).await;
                        return Ok(VerificationOutcome::Verified(updated));
                    }
                    debug!("🔄️🔏️ Order {oid} changed underneath us (attempt {attempt}). Re-reading.");
                    order = self.fetch_order(&oid).await?;
                },
            }
        }
        Err(OrderFlowError::Conflict(oid, format!("Order is in state {} and could not be verified", order.status)))
    }

    async fn fetch_order(&self, oid: &GatewayOrderId) -> Result<Order, OrderFlowError> {
        self.db.fetch_order(oid).await?.ok_or_else(|| {
            debug!("🔄️🔏️ Order {oid} does not exist");
            OrderFlowError::NotFound(format!("Order {oid}"))
        })
    }

    async fn mark_failed(&self, oid: &GatewayOrderId) {
        for from in OrderStatusType::Failed.predecessors() {
            let result = self
                .db
                .compare_and_set_status(oid, *from, OrderStatusType::Failed, None, TransitionSource::Client)
                .await;
            match result {
                Ok(Some(_)) => {
                    info!("🔄️🔏️ Order {oid} marked as failed (was {from})");
                    return;
                },
                Ok(None) => trace!("🔄️🔏️ Order {oid} is missing or not in the {from} state"),
                Err(e) => {
                    error!("🔄️🔏️ Could not mark order {oid} as failed. {e}");
                    return;
                },
            }
        }
        debug!("🔄️🔏️ Order {oid} was not marked as failed");
    }

    async fn call_order_verified_hook(&self, order: &Order) {
        for emitter in &self.producers.order_verified_producer {
            debug!("🔄️🔏️ Notifying order verified hook subscribers");
            let event = OrderVerifiedEvent { order: order.clone() };
            emitter.publish_event(event).await;
        }
    }
}
