use std::fmt::Debug;

use kpg_common::Secret;
use log::*;

use crate::{
    db_types::{GatewayOrderId, Order, OrderStatusType, TransitionSource},
    events::{EventProducers, OrderCapturedEvent},
    helpers::verify_signature,
    kpe_api::{
        errors::OrderFlowError,
        order_objects::{PaymentEntity, WebhookEvent, WebhookOutcome, PAYMENT_CAPTURED_EVENT},
    },
    traits::OrderManagement,
};

const MAX_WRITE_ATTEMPTS: usize = 2;

/// `ReconciliationApi` brings local order state in line with the gateway's own records, as reported through its
/// signed webhook.
///
/// The webhook is authoritative. A `payment.captured` notification moves an order to `Captured` from any
/// non-terminal state, and overwrites whatever payment id the client reported.
pub struct ReconciliationApi<B> {
    db: B,
    webhook_secret: Secret<String>,
    producers: EventProducers,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, webhook_secret: Secret<String>, producers: EventProducers) -> Self {
        Self { db, webhook_secret, producers }
    }
}

impl<B> ReconciliationApi<B>
where B: OrderManagement
{
    /// Processes a webhook delivery. `body` must be the exact bytes that were received, since the signature covers
    /// them.
    ///
    /// Only a bad signature or a storage failure produces an error. Anything else that cannot be acted on, including
    /// an order that keeps changing under every write attempt, is returned as [`WebhookOutcome::Ignored`].
    pub async fn process_webhook(&self, body: &[u8], signature: Option<&str>) -> Result<WebhookOutcome, OrderFlowError> {
        if !verify_signature(body, signature, &self.webhook_secret) {
            warn!("🪝️ Webhook signature is missing or invalid. Rejecting the delivery.");
            return Err(OrderFlowError::Signature);
        }
        let event = match serde_json::from_slice::<WebhookEvent>(body) {
            Ok(event) => event,
            Err(e) => {
                warn!("🪝️ Could not parse webhook body. {e}");
                return Ok(WebhookOutcome::Ignored(format!("Unrecognised webhook body. {e}")));
            },
        };
        if event.event != PAYMENT_CAPTURED_EVENT {
            debug!("🪝️ Ignoring '{}' webhook event", event.event);
            return Ok(WebhookOutcome::Ignored(format!("Event '{}' is not handled", event.event)));
        }
        let entity = event.payload.payment.entity;
        let Some(oid) = entity.order_id.clone() else {
            warn!("🪝️ Captured payment {} carries no order id", entity.id);
            return Ok(WebhookOutcome::Ignored(format!("Payment {} has no order id", entity.id)));
        };
        match self.db.fetch_order(&oid).await? {
            Some(order) => self.capture(order, &entity).await,
            None => {
                warn!("🪝️ Received capture of payment {} for unknown order {oid}", entity.id);
                Ok(WebhookOutcome::Ignored(format!("Order {oid} is unknown")))
            },
        }
    }

    async fn capture(&self, mut order: Order, entity: &PaymentEntity) -> Result<WebhookOutcome, OrderFlowError> {
        let oid = order.gateway_order_id.clone();
        check_amount(&order, entity);
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            if order.status == OrderStatusType::Captured {
                debug!("🪝️ Order {oid} has already been captured");
                return Ok(WebhookOutcome::AlreadyCaptured(order));
            }
            let updated = self
                .db
                .compare_and_set_status(
                    &oid,
                    order.status,
                    OrderStatusType::Captured,
                    Some(&entity.id),
                    TransitionSource::Webhook,
                )
                .await?;
            if let Some(updated) = updated {
                info!("🪝️ Order {oid} captured with payment {} (was {})", entity.id, order.status);
                self.call_order_captured_hook(&updated).await;
                return Ok(WebhookOutcome::Captured(updated));
            }
            debug!("🪝️ Order {oid} changed underneath us (attempt {attempt}). Re-reading.");
            order = self.fetch_order(&oid).await?;
        }
        if order.status == OrderStatusType::Captured {
            return Ok(WebhookOutcome::AlreadyCaptured(order));
        }
        error!(
            "🪝️ Order {oid} kept changing while capturing payment {} and is still {}. Acknowledging the delivery \
             without a capture.",
            entity.id, order.status
        );
        Ok(WebhookOutcome::Ignored(format!("Order {oid} is in state {} and could not be captured", order.status)))
    }

    async fn fetch_order(&self, oid: &GatewayOrderId) -> Result<Order, OrderFlowError> {
        self.db.fetch_order(oid).await?.ok_or_else(|| OrderFlowError::NotFound(format!("Order {oid}")))
    }

    async fn call_order_captured_hook(&self, order: &Order) {
        for emitter in &self.producers.order_captured_producer {
            debug!("🪝️ Notifying order captured hook subscribers");
            let event = OrderCapturedEvent { order: order.clone() };
            emitter.publish_event(event).await;
        }
    }
}

fn check_amount(order: &Order, entity: &PaymentEntity) {
    if let Some(amount) = entity.amount {
        if amount != order.amount.value() {
            warn!(
                "🪝️ Payment {} for order {} captured {amount} minor units, but the order is for {}",
                entity.id,
                order.gateway_order_id,
                order.amount.value()
            );
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use chrono::Utc;
    use kpg_common::MinorUnits;

    use super::*;
    use crate::{
        db_types::{NewOrder, OrderTransition, PaymentId},
        helpers::calculate_signature,
        traits::StoreError,
    };

    const SECRET: &str = "webhook-secret";

    /// A store whose order always reads as `ClientVerified`, and that loses every conditional write.
    #[derive(Clone, Default)]
    struct ContendedStore {
        writes: Arc<AtomicUsize>,
    }

    fn verified_order(id: &GatewayOrderId) -> Order {
        let now = Utc::now();
        Order {
            id: 1,
            gateway_order_id: id.clone(),
            buyer_id: "buyer-1".into(),
            listing_id: None,
            amount: MinorUnits::from(1990),
            currency: "INR".into(),
            status: OrderStatusType::ClientVerified,
            payment_id: Some("pay_client".into()),
            created_at: now,
            client_verified_at: Some(now),
            captured_at: None,
            failed_at: None,
            updated_at: now,
        }
    }

    impl OrderManagement for ContendedStore {
        async fn insert_order(&self, _order: NewOrder) -> Result<(Order, bool), StoreError> {
            unimplemented!()
        }

        async fn fetch_order(&self, id: &GatewayOrderId) -> Result<Option<Order>, StoreError> {
            Ok(Some(verified_order(id)))
        }

        async fn compare_and_set_status(
            &self,
            _id: &GatewayOrderId,
            _expected: OrderStatusType,
            _new: OrderStatusType,
            _payment_id: Option<&PaymentId>,
            _source: TransitionSource,
        ) -> Result<Option<Order>, StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn fetch_transitions(&self, _id: &GatewayOrderId) -> Result<Vec<OrderTransition>, StoreError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn contended_capture_is_acknowledged() {
        let store = ContendedStore::default();
        let api = ReconciliationApi::new(store.clone(), Secret::new(SECRET.to_string()), EventProducers::default());
        let body = r#"{"event":"payment.captured","payload":{"payment":{"entity":{"id":"pay_hook","order_id":"order_1","amount":1990}}}}"#;
        let signature = calculate_signature(SECRET, body.as_bytes());
        let outcome = api.process_webhook(body.as_bytes(), Some(&signature)).await.unwrap();
        assert!(matches!(outcome, WebhookOutcome::Ignored(_)), "was {outcome}");
        assert_eq!(store.writes.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);
    }
}
