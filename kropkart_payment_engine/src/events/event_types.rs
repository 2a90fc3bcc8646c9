use crate::db_types::Order;

/// Published when a buyer's client confirmation moves an order to `ClientVerified`. Settlement is still tentative
/// at this point.
#[derive(Debug, Clone)]
pub struct OrderVerifiedEvent {
    pub order: Order,
}

/// Published when the gateway's capture notification moves an order to `Captured`.
#[derive(Debug, Clone)]
pub struct OrderCapturedEvent {
    pub order: Order,
}
