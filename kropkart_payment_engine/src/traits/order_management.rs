use thiserror::Error;

use crate::db_types::{GatewayOrderId, NewOrder, Order, OrderStatusType, OrderTransition, PaymentId, TransitionSource};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Illegal status change from {from} to {to}")]
    IllegalTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("A stored record could not be read. {0}")]
    CorruptRecord(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

/// Storage behaviour for [`Order`] records.
///
/// Every write that changes an order's status is conditional on the status the caller last observed. Backends must
/// guarantee that of any number of concurrent `compare_and_set_status` calls carrying the same `expected` status,
/// at most one applies.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// Stores a new order in the `Created` state. This call is idempotent on the gateway order id: if the order
    /// already exists, the stored record is returned unchanged and the second value is `false`.
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), StoreError>;

    async fn fetch_order(&self, id: &GatewayOrderId) -> Result<Option<Order>, StoreError>;

    /// Moves the order from `expected` to `new`, in a single atomic step that also
    /// * records `payment_id` on the order, if one is given (otherwise the stored payment id is kept),
    /// * stamps the timestamp column that belongs to `new`,
    /// * appends an [`OrderTransition`] row.
    ///
    /// If the order is no longer in the `expected` state (or does not exist), nothing is written and `None` is
    /// returned. Returns [`StoreError::IllegalTransition`] without touching the database if `expected -> new`
    /// is not an edge of the order state machine.
    async fn compare_and_set_status(
        &self,
        id: &GatewayOrderId,
        expected: OrderStatusType,
        new: OrderStatusType,
        payment_id: Option<&PaymentId>,
        source: TransitionSource,
    ) -> Result<Option<Order>, StoreError>;

    /// All applied transitions for the order, oldest first.
    async fn fetch_transitions(&self, id: &GatewayOrderId) -> Result<Vec<OrderTransition>, StoreError>;
}
