use std::fmt::Debug;

use crate::{
    db_types::GatewayOrderId,
    kpe_api::{errors::OrderFlowError, order_objects::OrderWithHistory},
    traits::OrderManagement,
};

/// Read-only access to orders for operators.
pub struct OrderLookupApi<B> {
    db: B,
}

impl<B> Debug for OrderLookupApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderLookupApi")
    }
}

impl<B> OrderLookupApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches the order together with every status transition applied to it, oldest first.
    pub async fn fetch_order(&self, id: &GatewayOrderId) -> Result<OrderWithHistory, OrderFlowError> {
        let order = self.db.fetch_order(id).await?.ok_or_else(|| OrderFlowError::NotFound(format!("Order {id}")))?;
        let transitions = self.db.fetch_transitions(id).await?;
        Ok(OrderWithHistory { order, transitions })
    }
}
