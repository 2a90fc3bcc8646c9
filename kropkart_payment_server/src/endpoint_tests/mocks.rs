use kpg_common::MinorUnits;
use kropkart_payment_engine::traits::{GatewayError, GatewayOrder, PaymentGateway};
use mockall::mock;

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_order(&self, amount: MinorUnits, currency: &str, receipt: &str) -> Result<GatewayOrder, GatewayError>;
    }
}
