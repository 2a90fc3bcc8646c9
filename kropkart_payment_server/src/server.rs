use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use futures::FutureExt;
use kropkart_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    CheckoutApi,
    GatewayClient,
    ListingApi,
    OrderLookupApi,
    RazorpayGateway,
    ReconciliationApi,
    SqliteDatabase,
    VerificationApi,
};
use log::*;

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    routes::{
        health,
        CreateListingRoute,
        CreateOrderRoute,
        ListingByIdRoute,
        OrderByIdRoute,
        VerifyPaymentRoute,
        WebhookRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 64;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    }
    let gateway = RazorpayGateway::new(config.gateway.razorpay_config())
        .map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(ServerError::IOError)
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: RazorpayGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let bind_addr = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let checkout_api =
            CheckoutApi::new(db.clone(), GatewayClient::new(gateway.clone()), config.default_currency.as_str());
        let verification_api =
            VerificationApi::new(db.clone(), config.gateway.key_secret.clone(), producers.clone());
        let reconciliation_api =
            ReconciliationApi::new(db.clone(), config.gateway.webhook_secret.clone(), producers.clone());
        let listing_api = ListingApi::new(db.clone());
        let lookup_api = OrderLookupApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("kpg::access_log"))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(verification_api))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(listing_api))
            .app_data(web::Data::new(lookup_api))
            .app_data(web::Data::new(ServerOptions::from_config(&config)))
            .service(health)
            .service(CreateOrderRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase>::new())
            .service(WebhookRoute::<SqliteDatabase>::new())
            .service(CreateListingRoute::<SqliteDatabase>::new())
            .service(ListingByIdRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((bind_addr.0.as_str(), bind_addr.1))?
    .run();
    Ok(srv)
}

/// Hooks that record confirmed payments in the application log.
pub fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_verified(|ev| {
            info!(
                "🔔️ Order {} is verified by the buyer's client (payment {:?}). Awaiting capture.",
                ev.order.gateway_order_id, ev.order.payment_id
            );
            async {}.boxed()
        })
        .on_order_captured(|ev| {
            info!(
                "🔔️ Order {} has been captured. {} {} received for buyer {}",
                ev.order.gateway_order_id, ev.order.amount, ev.order.currency, ev.order.buyer_id
            );
            async {}.boxed()
        });
    hooks
}
