use actix_web::{
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::{Bytes, ServiceConfig},
    App,
};
use kpg_common::Secret;
use kropkart_payment_engine::{
    events::EventProducers,
    helpers::calculate_signature,
    CheckoutApi,
    GatewayClient,
    ListingApi,
    OrderLookupApi,
    ReconciliationApi,
    SqliteDatabase,
    VerificationApi,
};
use log::debug;

use super::mocks::MockGateway;
use crate::{
    config::ServerOptions,
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

// Test-only secrets. DO NOT re-use these anywhere.
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub async fn test_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    let url = format!("sqlite://{}/kpg_server_test_{:016x}.db", std::env::temp_dir().display(), rand::random::<u64>());
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating test database");
    db.run_migrations().await.expect("Error running DB migrations");
    db
}

/// Registers every route against `db`, with `gateway` standing in for the payment gateway.
pub fn configure(db: SqliteDatabase, gateway: MockGateway, options: ServerOptions) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let producers = EventProducers::default();
        cfg.app_data(web::Data::new(CheckoutApi::new(db.clone(), GatewayClient::new(gateway), "INR")))
            .app_data(web::Data::new(VerificationApi::new(
                db.clone(),
                Secret::new(CLIENT_SECRET.to_string()),
                producers.clone(),
            )))
            .app_data(web::Data::new(ReconciliationApi::new(
                db.clone(),
                Secret::new(WEBHOOK_SECRET.to_string()),
                producers,
            )))
            .app_data(web::Data::new(ListingApi::new(db.clone())))
            .app_data(web::Data::new(OrderLookupApi::new(db)))
            .app_data(web::Data::new(options))
            .service(health)
            .service(CreateOrderRoute::<SqliteDatabase, MockGateway>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase>::new())
            .service(WebhookRoute::<SqliteDatabase>::new())
            .service(CreateListingRoute::<SqliteDatabase>::new())
            .service(ListingByIdRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new());
    }
}

pub async fn send_request(req: TestRequest, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body: Bytes = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

pub async fn get_request(path: &str, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    send_request(TestRequest::get().uri(path), configure).await
}

pub async fn post_json(
    path: &str,
    body: serde_json::Value,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    send_request(TestRequest::post().uri(path).set_json(body), configure).await
}

pub fn sign_client(order_id: &str, payment_id: &str) -> String {
    calculate_signature(CLIENT_SECRET, format!("{order_id}|{payment_id}").as_bytes())
}

pub fn sign_webhook(body: &str) -> String {
    calculate_signature(WEBHOOK_SECRET, body.as_bytes())
}

pub fn captured_webhook(order_id: &str, payment_id: &str) -> String {
    serde_json::json!({
        "event": "payment.captured",
        "payload": { "payment": { "entity": {
            "id": payment_id,
            "order_id": order_id,
            "amount": 1990,
            "currency": "INR",
            "status": "captured"
        }}}
    })
    .to_string()
}
