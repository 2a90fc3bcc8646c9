use actix_web::http::StatusCode;
use kpg_common::MinorUnits;
use kropkart_payment_engine::{
    db_types::OrderStatusType,
    order_objects::OrderWithHistory,
    traits::{GatewayError, GatewayOrder, OrderManagement},
    OrderIntent,
};
use mockall::predicate::{always, eq};
use serde_json::json;

use super::{helpers::*, mocks::MockGateway};
use crate::config::ServerOptions;

fn gateway_returning(id: &'static str, amount: i64) -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().with(eq(MinorUnits::from(amount)), eq("INR"), always()).times(1).returning(
        move |amount, currency, _| {
            Ok(GatewayOrder {
                id: id.to_string(),
                amount: amount.value(),
                currency: currency.to_string(),
                status: "created".to_string(),
            })
        },
    );
    gateway
}

fn unused_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().never();
    gateway
}

#[actix_web::test]
async fn health_check() {
    let db = test_db().await;
    let (status, body) = get_request("/health", configure(db, unused_gateway(), ServerOptions::default())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn checkout_creates_order_intent() {
    let db = test_db().await;
    let gateway = gateway_returning("order_mock1", 1990);
    let (status, body) = post_json(
        "/orders",
        json!({"amount": 19.9, "buyer_id": "buyer-1"}),
        configure(db.clone(), gateway, ServerOptions::default()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let intent: OrderIntent = serde_json::from_str(&body).unwrap();
    assert_eq!(intent.id.as_str(), "order_mock1");
    assert_eq!(intent.amount.value(), 1990);
    assert_eq!(intent.currency, "INR");

    let (status, body) =
        get_request("/orders/order_mock1", configure(db.clone(), unused_gateway(), ServerOptions::default())).await;
    assert_eq!(status, StatusCode::OK);
    let found: OrderWithHistory = serde_json::from_str(&body).unwrap();
    assert_eq!(found.order.status, OrderStatusType::Created);
    assert_eq!(found.order.buyer_id, "buyer-1");
    assert!(found.transitions.is_empty());
}

#[actix_web::test]
async fn checkout_with_bad_amount() {
    let db = test_db().await;
    let (status, body) = post_json(
        "/orders",
        json!({"amount": -3, "buyer_id": "buyer-1"}),
        configure(db.clone(), unused_gateway(), ServerOptions::default()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("\"error\""));

    let (status, _) = post_json(
        "/orders",
        json!({"amount": "lots", "buyer_id": "buyer-1"}),
        configure(db, unused_gateway(), ServerOptions::default()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn checkout_for_unknown_listing() {
    let db = test_db().await;
    let (status, _) = post_json(
        "/orders",
        json!({"amount": 10, "buyer_id": "buyer-1", "listing_id": 42}),
        configure(db, unused_gateway(), ServerOptions::default()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn gateway_failure_is_bad_gateway() {
    let db = test_db().await;
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().times(1).returning(|_, _, _| Err(GatewayError::Timeout));
    let (status, body) = post_json(
        "/orders",
        json!({"amount": 10, "currency": "usd", "buyer_id": "buyer-1"}),
        configure(db.clone(), gateway, ServerOptions::default()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("did not respond in time"));
    assert!(db.fetch_order(&"order_mock1".into()).await.unwrap().is_none());
}

#[actix_web::test]
async fn unknown_order_is_not_found() {
    let db = test_db().await;
    let (status, body) =
        get_request("/orders/order_missing", configure(db, unused_gateway(), ServerOptions::default())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "The data was not found. Order [order_missing]"}).to_string());
}
