use actix_web::{http::StatusCode, test::TestRequest};
use kpg_common::MinorUnits;
use kropkart_payment_engine::{
    db_types::{NewOrder, OrderStatusType},
    traits::OrderManagement,
    SqliteDatabase,
};
use serde_json::json;

use super::{helpers::*, mocks::MockGateway};
use crate::{
    config::ServerOptions,
    data_objects::{JsonResponse, VerificationResponse},
};

fn no_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().never();
    gateway
}

async fn db_with_order(id: &str) -> SqliteDatabase {
    let db = test_db().await;
    db.insert_order(NewOrder::new(id.into(), "buyer-1".into(), MinorUnits::from(1990), "INR"))
        .await
        .expect("Error inserting order");
    db
}

async fn verify(db: &SqliteDatabase, order_id: &str, payment_id: &str, signature: &str) -> (StatusCode, String) {
    let body = json!({"gateway_order_id": order_id, "payment_id": payment_id, "signature": signature});
    post_json("/payments/verify", body, configure(db.clone(), no_gateway(), ServerOptions::default())).await
}

async fn deliver_webhook(
    db: &SqliteDatabase,
    body: &str,
    header: Option<(&str, String)>,
    options: ServerOptions,
) -> (StatusCode, String) {
    let mut req = TestRequest::post()
        .uri("/webhook")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string());
    if let Some(header) = header {
        req = req.insert_header(header);
    }
    send_request(req, configure(db.clone(), no_gateway(), options)).await
}

async fn status_of(db: &SqliteDatabase, id: &str) -> OrderStatusType {
    db.fetch_order(&id.into()).await.unwrap().unwrap().status
}

#[actix_web::test]
async fn verify_payment_twice() {
    let db = db_with_order("order_v1").await;
    let sig = sign_client("order_v1", "pay_1");
    let (status, body) = verify(&db, "order_v1", "pay_1", &sig).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let response: VerificationResponse = serde_json::from_str(&body).unwrap();
    assert!(response.success);
    assert_eq!(response.outcome, "verified");
    assert_eq!(response.order.status, OrderStatusType::ClientVerified);

    let (status, body) = verify(&db, "order_v1", "pay_1", &sig).await;
    assert_eq!(status, StatusCode::OK);
    let response: VerificationResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(response.outcome, "already_verified");
    assert_eq!(db.fetch_transitions(&"order_v1".into()).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn verify_with_bad_signature() {
    let db = db_with_order("order_v2").await;
    let (status, body) = verify(&db, "order_v2", "pay_1", &sign_client("order_v2", "pay_2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Signature verification failed."}).to_string());
    assert_eq!(status_of(&db, "order_v2").await, OrderStatusType::Failed);
}

#[actix_web::test]
async fn verify_unknown_order() {
    let db = test_db().await;
    let (status, _) = verify(&db, "order_nope", "pay_1", &sign_client("order_nope", "pay_1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn verify_different_payment_conflicts() {
    let db = db_with_order("order_v3").await;
    let (status, _) = verify(&db, "order_v3", "pay_1", &sign_client("order_v3", "pay_1")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = verify(&db, "order_v3", "pay_2", &sign_client("order_v3", "pay_2")).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[actix_web::test]
async fn webhook_captures_order() {
    let db = db_with_order("order_w1").await;
    let body = captured_webhook("order_w1", "pay_hook");
    let header = ("X-Signature", sign_webhook(&body));
    let (status, response) = deliver_webhook(&db, &body, Some(header.clone()), ServerOptions::default()).await;
    assert_eq!(status, StatusCode::OK, "{response}");
    let response: JsonResponse = serde_json::from_str(&response).unwrap();
    assert!(response.success);
    let order = db.fetch_order(&"order_w1".into()).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Captured);
    assert_eq!(order.payment_id.unwrap().as_str(), "pay_hook");

    // Redelivery is acknowledged without a second write
    let (status, _) = deliver_webhook(&db, &body, Some(header), ServerOptions::default()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(db.fetch_transitions(&"order_w1".into()).await.unwrap().len(), 1);

    // The client's late confirmation is accepted
    let (status, body) = verify(&db, "order_w1", "pay_hook", &sign_client("order_w1", "pay_hook")).await;
    assert_eq!(status, StatusCode::OK);
    let response: VerificationResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(response.outcome, "already_captured");
}

#[actix_web::test]
async fn tampered_webhook_is_rejected() {
    let db = db_with_order("order_w2").await;
    let body = captured_webhook("order_w2", "pay_hook");
    let sig = sign_webhook(&body);
    let tampered = body.replace("pay_hook", "pay_evil");
    let (status, _) = deliver_webhook(&db, &tampered, Some(("X-Signature", sig)), ServerOptions::default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = deliver_webhook(&db, &body, None, ServerOptions::default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(status_of(&db, "order_w2").await, OrderStatusType::Created);
}

#[actix_web::test]
async fn webhook_signature_header_is_configurable() {
    let db = db_with_order("order_w3").await;
    let body = captured_webhook("order_w3", "pay_hook");
    let options = ServerOptions { webhook_signature_header: "X-Razorpay-Signature".into() };
    let (status, _) =
        deliver_webhook(&db, &body, Some(("X-Signature", sign_webhook(&body))), options.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = deliver_webhook(&db, &body, Some(("X-Razorpay-Signature", sign_webhook(&body))), options).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(status_of(&db, "order_w3").await, OrderStatusType::Captured);
}

#[actix_web::test]
async fn irrelevant_webhook_is_acknowledged() {
    let db = test_db().await;
    let body = captured_webhook("order_unknown", "pay_hook");
    let (status, response) =
        deliver_webhook(&db, &body, Some(("X-Signature", sign_webhook(&body))), ServerOptions::default()).await;
    assert_eq!(status, StatusCode::OK);
    let response: JsonResponse = serde_json::from_str(&response).unwrap();
    assert!(!response.success);
}

#[actix_web::test]
async fn storage_failure_is_not_acknowledged() {
    let db = db_with_order("order_w4").await;
    db.close().await;
    let body = captured_webhook("order_w4", "pay_hook");
    let (status, _) =
        deliver_webhook(&db, &body, Some(("X-Signature", sign_webhook(&body))), ServerOptions::default()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
