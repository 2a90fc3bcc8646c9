use actix_web::http::StatusCode;
use kpg_common::MinorUnits;
use kropkart_payment_engine::{db_types::Listing, traits::GatewayOrder};
use mockall::predicate::{always, eq};
use rust_decimal_macros::dec;
use serde_json::json;

use super::{helpers::*, mocks::MockGateway};
use crate::config::ServerOptions;

fn no_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().never();
    gateway
}

#[actix_web::test]
async fn create_and_fetch_listing() {
    let db = test_db().await;
    let (status, body) = post_json(
        "/listings",
        json!({
            "owner": "farmer-9",
            "name": "Organic Turmeric",
            "description": "Premium quality, grade A",
            "category": "spices",
            "base_price": "100.00"
        }),
        configure(db.clone(), no_gateway(), ServerOptions::default()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let listing: Listing = serde_json::from_str(&body).unwrap();
    assert_eq!(listing.quality_score, dec!(0.95));
    assert_eq!(listing.adjusted_price, dec!(110.00));

    let path = format!("/listings/{}", listing.id);
    let (status, body) = get_request(&path, configure(db.clone(), no_gateway(), ServerOptions::default())).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Listing = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched, listing);

    // Buyers must pay the listed price
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().with(eq(MinorUnits::from(11_000)), eq("INR"), always()).times(1).returning(
        |amount, currency, _| {
            Ok(GatewayOrder {
                id: "order_listing".into(),
                amount: amount.value(),
                currency: currency.into(),
                status: "created".into(),
            })
        },
    );
    let (status, _) = post_json(
        "/orders",
        json!({"amount": "100", "buyer_id": "buyer-2", "listing_id": listing.id}),
        configure(db.clone(), no_gateway(), ServerOptions::default()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = post_json(
        "/orders",
        json!({"amount": "110.00", "buyer_id": "buyer-2", "listing_id": listing.id}),
        configure(db, gateway, ServerOptions::default()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[actix_web::test]
async fn invalid_listings_are_rejected() {
    let db = test_db().await;
    for body in [
        json!({"owner": "farmer-9", "name": "Rice", "base_price": "abc"}),
        json!({"owner": "farmer-9", "name": "Rice", "base_price": 0}),
        json!({"owner": "farmer-9", "name": "  ", "base_price": 10}),
    ] {
        let (status, _) =
            post_json("/listings", body.clone(), configure(db.clone(), no_gateway(), ServerOptions::default())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }
    let (status, _) = get_request("/listings/999", configure(db, no_gateway(), ServerOptions::default())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
