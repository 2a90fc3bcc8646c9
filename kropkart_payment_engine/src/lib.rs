//! KropKart Payment Engine
//!
//! The payment engine decides when a marketplace order has really been paid for. Buyers pay through an external
//! payment gateway, and two independent signals then arrive for the same order: a confirmation from the buyer's
//! client, and a signed webhook from the gateway itself. Either can arrive first, and either can be repeated. The
//! engine makes sure that every order converges on a single correct state no matter how these signals interleave.
//!
//! The library is divided into these sections:
//! 1. Capability traits ([`mod@traits`]) and their implementations: a SQLite store ([`SqliteDatabase`]) and a
//!    Razorpay gateway ([`RazorpayGateway`]). All order status changes go through a conditional write, so the database
//!    is the only point of mutual exclusion.
//! 2. The public API ([`CheckoutApi`], [`VerificationApi`], [`ReconciliationApi`], [`ListingApi`] and
//!    [`OrderLookupApi`]). Each is generic over the backend it needs and has no global state.
//! 3. Pure helpers for listing prices and signatures ([`mod@helpers`]).
//!
//! Subscribers can be notified when an order is verified or captured via [`mod@events`].
pub mod db_types;
pub mod events;
pub mod helpers;
mod kpe_api;
mod razorpay;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use kpe_api::{
    client_signature_payload,
    order_objects,
    CheckoutApi,
    GatewayClient,
    ListingApi,
    OrderFlowError,
    OrderIntent,
    OrderLookupApi,
    ReconciliationApi,
    VerificationApi,
};
pub use razorpay::{RazorpayConfig, RazorpayGateway, DEFAULT_GATEWAY_TIMEOUT, DEFAULT_GATEWAY_URL};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
