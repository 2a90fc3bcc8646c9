//! The public API of the payment engine.
//!
//! Each API struct owns a handle to a backend that implements the traits it needs, so the same code runs against
//! SQLite in production and against throwaway databases in tests.
//!
//! * [`CheckoutApi`] turns a buyer's checkout request into a gateway order intent and a stored order.
//! * [`VerificationApi`] checks the payment confirmation a buyer's client submits after paying.
//! * [`ReconciliationApi`] processes the gateway's signed webhook notifications.
//! * [`ListingApi`] prices and stores marketplace listings.
//! * [`OrderLookupApi`] gives operators read access to orders and their transition history.
mod checkout_api;
mod errors;
mod gateway_client;
mod listing_api;
mod order_lookup_api;
mod reconciliation_api;
mod verification_api;

pub mod order_objects;

pub use checkout_api::CheckoutApi;
pub use errors::OrderFlowError;
pub use gateway_client::{client_signature_payload, GatewayClient, OrderIntent};
pub use listing_api::ListingApi;
pub use order_lookup_api::OrderLookupApi;
pub use reconciliation_api::ReconciliationApi;
pub use verification_api::VerificationApi;
