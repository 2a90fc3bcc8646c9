//! # Capability contracts
//!
//! The engine never talks to a concrete database or payment gateway directly. Instead, each API is built on top of
//! one of these traits, and a backend is injected when the API is constructed.
//!
//! * [`OrderManagement`] persists orders and applies conditional (compare-and-swap) status updates. It is the only
//!   point of mutual exclusion for an order; no in-process locks are used.
//! * [`ListingManagement`] stores priced listings. Listings are write-once.
//! * [`MarketplaceDatabase`] is the combination of the two, which the checkout flow needs.
//! * [`PaymentGateway`] is the external payment provider that creates order intents.
mod listing_management;
mod order_management;
mod payment_gateway;

pub use listing_management::ListingManagement;
pub use order_management::{OrderManagement, StoreError};
pub use payment_gateway::{GatewayError, GatewayOrder, PaymentGateway};

/// A backend that can store both orders and listings.
pub trait MarketplaceDatabase: OrderManagement + ListingManagement {}

impl<T> MarketplaceDatabase for T where T: OrderManagement + ListingManagement {}
