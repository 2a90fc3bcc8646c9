//! # KropKart payment server
//! This crate hosts the HTTP front end for the KropKart payment engine. It is responsible for:
//! * Creating gateway order intents when a buyer checks out.
//! * Verifying the payment confirmation the buyer's client sends once payment is complete.
//! * Receiving the payment gateway's signed webhooks and reconciling order state with them.
//! * Pricing and serving marketplace listings.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /orders`: Checkout. Returns the gateway order intent.
//! * `POST /payments/verify`: Client payment confirmation.
//! * `POST /webhook`: Gateway notifications. The signature is read from the configured header.
//! * `POST /listings` and `GET /listings/{id}`: Marketplace listings.
//! * `GET /orders/{gateway_order_id}`: An order and its transition history.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
