//! Vitrine storefront library.
//!
//! Session, cart and favorites state over a pluggable store, catalog browsing
//! against a remote product API, the code login flow, simulated checkout, and
//! the mock code login HTTP server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod bucket;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod favorites;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod shop;
pub mod state;
pub mod store;
pub mod telemetry;
