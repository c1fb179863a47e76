//! Vitrine Core - Shared types library.
//!
//! This crate provides the types used across all Vitrine components:
//! - `storefront` - State holders, catalog, mock auth service and HTTP server
//! - `cli` - Terminal client driving the same state
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no network access, no file
//! I/O, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, products, carts and favorites
//! - [`store`] - The keyed persistence seam shared by every session-scoped holder

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod store;
pub mod types;

pub use store::{KeyValueStore, MemoryStore, Namespace, StoreError};
pub use types::*;
