//! Core types for Vitrine.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod favorites;
pub mod id;
pub mod identity;
pub mod price;
pub mod product;

pub use cart::{Cart, CartItem};
pub use email::{Email, EmailError};
pub use favorites::FavoriteSet;
pub use id::*;
pub use identity::Identity;
pub use price::Price;
pub use product::{Product, ProductSummary};
