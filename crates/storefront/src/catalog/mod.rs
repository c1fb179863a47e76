//! Product catalog: remote fetch, filtering and incremental reveal.
//!
//! [`CatalogClient`] talks to the remote product/user API and caches its
//! responses. [`ProductListing`] filters a fetched collection by category and
//! price range, and [`InfiniteScroll`] reveals the filtered result one page at
//! a time. [`ProductBrowser`] ties the two together for a product grid.

mod browser;
mod client;
mod listing;
mod scroll;

pub use browser::ProductBrowser;
pub use client::CatalogClient;
pub use listing::{ALL_CATEGORIES, CategoryFilter, PriceRange, ProductListing};
pub use scroll::{InfiniteScroll, LOAD_DELAY, PAGE_SIZE, Paginator};

use thiserror::Error;

/// Errors from the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Catalog API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Base URL could not be joined with an endpoint path.
    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}
