//! Product grid state: filters plus infinite scroll.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use vitrine_core::{Price, Product};

use super::listing::{CategoryFilter, ProductListing};
use super::scroll::{InfiniteScroll, LOAD_DELAY, PAGE_SIZE, Paginator};

/// Filtered, incrementally revealed view of the product collection.
///
/// Changing a filter does not move the scroll cursor.
#[derive(Debug, Default)]
pub struct ProductBrowser {
    listing: ProductListing,
    scroll: InfiniteScroll,
}

impl ProductBrowser {
    #[must_use]
    pub fn new(products: impl Into<Arc<Vec<Product>>>) -> Self {
        Self::with_paging(products, PAGE_SIZE, LOAD_DELAY)
    }

    #[must_use]
    pub fn with_paging(
        products: impl Into<Arc<Vec<Product>>>,
        page_size: usize,
        delay: Duration,
    ) -> Self {
        Self {
            listing: ProductListing::new(products),
            scroll: InfiniteScroll::new(page_size, delay),
        }
    }

    #[must_use]
    pub const fn listing(&self) -> &ProductListing {
        &self.listing
    }

    pub fn set_products(&mut self, products: impl Into<Arc<Vec<Product>>>) {
        self.listing.set_products(products);
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.listing.set_category(category);
    }

    pub fn next_category(&mut self) {
        self.listing.next_category();
    }

    pub fn previous_category(&mut self) {
        self.listing.previous_category();
    }

    pub fn set_min_price(&mut self, min: Price) {
        self.listing.set_min_price(min);
    }

    pub fn set_max_price(&mut self, max: Price) {
        self.listing.set_max_price(max);
    }

    /// Products currently revealed.
    #[must_use]
    pub fn visible_products(&self) -> Vec<&Product> {
        self.listing.filtered().take(self.scroll.visible()).collect()
    }

    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.listing.filtered_len()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.scroll.is_loading()
    }

    /// Whether to render the loading sentinel under the grid.
    #[must_use]
    pub fn show_sentinel(&self) -> bool {
        self.scroll.paginator().show_sentinel(self.filtered_len())
    }

    /// The sentinel scrolled into view; see [`InfiniteScroll::sentinel_visible`].
    pub fn sentinel_visible(&self) -> bool {
        self.scroll.sentinel_visible(self.filtered_len())
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Paginator> {
        self.scroll.subscribe()
    }
}
