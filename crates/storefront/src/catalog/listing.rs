//! Category and price filtering over a fetched product collection.

use std::fmt;
use std::sync::Arc;

use vitrine_core::{Price, Product};

/// Wire name of the "every category" sentinel.
pub const ALL_CATEGORIES: &str = "all";

/// Single-selection category filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Parse a user-supplied category; `"all"` in any case selects everything.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_CATEGORIES) {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Only(category) => category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

impl PriceRange {
    #[must_use]
    pub const fn new(min: Price, max: Price) -> Self {
        Self { min, max }
    }

    /// Smallest range covering every product; zero for an empty collection.
    #[must_use]
    pub fn covering(products: &[Product]) -> Self {
        let mut prices = products.iter().map(|p| p.price);
        let Some(first) = prices.next() else {
            return Self::default();
        };
        prices.fold(Self::new(first, first), |range, price| {
            Self::new(range.min.min(price), range.max.max(price))
        })
    }

    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        self.min <= price && price <= self.max
    }
}

/// A product collection with the current category and price filters.
///
/// The price bounds are derived from the collection and the selected range is
/// reset to them whenever the collection is replaced. The category selection
/// survives replacement.
#[derive(Debug, Clone, Default)]
pub struct ProductListing {
    products: Arc<Vec<Product>>,
    categories: Vec<String>,
    bounds: PriceRange,
    range: PriceRange,
    category: CategoryFilter,
}

impl ProductListing {
    #[must_use]
    pub fn new(products: impl Into<Arc<Vec<Product>>>) -> Self {
        let mut listing = Self::default();
        listing.set_products(products);
        listing
    }

    /// Replace the collection, recomputing categories and price bounds.
    pub fn set_products(&mut self, products: impl Into<Arc<Vec<Product>>>) {
        self.products = products.into();

        self.categories.clear();
        for product in self.products.iter() {
            if !self.categories.contains(&product.category) {
                self.categories.push(product.category.clone());
            }
        }

        self.bounds = PriceRange::covering(&self.products);
        self.range = self.bounds;
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Selectable filters: [`CategoryFilter::All`] then each category.
    #[must_use]
    pub fn category_options(&self) -> Vec<CategoryFilter> {
        std::iter::once(CategoryFilter::All)
            .chain(self.categories.iter().cloned().map(CategoryFilter::Only))
            .collect()
    }

    #[must_use]
    pub const fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    /// Select the following option, wrapping after the last.
    pub fn next_category(&mut self) {
        self.step_category(1);
    }

    /// Select the preceding option, wrapping before the first.
    pub fn previous_category(&mut self) {
        let options = self.categories.len() + 1;
        self.step_category(options - 1);
    }

    fn step_category(&mut self, offset: usize) {
        let options = self.category_options();
        let current = options
            .iter()
            .position(|option| *option == self.category)
            .unwrap_or(0);
        if let Some(next) = options.get((current + offset) % options.len()) {
            self.category = next.clone();
        }
    }

    /// Cheapest and dearest prices in the collection.
    #[must_use]
    pub const fn bounds(&self) -> PriceRange {
        self.bounds
    }

    #[must_use]
    pub const fn price_range(&self) -> PriceRange {
        self.range
    }

    /// Set the lower bound, never above the current upper bound.
    pub fn set_min_price(&mut self, min: Price) {
        self.range.min = min.min(self.range.max);
    }

    /// Set the upper bound, never below the current lower bound.
    pub fn set_max_price(&mut self, max: Price) {
        self.range.max = max.max(self.range.min);
    }

    /// Products passing both filters, in collection order.
    pub fn filtered(&self) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(|p| self.category.matches(&p.category) && self.range.contains(p.price))
    }

    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filtered().count()
    }
}
