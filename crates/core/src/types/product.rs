//! Catalog product types.

use serde::{Deserialize, Serialize};

use crate::{Price, ProductId};

/// A product as served by the remote catalog. Read-only to the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub category: String,
}

impl Product {
    /// First image, used as the listing and cart thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// The fields a cart line needs.
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary::from(self)
    }
}

/// Product reference passed to `add_to_cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.thumbnail().unwrap_or_default().to_string(),
        }
    }
}
