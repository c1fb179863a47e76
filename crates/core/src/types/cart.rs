//! Cart contents.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s, unique by product id, in
//! the order products were first added. Every item has a quantity of at least
//! one; loading a stored cart drops zero-quantity lines and folds duplicates.

use serde::{Deserialize, Serialize};

use crate::{Price, ProductId, ProductSummary};

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Ordered cart contents. Serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Increment the line for `product`, or append a new line with quantity 1.
    ///
    /// Returns the resulting quantity.
    pub fn add(&mut self, product: &ProductSummary) -> u32 {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }
        self.items.push(CartItem {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
        });
        1
    }

    /// Decrement the quantity of `id`, never below 1.
    ///
    /// The floor applies to this step alone; lines that end up at zero are
    /// swept afterwards. Deleting a line is [`Cart::remove`]'s job.
    pub fn decrease(&mut self, id: ProductId) {
        for item in self.items.iter_mut().filter(|i| i.id == id) {
            item.quantity = item.quantity.saturating_sub(1).max(1);
        }
        self.items.retain(|i| i.quantity > 0);
    }

    /// Delete the line for `id` whatever its quantity. Returns whether a line was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Quantity of `id`, zero when absent.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |i| i.quantity)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(raw: Vec<CartItem>) -> Self {
        let mut items: Vec<CartItem> = Vec::with_capacity(raw.len());
        for item in raw.into_iter().filter(|i| i.quantity > 0) {
            match items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => items.push(item),
            }
        }
        Self { items }
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn summary(id: i32, cents: i64) -> ProductSummary {
        ProductSummary {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(cents),
            image: format!("https://cdn.example.com/{id}.png"),
        }
    }

    #[test]
    fn test_repeated_add_counts_calls() {
        let mut cart = Cart::new();
        let p = summary(1, 999);
        for _ in 0..7 {
            cart.add(&p);
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(p.id), 7);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        cart.add(&summary(3, 100));
        cart.add(&summary(1, 100));
        cart.add(&summary(3, 100));
        let ids: Vec<i32> = cart.items().iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_decrease_floors_at_one() {
        let mut cart = Cart::new();
        let p = summary(1, 100);
        cart.add(&p);
        cart.add(&p);
        cart.decrease(p.id);
        assert_eq!(cart.quantity_of(p.id), 1);
        cart.decrease(p.id);
        assert_eq!(cart.quantity_of(p.id), 1);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_decrease_unknown_is_noop() {
        let mut cart = Cart::new();
        cart.add(&summary(1, 100));
        cart.decrease(ProductId::new(99));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_then_add_starts_fresh() {
        let mut cart = Cart::new();
        let p = summary(1, 100);
        cart.add(&p);
        cart.add(&p);
        cart.add(&p);
        assert!(cart.remove(p.id));
        assert!(!cart.remove(p.id));
        assert_eq!(cart.add(&p), 1);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        let a = summary(1, 999);
        let b = summary(2, 2500);
        cart.add(&a);
        cart.add(&a);
        cart.add(&b);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Price::from_cents(4498));
        assert_eq!(cart.get(a.id).unwrap().line_total(), Price::from_cents(1998));
    }

    #[test]
    fn test_stored_json_is_normalized() {
        let json = r#"[
            {"id":1,"title":"A","price":5,"image":"a.png","quantity":2},
            {"id":2,"title":"B","price":3,"image":"b.png","quantity":0},
            {"id":1,"title":"A","price":5,"image":"a.png","quantity":1}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 3);
        assert_eq!(cart.quantity_of(ProductId::new(2)), 0);
    }

    #[test]
    fn test_serializes_as_array() {
        let mut cart = Cart::new();
        cart.add(&summary(1, 500));
        let value = serde_json::to_value(&cart).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["quantity"], 1);
    }
}
