//! Cart state scoped to the current session.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, instrument};
use vitrine_core::{
    Cart, Identity, KeyValueStore, Namespace, Price, ProductId, ProductSummary, StoreError,
};

use crate::bucket::{Scoped, SessionBucket};
use crate::session::SessionObserver;

/// The logged-in user's cart, persisted under `cart/{user_id}`.
///
/// Register it with [`SessionState::observe`](crate::session::SessionState::observe)
/// so it reloads on login and logout. Without a session the cart is empty and
/// every mutation is a no-op.
pub struct CartState {
    bucket: SessionBucket<Cart>,
}

impl CartState {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            bucket: SessionBucket::new(Namespace::Cart, store),
        }
    }

    /// Current contents.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.bucket.snapshot()
    }

    /// Receive the cart after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Scoped<Cart>> {
        self.bucket.subscribe()
    }

    /// Sum of `price × quantity`.
    #[must_use]
    pub fn total(&self) -> Price {
        self.bucket.with(Cart::total)
    }

    /// Units in the cart, for the navigation badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.bucket.with(Cart::item_count)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bucket.with(Cart::is_empty)
    }

    /// Add one unit of `product`.
    ///
    /// Returns the line's new quantity, or `None` without a session.
    ///
    /// # Errors
    ///
    /// Returns the store error if the cart could not be persisted.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(&self, product: &ProductSummary) -> Result<Option<u32>, StoreError> {
        let quantity = self.bucket.mutate(|cart| cart.add(product))?;
        debug!(?quantity, "Added to cart");
        Ok(quantity)
    }

    /// Take one unit off `id`, keeping at least one.
    ///
    /// # Errors
    ///
    /// Returns the store error if the cart could not be persisted.
    #[instrument(skip(self))]
    pub fn decrease_quantity(&self, id: ProductId) -> Result<(), StoreError> {
        self.bucket.mutate(|cart| cart.decrease(id))?;
        Ok(())
    }

    /// Delete the line for `id` whatever its quantity.
    ///
    /// # Errors
    ///
    /// Returns the store error if the cart could not be persisted.
    #[instrument(skip(self))]
    pub fn remove_from_cart(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self.bucket.mutate(|cart| cart.remove(id))?.unwrap_or(false))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns the store error if the cart could not be persisted.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) -> Result<(), StoreError> {
        self.bucket.mutate(Cart::clear)?;
        Ok(())
    }
}

impl std::fmt::Debug for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartState")
            .field("owner", &self.bucket.owner())
            .field("cart", &self.cart())
            .finish()
    }
}

impl SessionObserver for CartState {
    fn session_changed(&self, identity: Option<&Identity>) {
        let owner = identity.map(|i| i.id);
        if owner != self.bucket.owner() {
            self.bucket.reload(owner);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrine_core::{Email, MemoryStore, UserId};

    use super::*;

    fn identity(id: i32) -> Identity {
        Identity {
            id: UserId::new(id),
            email: Email::parse(&format!("user{id}@example.com")).unwrap(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }
    }

    fn product(id: i32, cents: i64) -> ProductSummary {
        ProductSummary {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(cents),
            image: String::new(),
        }
    }

    fn logged_in(id: i32) -> (Arc<dyn KeyValueStore>, CartState) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cart = CartState::new(Arc::clone(&store));
        cart.session_changed(Some(&identity(id)));
        (store, cart)
    }

    #[test]
    fn test_no_session_means_empty_and_unpersisted() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cart = CartState::new(Arc::clone(&store));
        assert_eq!(cart.add_to_cart(&product(1, 100)).unwrap(), None);
        assert!(cart.is_empty());
        assert!(!cart.remove_from_cart(ProductId::new(1)).unwrap());
    }

    #[test]
    fn test_debug_shows_owner_and_contents() {
        let (_store, cart) = logged_in(7);
        cart.add_to_cart(&product(3, 100)).unwrap();
        let shown = format!("{cart:?}");
        assert!(shown.starts_with("CartState"));
        assert!(shown.contains("owner: Some(UserId(7))"));
    }

    #[test]
    fn test_add_increments_quantity() {
        let (_store, cart) = logged_in(1);
        let p = product(1, 250);
        assert_eq!(cart.add_to_cart(&p).unwrap(), Some(1));
        assert_eq!(cart.add_to_cart(&p).unwrap(), Some(2));
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Price::from_cents(500));
    }

    #[test]
    fn test_mutations_are_persisted_before_next_read() {
        let (store, cart) = logged_in(7);
        cart.add_to_cart(&product(3, 100)).unwrap();
        let stored: Cart = vitrine_core::store::get_json(store.as_ref(), Namespace::Cart, "7")
            .unwrap()
            .unwrap();
        assert_eq!(stored, cart.cart());
    }

    #[test]
    fn test_decrease_then_remove() {
        let (_store, cart) = logged_in(1);
        let p = product(9, 100);
        cart.add_to_cart(&p).unwrap();
        cart.decrease_quantity(p.id).unwrap();
        assert_eq!(cart.cart().quantity_of(p.id), 1);
        assert!(cart.remove_from_cart(p.id).unwrap());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let (store, cart) = logged_in(2);
        cart.add_to_cart(&product(1, 100)).unwrap();
        cart.clear_cart().unwrap();
        assert_eq!(store.get(Namespace::Cart, "2").unwrap().unwrap(), b"[]");
    }

    #[test]
    fn test_logout_detaches_but_keeps_stored_cart() {
        let (store, cart) = logged_in(5);
        cart.add_to_cart(&product(1, 100)).unwrap();
        cart.session_changed(None);
        assert!(cart.is_empty());
        assert!(store.get(Namespace::Cart, "5").unwrap().is_some());

        cart.session_changed(Some(&identity(5)));
        assert_eq!(cart.item_count(), 1);
    }
}
