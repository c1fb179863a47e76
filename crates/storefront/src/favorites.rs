//! Favorite products scoped to the current session.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;
use vitrine_core::{
    FavoriteSet, Identity, KeyValueStore, Namespace, Product, ProductId, StoreError,
};

use crate::bucket::{Scoped, SessionBucket};
use crate::session::SessionObserver;

/// The logged-in user's favorites, persisted under `favorites/{user_id}`.
pub struct FavoritesState {
    bucket: SessionBucket<FavoriteSet>,
}

impl FavoritesState {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            bucket: SessionBucket::new(Namespace::Favorites, store),
        }
    }

    #[must_use]
    pub fn favorites(&self) -> FavoriteSet {
        self.bucket.snapshot()
    }

    #[must_use]
    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.bucket.with(|set| set.contains(id))
    }

    /// Receive the favorites after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Scoped<FavoriteSet>> {
        self.bucket.subscribe()
    }

    /// Flip membership of `id`.
    ///
    /// Silently ignored without a session, returning `None`; otherwise
    /// returns whether `id` is now a favorite.
    ///
    /// # Errors
    ///
    /// Returns the store error if the favorites could not be persisted.
    pub fn toggle_favorite(&self, id: ProductId) -> Result<Option<bool>, StoreError> {
        let now_favorite = self.bucket.mutate(|set| set.toggle(id))?;
        debug!(product_id = %id, ?now_favorite, "Toggled favorite");
        Ok(now_favorite)
    }

    /// The favorited products among `products`, in catalog order.
    #[must_use]
    pub fn favorite_products<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        self.bucket.with(|set| {
            products
                .iter()
                .filter(|product| set.contains(product.id))
                .collect()
        })
    }
}

impl std::fmt::Debug for FavoritesState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesState")
            .field("owner", &self.bucket.owner())
            .field("favorites", &self.favorites())
            .finish()
    }
}

impl SessionObserver for FavoritesState {
    fn session_changed(&self, identity: Option<&Identity>) {
        let owner = identity.map(|i| i.id);
        if owner != self.bucket.owner() {
            self.bucket.reload(owner);
        }
    }
}
