//! Wiring of the session-scoped state holders.

use std::sync::Arc;

use vitrine_core::{KeyValueStore, MemoryStore};

use crate::cart::CartState;
use crate::checkout::Checkout;
use crate::favorites::FavoritesState;
use crate::session::{SessionObserver, SessionState};

/// Session, cart and favorites over one store.
///
/// The session is restored from the store and the cart and favorites are
/// registered as its observers, so they follow every login and logout.
#[derive(Debug, Clone)]
pub struct Shop {
    session: Arc<SessionState>,
    cart: Arc<CartState>,
    favorites: Arc<FavoritesState>,
}

impl Shop {
    #[must_use]
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let session = Arc::new(SessionState::restore(Arc::clone(&store)));
        let cart = Arc::new(CartState::new(Arc::clone(&store)));
        let favorites = Arc::new(FavoritesState::new(store));

        session.observe(Arc::clone(&cart) as Arc<dyn SessionObserver>);
        session.observe(Arc::clone(&favorites) as Arc<dyn SessionObserver>);

        Self {
            session,
            cart,
            favorites,
        }
    }

    /// Shop backed by a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStore::new()))
    }

    #[must_use]
    pub const fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    #[must_use]
    pub const fn cart(&self) -> &Arc<CartState> {
        &self.cart
    }

    #[must_use]
    pub const fn favorites(&self) -> &Arc<FavoritesState> {
        &self.favorites
    }

    #[must_use]
    pub fn checkout(&self) -> Checkout {
        Checkout::new(Arc::clone(&self.session), Arc::clone(&self.cart))
    }
}
