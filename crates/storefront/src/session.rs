//! Session state: the currently authenticated identity.
//!
//! [`SessionState`] is the single owner of the session identity. It persists
//! the identity under a fixed key, tells registered [`SessionObserver`]s about
//! every change (the cart and favorites holders reload from it), and publishes
//! the identity on a `watch` channel for anything rendering it.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tracing::{info, warn};
use vitrine_core::store::{get_json, set_json};
use vitrine_core::{Identity, KeyValueStore, Namespace, StoreError, UserId};

use crate::error::{clear_sentry_user, set_sentry_user};

/// Store key of the persisted session identity.
pub const SESSION_KEY: &str = "auth_user";

/// Reacts to session identity changes.
pub trait SessionObserver: Send + Sync {
    /// Called with the new identity (or `None` after logout).
    fn session_changed(&self, identity: Option<&Identity>);
}

/// Owner of the current session identity.
pub struct SessionState {
    store: Arc<dyn KeyValueStore>,
    current: watch::Sender<Option<Identity>>,
    observers: RwLock<Vec<Arc<dyn SessionObserver>>>,
}

impl SessionState {
    /// Load the persisted identity, if any.
    ///
    /// An entry that cannot be decoded is removed and the session starts
    /// logged out; read failures also start logged out. Neither is reported
    /// to the caller.
    #[must_use]
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let identity = match get_json::<Identity>(store.as_ref(), Namespace::Session, SESSION_KEY)
        {
            Ok(identity) => identity,
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!(error = %e, "Discarding unreadable stored session");
                if let Err(e) = store.remove(Namespace::Session, SESSION_KEY) {
                    warn!(error = %e, "Failed to remove unreadable stored session");
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                None
            }
        };

        if let Some(identity) = &identity {
            info!(user_id = %identity.id, "Restored session");
        }

        Self {
            store,
            current: watch::Sender::new(identity),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// The current identity.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    /// The current user's id, the key of every per-user bucket.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.current.borrow().as_ref().map(|identity| identity.id)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Receive every identity change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    /// Register an observer and immediately hand it the current identity.
    pub fn observe(&self, observer: Arc<dyn SessionObserver>) {
        observer.session_changed(self.current.borrow().as_ref());
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Make `identity` the session, replacing any previous one.
    ///
    /// The in-memory session and its observers are updated even when the
    /// identity cannot be persisted.
    ///
    /// # Errors
    ///
    /// Returns the store error if the identity could not be persisted; the
    /// session is active for this process regardless.
    pub fn login(&self, identity: Identity) -> Result<(), StoreError> {
        info!(user_id = %identity.id, "Session login");
        set_sentry_user(&identity.id, Some(identity.email.as_str()));

        let persisted = set_json(self.store.as_ref(), Namespace::Session, SESSION_KEY, &identity);
        self.current.send_replace(Some(identity));
        self.notify();
        persisted
    }

    /// End the session and delete the persisted identity.
    ///
    /// Per-user buckets stay in the store for the next login.
    ///
    /// # Errors
    ///
    /// Returns the store error if the persisted identity could not be removed.
    pub fn logout(&self) -> Result<(), StoreError> {
        if let Some(previous) = self.current.send_replace(None) {
            info!(user_id = %previous.id, "Session logout");
        }
        clear_sentry_user();
        self.notify();
        self.store.remove(Namespace::Session, SESSION_KEY)
    }

    fn notify(&self) {
        let identity = self.current.borrow().clone();
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.session_changed(identity.as_ref());
        }
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("current", &*self.current.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use vitrine_core::{Email, MemoryStore};

    use super::*;

    fn identity(id: i32) -> Identity {
        Identity {
            id: UserId::new(id),
            email: Email::parse(&format!("user{id}@example.com")).unwrap(),
            first_name: "Test".to_string(),
            last_name: format!("User{id}"),
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Option<UserId>>>);

    impl SessionObserver for Recorder {
        fn session_changed(&self, identity: Option<&Identity>) {
            self.0.lock().unwrap().push(identity.map(|i| i.id));
        }
    }

    #[test]
    fn test_restore_empty_store() {
        let session = SessionState::restore(Arc::new(MemoryStore::new()));
        assert!(session.current().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_login_persists_and_restores() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = SessionState::restore(Arc::clone(&store));
        session.login(identity(1)).unwrap();

        let restored = SessionState::restore(store);
        assert_eq!(restored.current(), Some(identity(1)));
    }

    #[test]
    fn test_login_replaces_previous_identity() {
        let session = SessionState::restore(Arc::new(MemoryStore::new()));
        session.login(identity(1)).unwrap();
        session.login(identity(2)).unwrap();
        assert_eq!(session.user_id(), Some(UserId::new(2)));
    }

    #[test]
    fn test_logout_removes_persisted_identity() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = SessionState::restore(Arc::clone(&store));
        session.login(identity(1)).unwrap();
        session.logout().unwrap();

        assert!(session.current().is_none());
        assert!(store.get(Namespace::Session, SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_entry_is_discarded() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store
            .set(Namespace::Session, SESSION_KEY, b"{\"id\": \"oops\"")
            .unwrap();

        let session = SessionState::restore(Arc::clone(&store));
        assert!(session.current().is_none());
        assert!(store.get(Namespace::Session, SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn test_observers_see_every_change() {
        let session = SessionState::restore(Arc::new(MemoryStore::new()));
        let recorder = Arc::new(Recorder::default());
        session.observe(recorder.clone());
        session.login(identity(1)).unwrap();
        session.login(identity(2)).unwrap();
        session.logout().unwrap();

        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![None, Some(UserId::new(1)), Some(UserId::new(2)), None]
        );
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let session = SessionState::restore(Arc::new(MemoryStore::new()));
        let mut rx = session.subscribe();
        session.login(identity(3)).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().map(|i| i.id), Some(UserId::new(3)));
    }
}
