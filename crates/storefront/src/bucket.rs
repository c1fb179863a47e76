//! Session-scoped persisted state.
//!
//! A [`SessionBucket`] holds one value per logged-in user. It is reloaded from
//! the store whenever the session changes and written back after every
//! mutation, keyed by the owner recorded at reload time. With no session the
//! value is `T::default()` and mutations are ignored.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, warn};
use vitrine_core::store::{get_json, set_json};
use vitrine_core::{KeyValueStore, Namespace, StoreError, UserId};

/// Value plus the user it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoped<T> {
    pub owner: Option<UserId>,
    pub value: T,
}

pub(crate) struct SessionBucket<T> {
    namespace: Namespace,
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<Scoped<T>>,
}

impl<T> SessionBucket<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + Send + Sync,
{
    pub(crate) fn new(namespace: Namespace, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            namespace,
            store,
            state: watch::Sender::new(Scoped {
                owner: None,
                value: T::default(),
            }),
        }
    }

    /// Swap in the value persisted for `owner`.
    pub(crate) fn reload(&self, owner: Option<UserId>) {
        let value = owner.map_or_else(T::default, |id| self.load(id));
        debug!(namespace = %self.namespace, owner = ?owner, "Reloaded bucket");
        self.state.send_replace(Scoped { owner, value });
    }

    /// Stored value for `owner`. Missing or unreadable entries yield the default.
    fn load(&self, owner: UserId) -> T {
        match get_json(self.store.as_ref(), self.namespace, &owner.to_string()) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                warn!(namespace = %self.namespace, user_id = %owner, error = %e, "Discarding unreadable stored state");
                T::default()
            }
        }
    }

    pub(crate) fn owner(&self) -> Option<UserId> {
        self.state.borrow().owner
    }

    pub(crate) fn snapshot(&self) -> T {
        self.state.borrow().value.clone()
    }

    /// Read the current value without cloning it.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.borrow().value)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Scoped<T>> {
        self.state.subscribe()
    }

    /// Apply `f` to the owner's value and persist the result.
    ///
    /// Returns `Ok(None)` without calling `f` when there is no session. The
    /// in-memory value keeps the change even when persisting it fails.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<Option<R>, StoreError> {
        let mut outcome = None;
        let mut written = None;
        self.state.send_if_modified(|scoped| {
            let Some(owner) = scoped.owner else {
                return false;
            };
            outcome = Some(f(&mut scoped.value));
            written = Some((owner, scoped.value.clone()));
            true
        });

        let Some((owner, value)) = written else {
            debug!(namespace = %self.namespace, "Ignoring mutation without a session");
            return Ok(None);
        };
        set_json(self.store.as_ref(), self.namespace, &owner.to_string(), &value)?;
        Ok(outcome)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SessionBucket<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SessionBucket")
            .field("namespace", &self.namespace)
            .field("owner", &state.owner)
            .field("value", &state.value)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrine_core::MemoryStore;

    use super::*;

    fn bucket() -> (Arc<dyn KeyValueStore>, SessionBucket<Vec<u32>>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let bucket = SessionBucket::new(Namespace::Cart, Arc::clone(&store));
        (store, bucket)
    }

    #[test]
    fn test_mutation_without_owner_is_ignored() {
        let (store, bucket) = bucket();
        let out = bucket.mutate(|v| v.push(1)).unwrap();
        assert!(out.is_none());
        assert!(bucket.snapshot().is_empty());
        assert!(store.get(Namespace::Cart, "1").unwrap().is_none());
    }

    #[test]
    fn test_mutation_writes_through() {
        let (store, bucket) = bucket();
        bucket.reload(Some(UserId::new(1)));
        bucket.mutate(|v| v.push(7)).unwrap();
        assert_eq!(store.get(Namespace::Cart, "1").unwrap().unwrap(), b"[7]");
    }

    #[test]
    fn test_reload_switches_owner() {
        let (_store, bucket) = bucket();
        bucket.reload(Some(UserId::new(1)));
        bucket.mutate(|v| v.push(1)).unwrap();
        bucket.reload(Some(UserId::new(2)));
        assert!(bucket.snapshot().is_empty());
        bucket.reload(Some(UserId::new(1)));
        assert_eq!(bucket.snapshot(), vec![1]);
        bucket.reload(None);
        assert_eq!(bucket.owner(), None);
        assert!(bucket.snapshot().is_empty());
    }

    #[test]
    fn test_unreadable_entry_loads_default() {
        let (store, bucket) = bucket();
        store.set(Namespace::Cart, "4", b"garbage").unwrap();
        bucket.reload(Some(UserId::new(4)));
        assert!(bucket.snapshot().is_empty());
    }
}
