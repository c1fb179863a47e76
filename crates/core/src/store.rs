//! Keyed persistence seam.
//!
//! Session, cart and favorites state is persisted through a
//! [`KeyValueStore`]: a byte-oriented `(namespace, key) -> bytes` map. The
//! namespace says which bucket an entry belongs to; for per-user buckets the
//! key is the session's user id, resolved by the caller at call time.
//!
//! ```text
//! session/auth_user   -> Identity JSON
//! cart/{user_id}      -> [CartItem, ...]
//! favorites/{user_id} -> [ProductId, ...]
//! ```
//!
//! Backends only move bytes. [`get_json`] and [`set_json`] add the JSON layer,
//! reporting undecodable entries as [`StoreError::Corrupt`] so callers can
//! discard them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not read or write.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored entry could not be decoded.
    #[error("corrupt entry {namespace}/{key}: {reason}")]
    Corrupt {
        namespace: Namespace,
        key: String,
        reason: String,
    },

    /// A value could not be encoded.
    #[error("failed to encode value: {0}")]
    Encode(String),
}

/// Bucket an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Session,
    Cart,
    Favorites,
}

impl Namespace {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Cart => "cart",
            Self::Favorites => "favorites",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte-oriented key-value persistence.
///
/// Implementations must make a successful `set` visible to the next `get`
/// on the same store. Last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Read an entry. `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the backend cannot be read.
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write an entry, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the backend cannot be written.
    fn set(&self, namespace: Namespace, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Delete an entry. Deleting an absent entry is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the backend cannot be written.
    fn remove(&self, namespace: Namespace, key: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON entry.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` when the entry exists but does not decode as `T`,
/// and propagates backend errors.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    namespace: Namespace,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(bytes) = store.get(namespace, key)? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            namespace,
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Encode `value` as JSON and write it.
///
/// # Errors
///
/// Returns `StoreError::Encode` if serialization fails and propagates backend errors.
pub fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    namespace: Namespace,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(value).map_err(|e| StoreError::Encode(e.to_string()))?;
    store.set(namespace, key, &bytes)
}

/// In-memory store. State is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(Namespace, String), Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&(namespace, key.to_string())).cloned())
    }

    fn set(&self, namespace: Namespace, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert((namespace, key.to_string()), value.to_vec());
        tracing::trace!(%namespace, key, bytes = value.len(), "stored entry");
        Ok(())
    }

    fn remove(&self, namespace: Namespace, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&(namespace, key.to_string()));
        Ok(())
    }
}
