//! File-backed persistence.
//!
//! [`FileStore`] keeps one JSON document per entry under
//! `<root>/<namespace>/<key>.json`, giving the CLI the same per-user buckets
//! a browser keeps in local storage. Writes go to a temp file that is renamed
//! into place, so a crash mid-write leaves the previous value intact.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use vitrine_core::{KeyValueStore, Namespace, StoreError};

pub use vitrine_core::MemoryStore;
pub use vitrine_core::store::{get_json, set_json};

/// Directory-backed [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at `root`. Directories are created lazily on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, namespace: Namespace, key: &str) -> PathBuf {
        self.root
            .join(namespace.as_str())
            .join(format!("{}.json", sanitize_key(key)))
    }
}

/// Keys are user ids or fixed names; anything outside `[A-Za-z0-9_-]` is
/// replaced so a key can never escape its namespace directory.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn unavailable(path: &Path, err: &io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {err}", path.display()))
}

impl KeyValueStore for FileStore {
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.entry_path(namespace, key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(&path, &e)),
        }
    }

    fn set(&self, namespace: Namespace, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.entry_path(namespace, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| unavailable(parent, &e))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path).map_err(|e| unavailable(&tmp_path, &e))?;
            file.write_all(value)
                .and_then(|()| file.sync_all())
                .map_err(|e| unavailable(&tmp_path, &e))?;
        }
        fs::rename(&tmp_path, &path).map_err(|e| unavailable(&path, &e))?;

        tracing::debug!(path = %path.display(), bytes = value.len(), "saved entry");
        Ok(())
    }

    fn remove(&self, namespace: Namespace, key: &str) -> Result<(), StoreError> {
        let path = self.entry_path(namespace, key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable(&path, &e)),
        }
    }
}
