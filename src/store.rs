//! Key-value blob storage for uploaded and processed images.
//!
//! Keys are opaque strings. Writes are last-write-wins per key; there are no
//! transactions across keys.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Binary blob storage used by [`Compositor`](crate::Compositor).
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the write fails.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the key is missing or the read fails.
    fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// In-process store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.read().map_or(0, |blobs| blobs.len())
    }

    /// Whether the store holds no blobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a blob exists under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.blobs
            .read()
            .is_ok_and(|blobs| blobs.contains_key(key))
    }
}

impl BlobStore for MemoryStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))?;
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))?;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| Error::Storage(format!("no blob stored under key {key:?}")))
    }
}

/// Store keeping one file per key inside a root directory.
///
/// Puts write a temporary sibling file and rename it into place, so a failed
/// write never leaves a truncated blob under the real key.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            Error::Storage(format!("failed to create store at {}: {e}", root.display()))
        })?;
        Ok(Self { root })
    }

    /// Directory holding the blobs.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

impl BlobStore for DirStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = self.root.join(format!(".{key}.tmp{}", next_sequence()));

        if let Err(e) = std::fs::write(&tmp, bytes) {
            let _ = std::fs::remove_file(&tmp);
            return Err(Error::Storage(format!("failed to write {key:?}: {e}")));
        }
        std::fs::rename(&tmp, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            Error::Storage(format!("failed to commit {key:?}: {e}"))
        })
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::Storage(format!("no blob stored under key {key:?}"))
            }
            _ => Error::Storage(format!("failed to read {key:?}: {e}")),
        })
    }
}

/// Reject keys that could escape the store root or clash with temp files.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("unsafe store key {key:?}")))
    }
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Generate a unique image ID of the form `{prefix}_{pid}-{nanos}-{seq}` (hex).
#[must_use]
pub fn new_image_id(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    format!(
        "{prefix}_{:x}-{nanos:x}-{:x}",
        std::process::id(),
        next_sequence()
    )
}
