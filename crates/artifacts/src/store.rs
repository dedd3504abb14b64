//! Backing storage for artifact bytes.
//!
//! The registry only ever sees a [`BlobKey`].  Keys are generated by the
//! store, never derived from tokens or filenames, so nothing on disk hints at
//! how to reach a download.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blob {0} not found")]
    Missing(BlobKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    fn generate(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.');
        if ext.is_empty() {
            Self(Uuid::new_v4().to_string())
        } else {
            Self(format!("{}.{ext}", Uuid::new_v4()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait BlobStore: Send + Sync {
    /// Persist `bytes` under a freshly generated key.
    fn put(&self, bytes: &[u8], extension: &str) -> Result<BlobKey, StoreError>;
    fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StoreError>;
    /// Deleting a key that is already gone is not an error.
    fn delete(&self, key: &BlobKey) -> Result<(), StoreError>;
    fn kind(&self) -> &'static str;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Disk
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Files under a single output directory, one file per blob.
#[derive(Debug, Clone)]
pub struct DiskBlobStore {
    root: PathBuf,
}

impl DiskBlobStore {
    /// Create the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            op: "create dir",
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, key: &BlobKey) -> PathBuf {
        self.root.join(key.as_str())
    }
}

impl BlobStore for DiskBlobStore {
    fn put(&self, bytes: &[u8], extension: &str) -> Result<BlobKey, StoreError> {
        let key = BlobKey::generate(extension);
        let path = self.path_of(&key);
        std::fs::write(&path, bytes).map_err(|source| StoreError::Io {
            op: "write",
            path,
            source,
        })?;
        Ok(key)
    }

    fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StoreError> {
        let path = self.path_of(key);
        std::fs::read(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => StoreError::Missing(key.clone()),
            _ => StoreError::Io {
                op: "read",
                path,
                source,
            },
        })
    }

    fn delete(&self, key: &BlobKey) -> Result<(), StoreError> {
        let path = self.path_of(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                op: "remove",
                path,
                source,
            }),
        }
    }

    fn kind(&self) -> &'static str {
        "disk"
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Memory
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<BlobKey, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, bytes: &[u8], extension: &str) -> Result<BlobKey, StoreError> {
        let key = BlobKey::generate(extension);
        self.blobs.write().insert(key.clone(), bytes.to_vec());
        Ok(key)
    }

    fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::Missing(key.clone()))
    }

    fn delete(&self, key: &BlobKey) -> Result<(), StoreError> {
        self.blobs.write().remove(key);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exercise(store: &dyn BlobStore) {
        let key = store.put(b"PK\x03\x04", "xlsx").unwrap();
        assert!(key.as_str().ends_with(".xlsx"));
        assert_eq!(store.get(&key).unwrap(), b"PK\x03\x04");

        store.delete(&key).unwrap();
        assert!(matches!(store.get(&key), Err(StoreError::Missing(_))));
        // second delete is a no-op
        store.delete(&key).unwrap();
    }

    #[test]
    fn disk_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = DiskBlobStore::open(dir.path().join("nested/outputs")).unwrap();
        assert!(store.root().is_dir());
        exercise(&store);
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryBlobStore::new();
        exercise(&store);
        assert!(store.is_empty());
    }

    #[test]
    fn keys_are_unique_per_put() {
        let store = MemoryBlobStore::new();
        let a = store.put(b"same", "xlsx").unwrap();
        let b = store.put(b"same", ".xlsx").unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }
}
