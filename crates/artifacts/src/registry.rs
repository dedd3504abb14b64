//! Token → artifact map with absolute expiry.
//!
//! Entry lifecycle: `Active → Expired → Reclaimed`.  An entry is expired the
//! moment `now >= expires_at`, whether or not a sweep has run; every read
//! re-checks the deadline.  Blobs of swept entries are deleted after the map
//! lock is released so slow storage never blocks other callers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::clock::Clock;
use crate::store::{BlobKey, BlobStore, StoreError};
use crate::token;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Unknown, expired and unreadable artifacts are indistinguishable to
    /// callers.
    #[error("artifact not found or expired")]
    NotFound,

    #[error("storage: {0}")]
    Store(#[from] StoreError),
}

struct Entry {
    blob: BlobKey,
    filename: String,
    mime_type: String,
    size: usize,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// What the caller gets back from [`ArtifactRegistry::register`].
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredArtifact {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub size: usize,
}

/// A live artifact resolved from its token.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub active: usize,
    /// Past their deadline but not yet swept.
    pub expired: usize,
    pub total_bytes: usize,
    pub storage: &'static str,
}

pub struct ArtifactRegistry {
    entries: Mutex<HashMap<String, Entry>>,
    store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl ArtifactRegistry {
    pub fn new(store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            store,
            clock,
        }
    }

    /// Store `bytes` and issue a fresh token valid for `ttl`.
    ///
    /// Expired entries are swept as part of every registration.  A zero
    /// `ttl` is accepted; the artifact is then expired on arrival.
    pub fn register(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
        ttl: Duration,
    ) -> Result<RegisteredArtifact, RegistryError> {
        let extension = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        let blob = self.store.put(bytes, extension)?;

        let (registered, swept) = {
            let mut entries = self.entries.lock();
            let now = self.clock.now();
            let swept = drain_expired(&mut entries, now);

            let mut token = token::generate();
            while entries.contains_key(&token) {
                token = token::generate();
            }

            let expires_at = deadline(now, ttl);
            entries.insert(
                token.clone(),
                Entry {
                    blob,
                    filename: filename.to_owned(),
                    mime_type: mime_type.to_owned(),
                    size: bytes.len(),
                    created_at: now,
                    expires_at,
                },
            );

            let registered = RegisteredArtifact {
                token,
                created_at: now,
                expires_at,
                size: bytes.len(),
            };
            (registered, swept)
        };

        self.reclaim(swept);
        tracing::info!(
            token_fp = %token::fingerprint(&registered.token),
            bytes = registered.size,
            expires_at = %registered.expires_at,
            "artifact registered"
        );
        Ok(registered)
    }

    /// Resolve a token to its artifact while it is still live.
    pub fn lookup(&self, token: &str) -> Result<Artifact, RegistryError> {
        let (blob, filename, mime_type, expires_at) = {
            let entries = self.entries.lock();
            let entry = entries.get(token).ok_or(RegistryError::NotFound)?;
            if entry.is_expired(self.clock.now()) {
                return Err(RegistryError::NotFound);
            }
            (
                entry.blob.clone(),
                entry.filename.clone(),
                entry.mime_type.clone(),
                entry.expires_at,
            )
        };

        let bytes = self.store.get(&blob).map_err(|e| {
            tracing::warn!(token_fp = %token::fingerprint(token), error = %e, "artifact unreadable");
            RegistryError::NotFound
        })?;

        Ok(Artifact {
            filename,
            mime_type,
            bytes,
            expires_at,
        })
    }

    /// Remove every expired entry and delete its blob.  Returns how many
    /// entries were reclaimed.
    pub fn sweep(&self) -> usize {
        let swept = {
            let mut entries = self.entries.lock();
            drain_expired(&mut entries, self.clock.now())
        };
        let count = swept.len();
        self.reclaim(swept);
        if count > 0 {
            tracing::debug!(count, "swept expired artifacts");
        }
        count
    }

    pub fn stats(&self) -> RegistryStats {
        let entries = self.entries.lock();
        let now = self.clock.now();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        RegistryStats {
            active: entries.len() - expired,
            expired,
            total_bytes: entries.values().map(|e| e.size).sum(),
            storage: self.store.kind(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn reclaim(&self, swept: Vec<Entry>) {
        for entry in swept {
            if let Err(e) = self.store.delete(&entry.blob) {
                tracing::warn!(blob = %entry.blob, error = %e, "failed to delete expired artifact");
            } else {
                tracing::trace!(
                    blob = %entry.blob,
                    filename = %entry.filename,
                    age_secs = (entry.expires_at - entry.created_at).num_seconds(),
                    "artifact reclaimed"
                );
            }
        }
    }
}

fn drain_expired(entries: &mut HashMap<String, Entry>, now: DateTime<Utc>) -> Vec<Entry> {
    let expired: Vec<String> = entries
        .iter()
        .filter(|(_, e)| e.is_expired(now))
        .map(|(token, _)| token.clone())
        .collect();
    expired
        .into_iter()
        .filter_map(|token| entries.remove(&token))
        .collect()
}

fn deadline(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
