//! `sg-artifacts`: short-lived, token-addressed storage for rendered files.
//!
//! An [`ArtifactRegistry`] maps opaque download tokens to blobs held by a
//! [`BlobStore`].  Every entry carries an absolute expiry taken from an
//! injected [`Clock`]; once it passes, the token is unreachable and the
//! blob is reclaimed by the next sweep.

pub mod clock;
pub mod registry;
pub mod store;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::{Artifact, ArtifactRegistry, RegisteredArtifact, RegistryError, RegistryStats};
pub use store::{BlobKey, BlobStore, DiskBlobStore, MemoryBlobStore, StoreError};
