//! Namespaced async key-value storage.
//!
//! The storage layer is split in two:
//! - [`StorageBackend`]: a medium that reports its own failures
//!   ([`MemoryBackend`] for volatile in-process storage, [`SqliteBackend`]
//!   for durable storage).
//! - [`KeyValueStore`]: the facade callers use. It namespaces keys and
//!   swallows backend failures, so a failed read looks exactly like a missing
//!   key and a failed write is a logged no-op.
//!
//! ```text
//! caller ──► KeyValueStore ──► Arc<dyn StorageBackend>
//!              │ "{ns}:{key}"      ├─ MemoryBackend   (process lifetime)
//!              │ errors → warn!    └─ SqliteBackend   (survives restarts)
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod store;

pub use backend::StorageBackend;
pub use config::{StorageConfig, StorageMedium};
pub use error::{Result, StorageError};
pub use memory::MemoryBackend;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
pub use store::KeyValueStore;
