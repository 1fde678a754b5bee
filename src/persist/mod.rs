//! Persistence Module
//!
//! Durable storage backends and the snapshot adapter that lets a cache
//! survive a process restart.
//!
//! # Backends
//! - [`MemoryStore`]: in-process slots, used by tests and ephemeral runs
//! - [`FileStore`]: one JSON file per slot inside a data directory

mod file;
mod memory;
mod snapshot;

use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use snapshot::{Persistence, SNAPSHOT_VERSION};

// == Durable Store Trait ==
/// A key/value persistence backend addressed by slot name.
///
/// Each slot holds one opaque string blob.
pub trait DurableStore: Send + Sync + std::fmt::Debug {
    /// Returns the blob stored in `slot`, or `None` if the slot is empty.
    fn read(&self, slot: &str) -> Result<Option<String>>;

    /// Replaces the blob stored in `slot`.
    fn write(&self, slot: &str, data: &str) -> Result<()>;

    /// Empties `slot`. Removing an empty slot is not an error.
    fn remove(&self, slot: &str) -> Result<()>;

    /// Names of every non-empty slot starting with `prefix`, in no particular order.
    fn slots(&self, prefix: &str) -> Result<Vec<String>>;
}
