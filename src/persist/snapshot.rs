//! Snapshot adapter between a cache's entry map and one durable slot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::CacheEntry;
use crate::error::Result;
use crate::persist::DurableStore;

/// Version tag written into every snapshot. Blobs carrying any other
/// version load as an empty cache.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a, V> {
    version: u32,
    entries: &'a HashMap<String, CacheEntry<V>>,
}

#[derive(Deserialize)]
struct Snapshot<V> {
    version: u32,
    entries: HashMap<String, CacheEntry<V>>,
}

// == Persistence ==
/// Writes a cache's full entry map to a single slot after every mutation and
/// reads it back on startup.
///
/// Failures never leave this type: reads degrade to "no data" and writes are
/// logged and dropped.
#[derive(Debug, Clone)]
pub struct Persistence {
    store: Arc<dyn DurableStore>,
    slot: String,
    /// Sequence handed to the next write
    next_seq: Arc<AtomicU64>,
    /// Sequence of the last write applied to the store
    applied_seq: Arc<Mutex<u64>>,
}

impl Persistence {
    pub fn new(store: Arc<dyn DurableStore>, slot: impl Into<String>) -> Self {
        Self {
            store,
            slot: slot.into(),
            next_seq: Arc::new(AtomicU64::new(0)),
            applied_seq: Arc::new(Mutex::new(0)),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    // == Load ==
    /// Reads the slot. Missing, unreadable, corrupt or foreign-version data
    /// all yield an empty map.
    pub fn load<V: DeserializeOwned>(&self) -> HashMap<String, CacheEntry<V>> {
        let raw = match self.store.read(&self.slot) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HashMap::new(),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Failed to read cache snapshot");
                return HashMap::new();
            }
        };

        match serde_json::from_str::<Snapshot<V>>(&raw) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => snapshot.entries,
            Ok(snapshot) => {
                warn!(
                    slot = %self.slot,
                    found = snapshot.version,
                    expected = SNAPSHOT_VERSION,
                    "Discarding cache snapshot with unsupported version"
                );
                HashMap::new()
            }
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Discarding corrupt cache snapshot");
                HashMap::new()
            }
        }
    }

    // == Save ==
    /// Best-effort write of `entries`.
    ///
    /// Inside a Tokio runtime the write runs on the blocking pool and this call
    /// returns immediately; outside one it runs inline.
    pub fn save<V: Serialize>(&self, entries: &HashMap<String, CacheEntry<V>>) {
        let data = match encode(entries) {
            Ok(data) => data,
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Failed to encode cache snapshot");
                return;
            }
        };
        self.dispatch(Some(data));
    }

    /// Best-effort removal of the slot.
    pub fn discard(&self) {
        self.dispatch(None);
    }

    /// Synchronous write that reports failure to the caller.
    pub fn save_now<V: Serialize>(&self, entries: &HashMap<String, CacheEntry<V>>) -> Result<()> {
        let data = encode(entries)?;
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.apply(seq, Some(&data))
    }

    fn dispatch(&self, data: Option<String>) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let this = self.clone();
        let job = move || {
            if let Err(e) = this.apply(seq, data.as_deref()) {
                warn!(slot = %this.slot, error = %e, "Failed to persist cache snapshot");
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => job(),
        }
    }

    /// Applies write `seq` unless a newer one already landed.
    fn apply(&self, seq: u64, data: Option<&str>) -> Result<()> {
        let mut applied = self
            .applied_seq
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if seq <= *applied {
            debug!(slot = %self.slot, seq, "Skipping superseded snapshot");
            return Ok(());
        }
        *applied = seq;

        match data {
            Some(data) => self.store.write(&self.slot, data),
            None => self.store.remove(&self.slot),
        }
    }
}

fn encode<V: Serialize>(entries: &HashMap<String, CacheEntry<V>>) -> Result<String> {
    Ok(serde_json::to_string(&SnapshotRef {
        version: SNAPSHOT_VERSION,
        entries,
    })?)
}
