//! File-backed durable store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::persist::DurableStore;

/// Stores each slot as `<dir>/<slot>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `base_path`. The directory is created lazily.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File path for a slot. Distinct slots always map to distinct files.
    fn slot_path(&self, slot: &str) -> PathBuf {
        self.base_path.join(format!("{}{}", encode_slot(slot), SLOT_EXTENSION))
    }
}

const SLOT_EXTENSION: &str = ".json";

/// Percent-escapes every byte outside `[A-Za-z0-9._-]`, `%` included.
fn encode_slot(slot: &str) -> String {
    let mut encoded = String::with_capacity(slot.len());
    for byte in slot.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

/// Inverse of [`encode_slot`]. `None` for names this store did not write.
fn decode_slot(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

impl DurableStore for FileStore {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, slot: &str, data: &str) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;

        // Write-then-rename so a crash never leaves a truncated slot behind
        let path = self.slot_path(slot);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn slots(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = match fs::read_dir(&self.base_path) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut slots = Vec::new();
        for entry in dir {
            let name = entry?.file_name();
            let slot = name
                .to_str()
                .and_then(|name| name.strip_suffix(SLOT_EXTENSION))
                .and_then(decode_slot);
            if let Some(slot) = slot.filter(|slot| slot.starts_with(prefix)) {
                slots.push(slot);
            }
        }
        Ok(slots)
    }
}
