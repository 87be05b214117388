// ABOUTME: Key-value slot storage — a named preferences file holding string slots.
// ABOUTME: Writes replace the whole file atomically (tmp + rename); an in-memory store backs tests.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A store of named string slots. Each access reads or replaces a whole slot.
pub trait KvStore: Send + Sync {
    /// Read a slot. `Ok(None)` when the slot has never been written.
    fn get(&self, slot: &str) -> anyhow::Result<Option<String>>;

    /// Replace a slot's value.
    fn put(&self, slot: &str, value: &str) -> anyhow::Result<()>;
}

/// Slots kept in a single JSON object on disk, e.g. `chat_prefs.json`.
pub struct PrefsFile {
    path: PathBuf,
}

impl PrefsFile {
    /// Open (lazily) the preferences file `<dir>/<name>.json`.
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(format!("{}.json", name)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> anyhow::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let slots = serde_json::from_str(&content)?;
        Ok(slots)
    }

    fn write_all(&self, slots: &BTreeMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(slots)?;
        std::fs::write(&tmp_path, &content)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KvStore for PrefsFile {
    fn get(&self, slot: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read_all()?.remove(slot))
    }

    fn put(&self, slot: &str, value: &str) -> anyhow::Result<()> {
        let mut slots = self.read_all()?;
        slots.insert(slot.to_string(), value.to_string());
        self.write_all(&slots)
    }
}

/// Process-local slots. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one slot already populated.
    pub fn with_slot(slot: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut slots) = store.slots.lock() {
            slots.insert(slot.to_string(), value.to_string());
        }
        store
    }
}

impl KvStore for MemoryStore {
    fn get(&self, slot: &str) -> anyhow::Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(slots.get(slot).cloned())
    }

    fn put(&self, slot: &str, value: &str) -> anyhow::Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }
}
