// ABOUTME: ChatHistoryStore — owns the live history and mirrors it into one storage slot.
// ABOUTME: Storage failures degrade to empty loads and dropped writes, logged but never surfaced.

use std::sync::Arc;

use tracing::{debug, warn};

use super::codec;
use super::entry::{ChatEntry, ChatHistory};
use crate::storage::KvStore;

/// Default slot holding the serialized history.
pub const DEFAULT_SLOT: &str = "chat_data";

pub struct ChatHistoryStore {
    storage: Arc<dyn KvStore>,
    slot: String,
    history: ChatHistory,
}

impl ChatHistoryStore {
    /// Create a store with an empty in-memory history.
    pub fn new(storage: Arc<dyn KvStore>, slot: impl Into<String>) -> Self {
        Self {
            storage,
            slot: slot.into(),
            history: ChatHistory::new(),
        }
    }

    /// Create a store and bulk-load whatever the slot currently holds.
    pub fn open(storage: Arc<dyn KvStore>, slot: impl Into<String>) -> Self {
        let mut store = Self::new(storage, slot);
        store.restore();
        store
    }

    /// Read and decode the persisted history. An absent or unreadable slot is
    /// an empty history.
    pub fn load(&self) -> ChatHistory {
        let raw = match self.storage.get(&self.slot) {
            Ok(raw) => raw.unwrap_or_default(),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "history storage unavailable, starting empty");
                String::new()
            }
        };
        let history = codec::decode(&raw);
        debug!(slot = %self.slot, entries = history.len(), "loaded chat history");
        history
    }

    /// Replace the in-memory history with the persisted one. Returns the
    /// number of entries loaded.
    pub fn restore(&mut self) -> usize {
        self.history = self.load();
        self.history.len()
    }

    /// Overwrite the slot with the encoded `history`. A failed write is
    /// logged and dropped.
    pub fn persist(&self, history: &ChatHistory) {
        let encoded = codec::encode(history);
        match self.storage.put(&self.slot, &encoded) {
            Ok(()) => debug!(slot = %self.slot, entries = history.len(), "persisted chat history"),
            Err(e) => warn!(slot = %self.slot, error = %e, "failed to persist chat history"),
        }
    }

    /// Persist the live history.
    pub fn persist_current(&self) {
        self.persist(&self.history);
    }

    /// Append an entry to the live history and return its index.
    pub fn append(&mut self, entry: ChatEntry) -> usize {
        self.history.push(entry)
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Role;
    use crate::storage::MemoryStore;

    struct UnavailableStore;

    impl KvStore for UnavailableStore {
        fn get(&self, _slot: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("disk on fire")
        }

        fn put(&self, _slot: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    #[test]
    fn open_on_empty_storage_gives_empty_history() {
        let store = ChatHistoryStore::open(Arc::new(MemoryStore::new()), DEFAULT_SLOT);
        assert!(store.history().is_empty());
    }

    #[test]
    fn open_loads_existing_slot_in_order() {
        let storage = MemoryStore::with_slot(DEFAULT_SLOT, "User:||one##Bot:||two##");
        let store = ChatHistoryStore::open(Arc::new(storage), DEFAULT_SLOT);
        let roles: Vec<Role> = store.history().iter().map(ChatEntry::role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[test]
    fn persist_then_load_round_trips() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = ChatHistoryStore::new(storage.clone(), DEFAULT_SLOT);
        store.append(ChatEntry::user("hello"));
        store.append(ChatEntry::assistant("hi there"));
        store.persist_current();

        assert_eq!(
            storage.get(DEFAULT_SLOT).unwrap().as_deref(),
            Some("User:||hello##Bot:||hi there##")
        );
        assert_eq!(&store.load(), store.history());
    }

    #[test]
    fn persist_fully_overwrites_previous_snapshot() {
        let storage = Arc::new(MemoryStore::with_slot(DEFAULT_SLOT, "User:||stale##"));
        let store = ChatHistoryStore::new(storage.clone(), DEFAULT_SLOT);
        let fresh: ChatHistory = [ChatEntry::user("fresh")].into_iter().collect();
        store.persist(&fresh);
        assert_eq!(storage.get(DEFAULT_SLOT).unwrap().as_deref(), Some("User:||fresh##"));
    }

    #[test]
    fn unavailable_storage_loads_empty_and_drops_writes() {
        let mut store = ChatHistoryStore::open(Arc::new(UnavailableStore), DEFAULT_SLOT);
        assert!(store.history().is_empty());

        store.append(ChatEntry::user("still works"));
        store.persist_current();
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn restore_replaces_live_history() {
        let storage = Arc::new(MemoryStore::with_slot(DEFAULT_SLOT, "Error||oops##"));
        let mut store = ChatHistoryStore::new(storage, DEFAULT_SLOT);
        store.append(ChatEntry::user("unsaved"));
        assert_eq!(store.restore(), 1);
        assert_eq!(store.history().entries()[0], ChatEntry::error("oops"));
    }
}
