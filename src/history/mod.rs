// ABOUTME: History module — chat entries, the flat `||`/`##` encoding, and the owning store.
// ABOUTME: The store is the only writer of the live history.

pub mod codec;
pub mod entry;
pub mod store;

pub use entry::{ChatEntry, ChatHistory, Role};
pub use store::{ChatHistoryStore, DEFAULT_SLOT};
