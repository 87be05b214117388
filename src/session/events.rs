// ABOUTME: Session events — what the session tells its renderer after each change.
// ABOUTME: Renderers hold copies of entries; only the session mutates the history.

use crate::history::ChatEntry;

/// Events sent from the chat session to whoever renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// An entry was appended at `index`.
    Appended { index: usize, entry: ChatEntry },
    /// A transient notice for the user (not part of the history).
    Notice(String),
    /// The pending turn finished and the session accepts input again.
    Idle,
}
