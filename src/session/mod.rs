// ABOUTME: Session module — the chat turn state machine and the events it emits.
// ABOUTME: One foreground owner mutates history; the worker only reports outcomes.

pub mod chat;
pub mod events;

pub use chat::{
    ChatSession, EMPTY_REPLY_FALLBACK, SessionOptions, SubmitError, TurnOutcome, TurnState,
    UNKNOWN_ERROR_TEXT,
};
pub use events::SessionEvent;
