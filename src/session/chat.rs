// ABOUTME: ChatSession — turn-taking state machine over the history store and generation worker.
// ABOUTME: Appends the user entry on submit, then the reply or error entry when the worker answers.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::agent::{
    DispatchError, GenerationOutcome, GenerationRequest, GenerationWorker, GenerativeModel,
};
use crate::history::{ChatEntry, ChatHistory, ChatHistoryStore};
use crate::session::events::SessionEvent;

/// Reply text used when the model answered without any text.
pub const EMPTY_REPLY_FALLBACK: &str = "No text response received.";
/// Error entry text used when a failure carries no message.
pub const UNKNOWN_ERROR_TEXT: &str = "Unknown error";

/// Rejection of a submitted prompt. History is untouched in every case.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Field cannot be empty")]
    EmptyPrompt,
    #[error("Still waiting for the previous reply")]
    Busy,
    #[error("Generation worker is not running")]
    WorkerStopped,
}

/// Where the session is in the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingReply { request_id: u64 },
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A reply entry was appended at `index` and the history persisted.
    Resolved { index: usize },
    /// An error entry was appended at `index`.
    Failed { index: usize, message: String },
}

/// Behavior switches for a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Also persist after a failed remote call. Off by default: only
    /// completed exchanges are written.
    pub persist_on_failure: bool,
}

pub struct ChatSession {
    store: ChatHistoryStore,
    worker: GenerationWorker,
    state: TurnState,
    next_request_id: u64,
    options: SessionOptions,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl ChatSession {
    /// Start a session over an already-loaded store. Spawns the generation
    /// worker, so this must run inside a tokio runtime.
    pub fn start(
        store: ChatHistoryStore,
        model: Arc<dyn GenerativeModel>,
        options: SessionOptions,
    ) -> Self {
        info!(
            entries = store.history().len(),
            model = model.model_name(),
            "chat session started"
        );
        Self {
            store,
            worker: GenerationWorker::spawn(model),
            state: TurnState::Idle,
            next_request_id: 1,
            options,
            events: None,
        }
    }

    /// Register the renderer's event channel. Replaces any earlier one.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn history(&self) -> &ChatHistory {
        self.store.history()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TurnState::Idle
    }

    /// Submit a prompt. On success the user entry is already in the history
    /// and the request is queued on the worker.
    pub fn submit(&mut self, prompt: &str) -> Result<(), SubmitError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SubmitError::EmptyPrompt);
        }
        if !self.is_idle() {
            return Err(SubmitError::Busy);
        }

        let request_id = self.next_request_id;
        self.worker
            .dispatch(GenerationRequest {
                id: request_id,
                prompt: prompt.to_string(),
            })
            .map_err(|e| match e {
                DispatchError::Full => SubmitError::Busy,
                DispatchError::Closed => SubmitError::WorkerStopped,
            })?;
        self.next_request_id += 1;
        self.state = TurnState::AwaitingReply { request_id };
        debug!(request_id, "prompt dispatched");

        self.append(ChatEntry::user(prompt));
        Ok(())
    }

    /// Wait for the worker's next outcome. Cancel-safe, so it can sit in a
    /// `select!` next to the input source.
    pub async fn next_outcome(&mut self) -> Option<GenerationOutcome> {
        self.worker.recv().await
    }

    /// Apply a worker outcome to the history. Outcomes that do not belong to
    /// the pending request are ignored.
    pub fn resolve(&mut self, outcome: GenerationOutcome) -> Option<TurnOutcome> {
        match self.state {
            TurnState::AwaitingReply { request_id } if request_id == outcome.id => {}
            _ => {
                warn!(id = outcome.id, "ignoring outcome for a request that is not pending");
                return None;
            }
        }
        self.state = TurnState::Idle;

        let turn = match outcome.result {
            Ok(response) => {
                let text = response
                    .text
                    .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());
                let index = self.append(ChatEntry::assistant(text));
                self.store.persist_current();
                debug!(id = outcome.id, "turn resolved");
                TurnOutcome::Resolved { index }
            }
            Err(e) => {
                let message = e
                    .user_message()
                    .unwrap_or_else(|| UNKNOWN_ERROR_TEXT.to_string());
                warn!(id = outcome.id, error = %message, "generation failed");
                let index = self.append(ChatEntry::error(message.clone()));
                self.notify(SessionEvent::Notice(format!("Error: {}", message)));
                if self.options.persist_on_failure {
                    self.store.persist_current();
                }
                TurnOutcome::Failed { index, message }
            }
        };
        self.notify(SessionEvent::Idle);
        Some(turn)
    }

    /// Wait for the pending turn to finish and apply it.
    pub async fn await_turn(&mut self) -> Option<TurnOutcome> {
        while !self.is_idle() {
            let outcome = self.next_outcome().await?;
            if let Some(turn) = self.resolve(outcome) {
                return Some(turn);
            }
        }
        None
    }

    /// Stop the worker. A request still running is allowed to finish but its
    /// outcome is discarded.
    pub async fn shutdown(mut self) -> ChatHistory {
        self.worker.shutdown().await;
        info!(entries = self.store.history().len(), "chat session ended");
        self.store.history().clone()
    }

    fn append(&mut self, entry: ChatEntry) -> usize {
        let index = self.store.append(entry.clone());
        self.notify(SessionEvent::Appended { index, entry });
        index
    }

    fn notify(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}
