// ABOUTME: App orchestrator — wires config, storage, model client, voice, and the REPL together.
// ABOUTME: Owns the session lifetime: load history, run the chat loop, shut the worker down.

use std::sync::Arc;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tracing::info;

use crate::agent;
use crate::config::Config;
use crate::history::ChatHistoryStore;
use crate::repl::Repl;
use crate::session::{ChatSession, SessionOptions};
use crate::storage::PrefsFile;
use crate::voice::{CommandRecognizer, RecognitionRequest, SpeechRecognizer};

/// Top-level application that orchestrates all subsystems.
pub struct App {
    config: Config,
    fresh: bool,
}

impl App {
    /// Create a new app with the given configuration.
    pub fn new(config: Config, fresh: bool) -> Self {
        Self { config, fresh }
    }

    /// Run the application until the user quits or input ends.
    pub async fn run(self) -> anyhow::Result<()> {
        let client = agent::create_client(&self.config.llm)?;
        let model = client.model_name().to_string();

        let storage_dir = self.config.storage.resolved_dir();
        let prefs = PrefsFile::new(&storage_dir, &self.config.storage.prefs_name);
        info!(path = %prefs.path().display(), "using history storage");

        let store = if self.fresh {
            ChatHistoryStore::new(Arc::new(prefs), self.config.storage.slot.clone())
        } else {
            ChatHistoryStore::open(Arc::new(prefs), self.config.storage.slot.clone())
        };
        let loaded = store.history().len();

        let session = ChatSession::start(
            store,
            client,
            SessionOptions {
                persist_on_failure: self.config.session.persist_on_failure,
            },
        );

        let recognizer = CommandRecognizer::from_config(&self.config.voice)
            .map(|r| Arc::new(r) as Arc<dyn SpeechRecognizer>);
        let voice_request = RecognitionRequest::from_config(&self.config.voice);

        println!("pocketchat · {} · {} entries loaded", model, loaded);
        println!("Type a prompt, /voice to dictate, /send to submit dictation, /quit to exit.");
        println!();

        let started = Local::now();
        let stdin = BufReader::new(tokio::io::stdin());
        let repl = Repl::new(session, recognizer, voice_request, std::io::stdout());
        let (history, _) = repl.run(LinesStream::new(stdin.lines())).await?;

        print_exit_screen(started, history.len());
        Ok(())
    }
}

/// Print a farewell line after the chat loop exits.
fn print_exit_screen(started: chrono::DateTime<Local>, entry_count: usize) {
    let elapsed_secs = (Local::now() - started).num_seconds().max(0);
    let elapsed = if elapsed_secs >= 3600 {
        format!("{}h {:02}m", elapsed_secs / 3600, (elapsed_secs % 3600) / 60)
    } else {
        format!("{}m {:02}s", elapsed_secs / 60, elapsed_secs % 60)
    };
    println!();
    println!("Session lasted {elapsed} with {entry_count} entries in the history.");
}
