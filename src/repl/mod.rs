// ABOUTME: Line-oriented chat front-end — reads prompts, drives the session, prints entries.
// ABOUTME: Input and worker outcomes are multiplexed on one foreground task.

pub mod input;
pub mod view;

use std::io::Write;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::warn;

use crate::history::ChatHistory;
use crate::session::{ChatSession, SessionEvent, SubmitError};
use crate::voice::{RecognitionRequest, SpeechRecognizer, first_result};

use input::{InputAction, PromptField, parse_line};

pub const VOICE_UNAVAILABLE: &str = "Speech recognition not available.";

enum Flow {
    Continue,
    Quit,
}

/// Interactive chat loop over a session.
pub struct Repl<W: Write> {
    session: ChatSession,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    voice_request: RecognitionRequest,
    field: PromptField,
    out: W,
}

impl<W: Write> Repl<W> {
    pub fn new(
        mut session: ChatSession,
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        voice_request: RecognitionRequest,
        out: W,
    ) -> Self {
        let events = session.subscribe();
        Self {
            session,
            events,
            recognizer,
            voice_request,
            field: PromptField::default(),
            out,
        }
    }

    /// Run until `/quit`, end of input, or an I/O error. A reply still
    /// pending is waited for and the session is always shut down before an
    /// error is returned. Returns the final history along with the writer.
    pub async fn run<S>(mut self, lines: S) -> anyhow::Result<(ChatHistory, W)>
    where
        S: Stream<Item = std::io::Result<String>> + Unpin,
    {
        let mut result = self.drive(lines).await;

        if !self.session.is_idle() {
            self.session.await_turn().await;
            let printed = self.drain_events();
            if result.is_ok() {
                result = printed;
            }
        }

        let history = self.session.shutdown().await;
        if let Err(e) = &result {
            warn!(error = %e, "chat loop stopped on I/O error");
        }
        result.map(|()| (history, self.out))
    }

    async fn drive<S>(&mut self, mut lines: S) -> anyhow::Result<()>
    where
        S: Stream<Item = std::io::Result<String>> + Unpin,
    {
        self.print_transcript()?;

        loop {
            tokio::select! {
                line = lines.next() => {
                    let Some(line) = line else { break };
                    if let Flow::Quit = self.handle_line(&line?).await? {
                        break;
                    }
                }
                Some(outcome) = self.session.next_outcome(), if !self.session.is_idle() => {
                    self.session.resolve(outcome);
                }
            }
            self.drain_events()?;
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        match parse_line(line) {
            InputAction::Submit(text) => {
                self.field.set(text);
                self.submit_field()?;
            }
            InputAction::SendField => self.submit_field()?,
            InputAction::Voice => self.listen().await?,
            InputAction::History => self.print_transcript()?,
            InputAction::Quit => return Ok(Flow::Quit),
            InputAction::Unknown(cmd) => {
                let notice = format!("Unknown command: {}", cmd);
                writeln!(self.out, "{}", view::format_notice(&notice))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn submit_field(&mut self) -> anyhow::Result<()> {
        match self.session.submit(self.field.text()) {
            Ok(()) => self.field.clear(),
            Err(e @ SubmitError::EmptyPrompt) => {
                writeln!(self.out, "{}", view::format_field_error(&e.to_string()))?;
            }
            Err(e) => writeln!(self.out, "{}", view::format_notice(&e.to_string()))?,
        }
        Ok(())
    }

    async fn listen(&mut self) -> anyhow::Result<()> {
        let Some(recognizer) = self.recognizer.clone() else {
            writeln!(self.out, "{}", view::format_notice(VOICE_UNAVAILABLE))?;
            return Ok(());
        };
        writeln!(self.out, "{}", self.voice_request.prompt)?;
        match recognizer.recognize(&self.voice_request).await {
            Ok(results) => {
                if let Some(text) = first_result(results) {
                    writeln!(self.out, "Prompt: {}  (/send to submit)", text)?;
                    self.field.set(text);
                }
            }
            Err(e) => {
                warn!(error = %e, "speech recognition failed");
                writeln!(self.out, "{}", view::format_notice(VOICE_UNAVAILABLE))?;
            }
        }
        Ok(())
    }

    fn print_transcript(&mut self) -> anyhow::Result<()> {
        for entry in self.session.history() {
            writeln!(self.out, "{}", view::format_entry(entry))?;
        }
        Ok(())
    }

    fn drain_events(&mut self) -> anyhow::Result<()> {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::Appended { entry, .. } => {
                    writeln!(self.out, "{}", view::format_entry(&entry))?;
                }
                SessionEvent::Notice(text) => writeln!(self.out, "{}", view::format_notice(&text))?,
                SessionEvent::Idle => {}
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
