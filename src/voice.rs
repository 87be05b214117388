// ABOUTME: Voice input — hands a recognition request to an external speech-to-text program.
// ABOUTME: Each non-empty stdout line is a candidate transcript; the first one fills the prompt.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::VoiceConfig;

/// Request code identifying a voice prompt.
pub const VOICE_REQUEST_CODE: u32 = 1001;

/// Parameters passed to the speech recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    pub request_code: u32,
    pub language: String,
    pub prompt: String,
}

impl RecognitionRequest {
    pub fn from_config(config: &VoiceConfig) -> Self {
        let language = if config.language.is_empty() {
            std::env::var("LANG")
                .ok()
                .and_then(|l| l.split('.').next().map(|s| s.replace('_', "-")))
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "en-US".to_string())
        } else {
            config.language.clone()
        };
        Self {
            request_code: VOICE_REQUEST_CODE,
            language,
            prompt: config.prompt.clone(),
        }
    }
}

/// A speech-to-text facility.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Returns zero or more candidate transcripts, best first.
    async fn recognize(&self, request: &RecognitionRequest) -> anyhow::Result<Vec<String>>;
}

/// First candidate transcript, if any.
pub fn first_result(results: Vec<String>) -> Option<String> {
    results.into_iter().next()
}

/// Runs an external program and reads transcripts from its stdout.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    /// `None` when no command is configured.
    pub fn from_config(config: &VoiceConfig) -> Option<Self> {
        let (program, args) = config.command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn recognize(&self, request: &RecognitionRequest) -> anyhow::Result<Vec<String>> {
        debug!(program = %self.program, code = request.request_code, "starting speech recognizer");
        let output = Command::new(&self.program)
            .args(&self.args)
            .env("POCKETCHAT_VOICE_LANGUAGE", &request.language)
            .env("POCKETCHAT_VOICE_PROMPT", &request.prompt)
            .env("POCKETCHAT_VOICE_REQUEST_CODE", request.request_code.to_string())
            .kill_on_drop(true)
            .output()
            .await?;
        if !output.status.success() {
            anyhow::bail!("speech recognizer exited with {}", output.status);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice_config(command: &[&str]) -> VoiceConfig {
        VoiceConfig {
            command: command.iter().map(|s| s.to_string()).collect(),
            language: "en-GB".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn first_result_picks_first_candidate() {
        assert_eq!(
            first_result(vec!["hello there".to_string(), "hello their".to_string()]),
            Some("hello there".to_string())
        );
        assert_eq!(first_result(vec![]), None);
    }

    #[test]
    fn no_command_means_no_recognizer() {
        assert!(CommandRecognizer::from_config(&VoiceConfig::default()).is_none());
    }

    #[test]
    fn request_uses_configured_language_and_prompt() {
        let request = RecognitionRequest::from_config(&voice_config(&[]));
        assert_eq!(request.request_code, VOICE_REQUEST_CODE);
        assert_eq!(request.language, "en-GB");
        assert_eq!(request.prompt, "Speak your query");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_stdout_lines_become_candidates() {
        let recognizer = CommandRecognizer::from_config(&voice_config(&[
            "sh",
            "-c",
            "printf \"what is rust\\n\\n  $POCKETCHAT_VOICE_LANGUAGE  \\n\"",
        ]))
        .unwrap();
        let request = RecognitionRequest::from_config(&voice_config(&[]));
        let results = recognizer.recognize(&request).await.unwrap();
        assert_eq!(results, vec!["what is rust", "en-GB"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_an_error() {
        let recognizer =
            CommandRecognizer::from_config(&voice_config(&["sh", "-c", "exit 3"])).unwrap();
        let request = RecognitionRequest::from_config(&voice_config(&[]));
        assert!(recognizer.recognize(&request).await.is_err());
    }
}
