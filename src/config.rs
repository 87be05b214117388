// ABOUTME: Configuration loading for pocketchat.
// ABOUTME: Reads ~/.pocketchat/config.toml (every section optional) and resolves data paths.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::agent::gemini::DEFAULT_BASE_URL;
use crate::history::DEFAULT_SLOT;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub voice: VoiceConfig,
    pub logging: LoggingConfig,
}

/// Generative model configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

/// Where the chat history lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the preferences file. Defaults to the platform data dir.
    pub dir: Option<PathBuf>,
    pub prefs_name: String,
    pub slot: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefs_name: "chat_prefs".to_string(),
            slot: DEFAULT_SLOT.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(Config::data_dir)
    }
}

/// Chat session behavior.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub persist_on_failure: bool,
}

/// External speech recognizer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Program and arguments; empty disables voice input.
    pub command: Vec<String>,
    /// BCP 47 language tag; empty uses `$LANG`.
    pub language: String,
    pub prompt: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            language: String::new(),
            prompt: "Speak your query".to_string(),
        }
    }
}

/// Log output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for log files. Defaults to `<data dir>/logs`.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| Config::data_dir().join("logs"))
    }
}

impl Config {
    /// Load config from ~/.pocketchat/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults if absent.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pocketchat")
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Path to the secrets env file.
    pub fn secrets_env_path() -> PathBuf {
        Self::home_dir().join(".env")
    }

    /// Default directory for stored history and logs.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("pocketchat"))
            .unwrap_or_else(Self::home_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.storage.prefs_name, "chat_prefs");
        assert_eq!(config.storage.slot, "chat_data");
        assert!(!config.session.persist_on_failure);
        assert!(config.voice.command.is_empty());
        assert_eq!(config.voice.prompt, "Speak your query");
    }

    #[test]
    fn parse_config_toml() {
        let toml_str = r#"
[llm]
model = "gemini-2.0-flash"
base_url = "http://localhost:8080"

[storage]
dir = "/tmp/pocketchat"
slot = "history"

[session]
persist_on_failure = true

[voice]
command = ["whisper-listen", "--once"]
language = "en-GB"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.base_url, "http://localhost:8080");
        assert_eq!(config.storage.resolved_dir(), PathBuf::from("/tmp/pocketchat"));
        assert_eq!(config.storage.slot, "history");
        assert!(config.session.persist_on_failure);
        assert_eq!(config.voice.command, vec!["whisper-listen", "--once"]);
        assert_eq!(config.voice.language, "en-GB");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let toml_str = r#"
[llm]
model = "gemini-pro"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.model, "gemini-pro");
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.storage.prefs_name, "chat_prefs");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[llm\nmodel = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
