//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use parley_application::ChatConfig;
use parley_domain::{
    DEFAULT_NATIVE_LANGUAGE, DEFAULT_SPEAKING_RATE, DEFAULT_TARGET_LANGUAGE, LanguageTable, Model,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("model name cannot be empty")]
    EmptyModelName,

    #[error("base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("chat.{0} cannot be empty")]
    EmptyChatLanguage(&'static str),

    #[error("server port cannot be 0")]
    InvalidPort,

    #[error("speech rate must be between 0.1 and 10.0, got {0}")]
    InvalidSpeechRate(f32),
}

/// Raw LLM provider configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// OpenAI-compatible API root, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Model used for every reply
    pub model: Model,
    /// Environment variable holding the bearer token
    pub api_key_env: String,
    /// Timeout in seconds until the provider starts answering
    pub timeout_seconds: Option<u64>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: Model::default(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: None,
        }
    }
}

impl FileProviderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Raw HTTP server configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Raw chat defaults from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Language practiced when a request names none
    pub target_language: String,
    /// Language used for explanations when a request names none
    pub native_language: String,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            native_language: DEFAULT_NATIVE_LANGUAGE.to_string(),
        }
    }
}

/// Raw speech configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSpeechConfig {
    /// Speaking rate handed to text-to-speech clients
    pub rate: f32,
}

impl Default for FileSpeechConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_SPEAKING_RATE,
        }
    }
}

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show the typing indicator while a reply streams
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rolling log files, none means stderr only
    pub directory: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// LLM provider settings
    pub provider: FileProviderConfig,
    /// HTTP server settings
    pub server: FileServerConfig,
    /// Chat defaults
    pub chat: FileChatConfig,
    /// Speech settings
    pub speech: FileSpeechConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Logging settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(0) = self.provider.timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if self.provider.model.as_str().trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }

        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }

        if self.chat.target_language.trim().is_empty() {
            return Err(ConfigValidationError::EmptyChatLanguage("target_language"));
        }

        if self.chat.native_language.trim().is_empty() {
            return Err(ConfigValidationError::EmptyChatLanguage("native_language"));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        let rate = self.speech.rate;
        if !(0.1..=10.0).contains(&rate) {
            return Err(ConfigValidationError::InvalidSpeechRate(rate));
        }

        Ok(())
    }

    /// Use case configuration derived from the file.
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig::new(self.provider.model.clone())
            .with_languages(&self.chat.target_language, &self.chat.native_language)
    }

    /// Built-in language table with the configured speaking rate.
    pub fn language_table(&self) -> LanguageTable {
        LanguageTable::builtin().with_speaking_rate(self.speech.rate)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[provider]
base_url = "http://localhost:11434/v1"
model = "llama3.1"
api_key_env = "LOCAL_KEY"
timeout_seconds = 30

[server]
host = "0.0.0.0"
port = 8080

[chat]
target_language = "Japanese"
native_language = "Spanish"

[speech]
rate = 1.0

[repl]
show_progress = false
history_file = "~/.local/share/parley/history.txt"

[logging]
directory = "/var/log/parley"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.base_url, "http://localhost:11434/v1");
        assert_eq!(config.provider.model, Model::Custom("llama3.1".to_string()));
        assert_eq!(config.provider.api_key_env, "LOCAL_KEY");
        assert_eq!(config.provider.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.chat.target_language, "Japanese");
        assert_eq!(config.speech.rate, 1.0);
        assert!(!config.repl.show_progress);
        assert_eq!(config.logging.directory.as_deref(), Some("/var/log/parley"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[provider]
model = "gpt-4.1-mini"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.model, Model::Gpt41Mini);
        // Defaults should apply
        assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.chat.native_language, "English");
        assert!(config.repl.show_progress);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.provider.model, Model::Gpt4o);
        assert_eq!(config.provider.base_url, "https://api.openai.com/v1");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.speech.rate, 0.8);
        assert!(config.provider.timeout().is_none());
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config: FileConfig = toml::from_str("[provider]\ntimeout_seconds = 0").unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));
    }

    #[test]
    fn test_validate_blank_chat_languages() {
        let config: FileConfig = toml::from_str("[chat]\ntarget_language = \"\"").unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyChatLanguage("target_language"))
        );

        let config: FileConfig = toml::from_str("[chat]\nnative_language = \"   \"").unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err, ConfigValidationError::EmptyChatLanguage("native_language"));
        assert_eq!(err.to_string(), "chat.native_language cannot be empty");
    }

    #[test]
    fn test_validate_empty_model_name() {
        let config: FileConfig = toml::from_str("[provider]\nmodel = \"  \"").unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyModelName));
    }

    #[test]
    fn test_validate_zero_port() {
        let config: FileConfig = toml::from_str("[server]\nport = 0").unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidPort));
    }

    #[test]
    fn test_validate_speech_rate() {
        let config: FileConfig = toml::from_str("[speech]\nrate = 0.0").unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidSpeechRate(0.0))
        );
    }

    #[test]
    fn test_chat_config_and_language_table() {
        let config: FileConfig = toml::from_str(
            "[chat]\ntarget_language = \"German\"\n[speech]\nrate = 1.2\n",
        )
        .unwrap();

        let chat = config.chat_config();
        assert_eq!(chat.target_language, "German");
        assert_eq!(chat.native_language, "English");

        let table = config.language_table();
        assert_eq!(table.speech_settings("German").rate, 1.2);
        assert_eq!(table.speech_settings("German").locale, "de-DE");
    }

    #[test]
    fn test_to_toml_round_trips_sections() {
        let rendered = FileConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[provider]"));
        assert!(rendered.contains("model = \"gpt-4o\""));
        let back: FileConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(back, FileConfig::default());
    }
}
