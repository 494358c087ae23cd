//! Game configuration loaded from TOML.

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::language::Language;
use crate::llm_client::{LlmConfig, LlmProvider};
use crate::session::DEFAULT_MAX_ENERGY;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "NOIR_DETECTIVE_CONFIG";

/// Configuration for a game session and its LLM provider.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// LLM provider (openai, anthropic, or gemini).
    #[serde(default)]
    llm_provider: LlmProvider,

    /// LLM model name. Falls back to the provider's default model.
    #[serde(default)]
    llm_model: Option<String>,

    /// Maximum tokens for a suspect's reply.
    #[serde(default = "default_dialogue_max_tokens")]
    dialogue_max_tokens: u32,

    /// Maximum tokens for a generated case document.
    #[serde(default = "default_case_max_tokens")]
    case_max_tokens: u32,

    /// Overrides the provider's API host; the client appends the `/v1/...` path.
    #[serde(default)]
    api_base: Option<String>,

    /// Language of generated cases and UI text.
    #[serde(default)]
    language: Language,

    /// Interrogation energy restored by the shop.
    #[serde(default = "default_max_energy")]
    max_energy: u32,
}

#[instrument]
fn default_dialogue_max_tokens() -> u32 {
    300
}

#[instrument]
fn default_case_max_tokens() -> u32 {
    4096
}

#[instrument]
fn default_max_energy() -> u32 {
    DEFAULT_MAX_ENERGY
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::default(),
            llm_model: None,
            dialogue_max_tokens: default_dialogue_max_tokens(),
            case_max_tokens: default_case_max_tokens(),
            api_base: None,
            language: Language::default(),
            max_energy: default_max_energy(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if config.max_energy == 0 {
            return Err(ConfigError::new(
                "max_energy must be at least 1".to_string(),
            ));
        }

        info!(provider = ?config.llm_provider, language = ?config.language, "Config loaded successfully");
        Ok(config)
    }

    /// Loads configuration from `explicit` if given, otherwise from the
    /// default location. A missing default file yields the defaults.
    ///
    /// Resolution order:
    /// 1. `explicit` path (must exist)
    /// 2. `$NOIR_DETECTIVE_CONFIG` (must exist)
    /// 3. `$XDG_CONFIG_HOME/noir_detective/config.toml`
    /// 4. `./noir_detective.toml`
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            debug!(path = %path, "Using config path from environment");
            return Self::from_file(path);
        }

        let path = Self::default_config_path();
        if path.is_file() {
            Self::from_file(&path)
        } else {
            info!(path = %path.display(), "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Returns the first default config location that exists, or the local
    /// fallback path.
    #[instrument]
    pub fn default_config_path() -> PathBuf {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg).join("noir_detective").join("config.toml");
            if path.is_file() {
                debug!(path = %path.display(), "Using XDG_CONFIG_HOME path");
                return path;
            }
        }

        debug!("Falling back to ./noir_detective.toml");
        PathBuf::from("noir_detective.toml")
    }

    /// Overrides the configured language.
    #[instrument(skip(self))]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Model name to request, resolving the provider default.
    #[instrument(skip(self))]
    pub fn model(&self) -> String {
        self.llm_model
            .clone()
            .unwrap_or_else(|| self.llm_provider.default_model().to_string())
    }

    /// Creates LLM configuration from this game config.
    /// Requires the provider's API key environment variable.
    #[instrument(skip(self), fields(provider = ?self.llm_provider))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");

        let var = self.llm_provider.api_key_var();
        let api_key = std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;

        let config = LlmConfig::new(
            self.llm_provider,
            api_key,
            self.model(),
            self.dialogue_max_tokens,
        );
        Ok(match &self.api_base {
            Some(base) => config.with_api_base(base.clone()),
            None => config,
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
