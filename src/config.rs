//! Configuration Surface
//!
//! Key-value settings for the chat core: the Ollama base URL, the model
//! identifier, and the system prompt injected at the start of a conversation.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. Environment variables (`GHOSTWRITER_OLLAMA_URL`, `GHOSTWRITER_MODEL`,
//!    `GHOSTWRITER_SYSTEM_PROMPT`)
//! 2. TOML configuration file
//! 3. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file lives at
//! `$XDG_CONFIG_HOME/ghostwriter/config.toml` (typically
//! `~/.config/ghostwriter/config.toml`).
//!
//! Components never read settings ambiently: the session is handed a
//! [`ChatConfig`] at construction and re-reads the file only at defined
//! refresh points (model selection, system-prompt updates).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Ollama endpoint (loopback, standard port)
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "llama3";

/// Default system preamble injected on the first user message
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert programmer. \
     Help the user write high-quality code. \
     Keep your responses concise and focused on the code.";

/// Errors that can occur when loading or persisting configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to write the config file
    #[error("Failed to write config file at {path}: {source}")]
    Write {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Chat core settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of the Ollama server
    pub ollama_url: String,
    /// Model identifier for completions
    pub model: String,
    /// System preamble for new conversations
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ChatConfig {
    /// Default config file path under the XDG config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ghostwriter").join("config.toml"))
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => {
                tracing::debug!("no config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Persist the configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => {
                tracing::warn!("no config directory available, settings not persisted");
                Ok(())
            }
        }
    }

    /// Persist the configuration to a specific path, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        // Serializing a flat struct of strings cannot fail.
        let raw = toml::to_string_pretty(self).unwrap_or_default();
        std::fs::write(path, raw).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment variable overrides (highest priority).
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("GHOSTWRITER_OLLAMA_URL") {
            self.ollama_url = url;
        }
        if let Ok(model) = std::env::var("GHOSTWRITER_MODEL") {
            self.model = model;
        }
        if let Ok(prompt) = std::env::var("GHOSTWRITER_SYSTEM_PROMPT") {
            self.system_prompt = prompt;
        }
    }
}
