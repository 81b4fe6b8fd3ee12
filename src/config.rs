//! CLI configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via DFA_CONFIG or --config)
//! 3. Environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Verdict output configuration.
    pub output: OutputConfig,
    /// Interactive session configuration.
    pub repl: ReplConfig,
    /// Logging configuration.
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from `path` if given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        self.output.apply_overrides(&var);
        self.repl.apply_overrides(&var);
        self.log.apply_overrides(&var);
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repl.prompt.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "repl.prompt must not be empty".to_string(),
            ));
        }

        tracing_subscriber::EnvFilter::try_new(&self.log.level).map_err(|e| {
            ConfigError::ValidationError(format!("invalid log.level '{}': {}", self.log.level, e))
        })?;

        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }
}

fn parse_bool(value: &str) -> bool {
    value == "1" || value.to_lowercase() == "true"
}

/// When verdicts are coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Colour when the terminal supports it.
    #[default]
    Auto,
    /// Always colour.
    Always,
    /// Never colour.
    Never,
}

impl ColorMode {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "auto" => Some(ColorMode::Auto),
            "always" => Some(ColorMode::Always),
            "never" => Some(ColorMode::Never),
            _ => None,
        }
    }

    /// Installs this mode as the process-wide colour setting.
    pub fn apply(self) {
        match self {
            ColorMode::Auto => colored::control::unset_override(),
            ColorMode::Always => colored::control::set_override(true),
            ColorMode::Never => colored::control::set_override(false),
        }
    }
}

/// Verdict output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Colour mode.
    pub color: ColorMode,
    /// Print why a rejected input stopped.
    pub show_reason: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
            show_reason: true,
        }
    }
}

impl OutputConfig {
    fn apply_overrides(&mut self, var: &impl Fn(&str) -> Option<String>) {
        if let Some(color) = var("DFA_COLOR") {
            if let Some(mode) = ColorMode::parse(&color) {
                self.color = mode;
            }
        }

        if let Some(show) = var("DFA_SHOW_REASON") {
            self.show_reason = parse_bool(&show);
        }
    }
}

/// Interactive session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// History file. Defaults to `~/.dfa_history`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
    /// Prompt shown before each line.
    pub prompt: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            prompt: "dfa>".to_string(),
        }
    }
}

impl ReplConfig {
    fn apply_overrides(&mut self, var: &impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("DFA_HISTORY") {
            self.history_file = Some(PathBuf::from(path));
        }

        if let Some(prompt) = var("DFA_PROMPT") {
            self.prompt = prompt;
        }
    }

    /// Returns the history file path.
    pub fn history_path(&self) -> PathBuf {
        match &self.history_file {
            Some(path) => path.clone(),
            None => std::env::var("HOME")
                .map(|h| PathBuf::from(h).join(".dfa_history"))
                .unwrap_or_else(|_| ".dfa_history".into()),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, used when RUST_LOG is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LogConfig {
    fn apply_overrides(&mut self, var: &impl Fn(&str) -> Option<String>) {
        if let Some(level) = var("DFA_LOG") {
            if !level.is_empty() {
                self.level = level;
            }
        }
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {1}", .0.display())]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {1}", .0.display())]
    ParseError(PathBuf, String),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}
