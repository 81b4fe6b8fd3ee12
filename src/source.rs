//! Where automaton definitions come from: a YAML/JSON file or inline flags.

use clap::Args;
use dfa_core::AutomatonDefinitionRaw;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Definition source shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct DefinitionArgs {
    /// Definition file (YAML, or JSON with a .json extension)
    #[arg(
        short,
        long,
        conflicts_with_all = ["states", "alphabet", "transitions", "start", "accepted"]
    )]
    pub file: Option<PathBuf>,

    /// Declared states
    #[arg(long, value_delimiter = ',')]
    pub states: Vec<String>,

    /// Input alphabet
    #[arg(long, value_delimiter = ',')]
    pub alphabet: Vec<String>,

    /// Transition table, e.g. "q0-a-q1,q1-b-q0"
    #[arg(short, long)]
    pub transitions: Option<String>,

    /// Start state
    #[arg(long)]
    pub start: Option<String>,

    /// Accepting states
    #[arg(long, value_delimiter = ',')]
    pub accepted: Vec<String>,
}

impl DefinitionArgs {
    /// Resolves the raw definition described by these arguments.
    pub fn load(&self) -> Result<AutomatonDefinitionRaw, SourceError> {
        if let Some(path) = &self.file {
            return load_file(path);
        }

        if self.states.is_empty() {
            return Err(SourceError::Missing("--states"));
        }
        if self.alphabet.is_empty() {
            return Err(SourceError::Missing("--alphabet"));
        }
        let transitions = self
            .transitions
            .clone()
            .ok_or(SourceError::Missing("--transitions"))?;
        let start = self.start.clone().ok_or(SourceError::Missing("--start"))?;

        Ok(AutomatonDefinitionRaw::new(
            self.states.clone(),
            self.alphabet.clone(),
            transitions,
            start,
            self.accepted.clone(),
        ))
    }
}

/// Reads a definition file. `.json` files are parsed as JSON, anything else as YAML.
pub fn load_file(path: &Path) -> Result<AutomatonDefinitionRaw, SourceError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| SourceError::Io(path.to_path_buf(), e))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let raw = if is_json {
        serde_json::from_str(&content).map_err(|e| SourceError::Parse(path.to_path_buf(), e.to_string()))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| SourceError::Parse(path.to_path_buf(), e.to_string()))?
    };

    tracing::debug!(path = %path.display(), "loaded definition");
    Ok(raw)
}

/// Errors resolving a definition.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read definition '{}': {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse definition '{}': {1}", .0.display())]
    Parse(PathBuf, String),

    #[error("missing {0} (or pass --file)")]
    Missing(&'static str),
}
