//! Core error types.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Fatal errors raised while building an automaton.
///
/// No automaton is produced when any of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("symbol '{symbol}' is defined twice, but the alphabet must be unique")]
    DuplicateSymbol { symbol: String },

    #[error("state '{state}' is defined twice, but states must be unique")]
    DuplicateState { state: String },

    #[error("start state '{state}' does not correspond to any of the possible states: {states:?}")]
    UnknownStartState { state: String, states: Vec<String> },

    #[error("accepted state '{state}' does not correspond to any of the possible states: {states:?}")]
    UnknownAcceptedState { state: String, states: Vec<String> },

    #[error("transition '{transition}' references non-existent state '{state}'")]
    UnknownState { transition: String, state: String },

    #[error("transition '{transition}' uses symbol '{symbol}' that is not in the alphabet")]
    UnknownSymbol { transition: String, symbol: String },

    #[error("transition '{record}' is in an incorrect format, expected <state>-<symbol>-<state>")]
    MalformedTransition { record: String },

    #[error(
        "transition '{state}-{symbol}' is defined twice with different end states ({existing} != {conflicting})"
    )]
    NonDeterministicTransition {
        state: String,
        symbol: String,
        existing: String,
        conflicting: String,
    },

    #[error("not a single transition has been given")]
    EmptyTransitionTable,
}

impl ConstructionError {
    /// Returns a stable error code suitable for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConstructionError::DuplicateSymbol { .. } => "DUPLICATE_SYMBOL",
            ConstructionError::DuplicateState { .. } => "DUPLICATE_STATE",
            ConstructionError::UnknownStartState { .. } => "UNKNOWN_START_STATE",
            ConstructionError::UnknownAcceptedState { .. } => "UNKNOWN_ACCEPTED_STATE",
            ConstructionError::UnknownState { .. } => "UNKNOWN_STATE",
            ConstructionError::UnknownSymbol { .. } => "UNKNOWN_SYMBOL",
            ConstructionError::MalformedTransition { .. } => "MALFORMED_TRANSITION",
            ConstructionError::NonDeterministicTransition { .. } => "NON_DETERMINISTIC_TRANSITION",
            ConstructionError::EmptyTransitionTable => "EMPTY_TRANSITION_TABLE",
        }
    }
}

/// Non-fatal conditions found while building an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstructionWarning {
    /// An accepted state was listed more than once. Later copies are dropped.
    DuplicateAcceptedState { state: String },

    /// The same transition was registered twice with the same target.
    DuplicateTransition { transition: String },
}

impl ConstructionWarning {
    pub fn warning_code(&self) -> &'static str {
        match self {
            ConstructionWarning::DuplicateAcceptedState { .. } => "DUPLICATE_ACCEPTED_STATE",
            ConstructionWarning::DuplicateTransition { .. } => "DUPLICATE_TRANSITION",
        }
    }
}

impl fmt::Display for ConstructionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionWarning::DuplicateAcceptedState { state } => {
                write!(f, "accepted state '{}' is listed more than once", state)
            }
            ConstructionWarning::DuplicateTransition { transition } => {
                write!(f, "transition <{}> is defined twice", transition)
            }
        }
    }
}

/// Errors from the automaton core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid automaton definition: {0}")]
    Construction(#[from] ConstructionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Returns an error code suitable for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::Construction(e) => e.error_code(),
            CoreError::Json(_) => "BAD_DEFINITION",
        }
    }
}
