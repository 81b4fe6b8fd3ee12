//! # dfa-core
//!
//! Deterministic finite automaton engine.
//!
//! This crate provides:
//! - Automaton definition parsing and validation
//! - Single-string evaluation with explicit run statuses
//! - An injectable reporting sink for verdicts
//!
//! ```
//! use dfa_core::{Automaton, RunStatus};
//!
//! let dfa = Automaton::build(["q0", "q1"], ["a", "b"], "q0-a-q1,q1-b-q0", "q0", ["q1"]).unwrap();
//! assert!(dfa.accepts("aba"));
//! assert_eq!(dfa.evaluate("b").status, RunStatus::NoTransition);
//! ```

pub mod definition;
pub mod engine;
pub mod error;
pub mod report;

pub use definition::{Automaton, AutomatonDefinitionRaw, State, Symbol, Transition, Validation};
pub use engine::{evaluate, Run, RunOutcome, RunStatus, Step, Trace, Verdict};
pub use error::{ConstructionError, ConstructionWarning, CoreError};
pub use report::{NullReporter, RecordingReporter, Reporter};
