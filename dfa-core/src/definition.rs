//! Automaton definition types.
//!
//! An automaton is declared from five parts:
//!
//! ```yaml
//! states: [q0, q1]
//! alphabet: [a, b]
//! transitions: "q0-a-q1,q1-b-q0"
//! start: q0
//! accepted: [q1]
//! ```
//!
//! The transition table is a list of `source-symbol-target` records separated
//! by commas. In serialized form it may also be given as a list of records.

use crate::error::{ConstructionError, ConstructionWarning, CoreError};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Separates records in a transition table.
pub const RECORD_DELIMITER: char = ',';

/// Separates the fields of a single transition record.
pub const FIELD_DELIMITER: char = '-';

/// A state in the automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(pub String);

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for State {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for State {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A symbol of the input alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Self(c.to_string())
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single entry of the transition relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// Source state.
    pub from: State,

    /// Symbol consumed by this transition.
    pub symbol: Symbol,

    /// Target state.
    pub to: State,
}

impl Transition {
    pub fn new(from: impl Into<State>, symbol: impl Into<Symbol>, to: impl Into<State>) -> Self {
        Self {
            from: from.into(),
            symbol: symbol.into(),
            to: to.into(),
        }
    }

    /// Parses a single `source-symbol-target` record.
    ///
    /// The record must split into exactly three non-empty fields.
    pub fn parse(record: &str) -> Result<Self, ConstructionError> {
        let mut fields = record.split(FIELD_DELIMITER);
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(from), Some(symbol), Some(to), None)
                if !from.is_empty() && !symbol.is_empty() && !to.is_empty() =>
            {
                Ok(Self::new(from, symbol, to))
            }
            _ => Err(ConstructionError::MalformedTransition {
                record: record.to_string(),
            }),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.from, FIELD_DELIMITER, self.symbol, FIELD_DELIMITER, self.to
        )
    }
}

fn deserialize_transition_table<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct TransitionTableVisitor;

    impl<'de> Visitor<'de> for TransitionTableVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a transition table string or an array of transition records")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut records = Vec::new();
            while let Some(record) = seq.next_element::<String>()? {
                records.push(record);
            }
            Ok(records.join(RECORD_DELIMITER.to_string().as_str()))
        }
    }

    deserializer.deserialize_any(TransitionTableVisitor)
}

/// Raw automaton definition as stored/transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDefinitionRaw {
    /// All declared states, in declaration order.
    pub states: Vec<String>,

    /// Input alphabet, in declaration order.
    pub alphabet: Vec<String>,

    /// Transition table (`q0-a-q1,q1-b-q0`).
    #[serde(deserialize_with = "deserialize_transition_table")]
    pub transitions: String,

    /// Start state.
    pub start: String,

    /// Accepting states.
    #[serde(default)]
    pub accepted: Vec<String>,
}

impl AutomatonDefinitionRaw {
    pub fn new<S, A, F>(
        states: S,
        alphabet: A,
        transitions: impl Into<String>,
        start: impl Into<String>,
        accepted: F,
    ) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            states: states.into_iter().map(Into::into).collect(),
            alphabet: alphabet.into_iter().map(Into::into).collect(),
            transitions: transitions.into(),
            start: start.into(),
            accepted: accepted.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything found while validating a definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Fatal errors, in check order.
    pub errors: Vec<ConstructionError>,

    /// Non-fatal warnings, in check order.
    pub warnings: Vec<ConstructionWarning>,
}

impl Validation {
    /// Returns true if no fatal error was found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validated and indexed deterministic finite automaton.
///
/// Immutable once built. Evaluation lives in [`crate::engine`].
#[derive(Debug, Clone)]
pub struct Automaton {
    states: Vec<State>,
    alphabet: Vec<Symbol>,
    start: State,
    accepted: Vec<State>,

    state_set: HashSet<State>,
    symbol_set: HashSet<Symbol>,
    accepted_set: HashSet<State>,

    /// Transitions in registration order.
    transitions: Vec<Transition>,

    /// Transitions indexed by source state -> symbol -> target state.
    index: HashMap<State, HashMap<Symbol, State>>,

    warnings: Vec<ConstructionWarning>,

    /// Original raw definition.
    raw: AutomatonDefinitionRaw,
}

impl Automaton {
    /// Builds an automaton from its five defining parts.
    pub fn build<S, A, F>(
        states: S,
        alphabet: A,
        transitions: &str,
        start: &str,
        accepted: F,
    ) -> Result<Self, ConstructionError>
    where
        S: IntoIterator,
        S::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self::from_raw(AutomatonDefinitionRaw::new(
            states,
            alphabet,
            transitions,
            start,
            accepted,
        ))
    }

    /// Parses and validates an automaton definition from JSON.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, CoreError> {
        let raw: AutomatonDefinitionRaw = serde_json::from_value(json.clone())?;
        Ok(Self::from_raw(raw)?)
    }

    /// Creates an automaton from a raw definition.
    ///
    /// Returns the first fatal error in check order. Use [`Automaton::validate`]
    /// to collect every error at once.
    pub fn from_raw(raw: AutomatonDefinitionRaw) -> Result<Self, ConstructionError> {
        let (automaton, errors) = Self::compile(raw);
        if let Some(error) = errors.into_iter().next() {
            return Err(error);
        }

        for warning in &automaton.warnings {
            tracing::warn!(code = warning.warning_code(), "{}", warning);
        }
        tracing::debug!(
            states = automaton.states.len(),
            symbols = automaton.alphabet.len(),
            transitions = automaton.transitions.len(),
            "automaton built"
        );

        Ok(automaton)
    }

    /// Runs every check against a raw definition without building it.
    pub fn validate(raw: &AutomatonDefinitionRaw) -> Validation {
        let (automaton, errors) = Self::compile(raw.clone());
        Validation {
            errors,
            warnings: automaton.warnings,
        }
    }

    /// Indexes a raw definition, collecting every fatal error found on the way.
    ///
    /// The returned automaton is only sound when the error list is empty.
    fn compile(raw: AutomatonDefinitionRaw) -> (Self, Vec<ConstructionError>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let (symbols, repeated) = split_duplicates(&raw.alphabet);
        errors.extend(
            repeated
                .into_iter()
                .map(|symbol| ConstructionError::DuplicateSymbol { symbol }),
        );
        let alphabet: Vec<Symbol> = symbols.into_iter().map(Symbol).collect();
        let symbol_set: HashSet<Symbol> = alphabet.iter().cloned().collect();

        let (names, repeated) = split_duplicates(&raw.states);
        errors.extend(
            repeated
                .into_iter()
                .map(|state| ConstructionError::DuplicateState { state }),
        );
        let states: Vec<State> = names.into_iter().map(State).collect();
        let state_set: HashSet<State> = states.iter().cloned().collect();

        let (accepted_names, repeated) = split_duplicates(&raw.accepted);
        warnings.extend(
            repeated
                .into_iter()
                .map(|state| ConstructionWarning::DuplicateAcceptedState { state }),
        );

        if !state_set.contains(raw.start.as_str()) {
            errors.push(ConstructionError::UnknownStartState {
                state: raw.start.clone(),
                states: raw.states.clone(),
            });
        }

        for name in &accepted_names {
            if !state_set.contains(name.as_str()) {
                errors.push(ConstructionError::UnknownAcceptedState {
                    state: name.clone(),
                    states: raw.states.clone(),
                });
            }
        }
        let accepted: Vec<State> = accepted_names.into_iter().map(State).collect();
        let accepted_set: HashSet<State> = accepted.iter().cloned().collect();

        let mut transitions = Vec::new();
        let mut index: HashMap<State, HashMap<Symbol, State>> = HashMap::new();

        if raw.transitions.is_empty() {
            errors.push(ConstructionError::EmptyTransitionTable);
        } else {
            for record in raw.transitions.split(RECORD_DELIMITER) {
                let transition = match Transition::parse(record) {
                    Ok(t) => t,
                    Err(e) => {
                        errors.push(e);
                        continue;
                    }
                };

                let mut consistent = true;
                let mut referenced = vec![&transition.from];
                if transition.to != transition.from {
                    referenced.push(&transition.to);
                }
                for state in referenced {
                    if !state_set.contains(state) {
                        errors.push(ConstructionError::UnknownState {
                            transition: record.to_string(),
                            state: state.to_string(),
                        });
                        consistent = false;
                    }
                }
                if !symbol_set.contains(&transition.symbol) {
                    errors.push(ConstructionError::UnknownSymbol {
                        transition: record.to_string(),
                        symbol: transition.symbol.to_string(),
                    });
                    consistent = false;
                }
                if !consistent {
                    continue;
                }

                let targets = index.entry(transition.from.clone()).or_default();
                match targets.get(&transition.symbol) {
                    None => {
                        targets.insert(transition.symbol.clone(), transition.to.clone());
                        transitions.push(transition);
                    }
                    Some(existing) if *existing == transition.to => {
                        warnings.push(ConstructionWarning::DuplicateTransition {
                            transition: record.to_string(),
                        });
                    }
                    Some(existing) => {
                        errors.push(ConstructionError::NonDeterministicTransition {
                            state: transition.from.to_string(),
                            symbol: transition.symbol.to_string(),
                            existing: existing.to_string(),
                            conflicting: transition.to.to_string(),
                        });
                    }
                }
            }
        }

        let automaton = Self {
            states,
            alphabet,
            start: State(raw.start.clone()),
            accepted,
            state_set,
            symbol_set,
            accepted_set,
            transitions,
            index,
            warnings,
            raw,
        };

        (automaton, errors)
    }

    /// Declared states, in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Input alphabet, in declaration order.
    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    pub fn start_state(&self) -> &State {
        &self.start
    }

    /// Accepting states, deduplicated, in declaration order.
    pub fn accepted_states(&self) -> &[State] {
        &self.accepted
    }

    /// Registered transitions, in registration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Warnings raised while building this automaton.
    pub fn warnings(&self) -> &[ConstructionWarning] {
        &self.warnings
    }

    /// Looks up the target of the transition from `state` on `symbol`.
    pub fn next_state(&self, state: &str, symbol: &str) -> Option<&State> {
        self.index.get(state)?.get(symbol)
    }

    pub fn is_accepting(&self, state: &str) -> bool {
        self.accepted_set.contains(state)
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.state_set.contains(state)
    }

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbol_set.contains(symbol)
    }

    /// Returns the symbols that have a transition out of `state`.
    pub fn symbols_from(&self, state: &str) -> Vec<&Symbol> {
        self.transitions
            .iter()
            .filter(|t| t.from.as_str() == state)
            .map(|t| &t.symbol)
            .collect()
    }

    /// Renders the transition function as `(state, symbol)->target` pairs.
    pub fn transition_table(&self) -> String {
        self.transitions
            .iter()
            .map(|t| format!("({}, {})->{}", t.from, t.symbol, t.to))
            .collect::<Vec<_>>()
            .join("  ")
    }

    /// Returns the original raw definition.
    pub fn raw(&self) -> &AutomatonDefinitionRaw {
        &self.raw
    }

    /// Returns the raw definition as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, CoreError> {
        Ok(serde_json::to_value(&self.raw)?)
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "states: [{}]", join(&self.states))?;
        writeln!(f, "alphabet: [{}]", join(&self.alphabet))?;
        writeln!(f, "start state: {}", self.start)?;
        writeln!(f, "accepted states: [{}]", join(&self.accepted))?;
        write!(f, "transition function: {}", self.transition_table())
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Splits `items` into first occurrences and the values that repeat (each once).
fn split_duplicates(items: &[String]) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(items.len());
    let mut repeated = Vec::new();
    for item in items {
        if seen.insert(item.as_str()) {
            unique.push(item.clone());
        } else if !repeated.contains(item) {
            repeated.push(item.clone());
        }
    }
    (unique, repeated)
}
