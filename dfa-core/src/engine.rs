//! Execution engine - replays an input against a built automaton.
//!
//! Evaluation never mutates the automaton. Each call owns a [`Run`] that is
//! dropped when the verdict is returned, so one automaton can serve any number
//! of concurrent evaluations.

use crate::definition::{Automaton, State};
use crate::report::Reporter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a run after each consumed symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The input contains a symbol outside the alphabet.
    UnknownSymbol,
    /// No transition leaves the current state on the consumed symbol.
    NoTransition,
    /// The run is in a non-accepting state.
    NotAtFinal,
    /// The run is in an accepting state.
    AtFinal,
}

impl RunStatus {
    /// Status of a run standing in `state`.
    fn at(automaton: &Automaton, state: &State) -> Self {
        if automaton.is_accepting(state.as_str()) {
            RunStatus::AtFinal
        } else {
            RunStatus::NotAtFinal
        }
    }

    /// Human-readable description of the status.
    pub fn message(&self) -> &'static str {
        match self {
            RunStatus::UnknownSymbol => "there is a symbol in the input that is not in the alphabet",
            RunStatus::NoTransition => "there are no transitions from the current state",
            RunStatus::NotAtFinal => "the final state has not been reached",
            RunStatus::AtFinal => "the final state has been reached",
        }
    }

    /// Returns true if the run stops consuming input in this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::UnknownSymbol | RunStatus::NoTransition)
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            RunStatus::AtFinal => Verdict::Accepted,
            _ => Verdict::Rejected,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Final classification of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Accepted => "Accepted",
            Verdict::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of evaluating one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub verdict: Verdict,

    /// Status after the last consumed symbol.
    pub status: RunStatus,

    /// State the run stopped in.
    pub state: State,

    /// Number of symbols consumed by successful transitions.
    pub consumed: usize,

    /// Symbol that halted the run early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted_on: Option<String>,
}

impl RunOutcome {
    pub fn is_accepted(&self) -> bool {
        self.verdict.is_accepted()
    }

    /// Explains why the input was rejected. `None` for accepted inputs.
    pub fn reason(&self) -> Option<String> {
        let symbol = self.halted_on.as_deref().unwrap_or_default();
        match self.status {
            RunStatus::AtFinal => None,
            RunStatus::UnknownSymbol => Some(format!(
                "{} ('{}' at position {})",
                self.status.message(),
                symbol,
                self.consumed
            )),
            RunStatus::NoTransition => Some(format!(
                "{} ('{}' on '{}')",
                self.status.message(),
                self.state,
                symbol
            )),
            RunStatus::NotAtFinal => Some(format!(
                "{} (stopped in '{}')",
                self.status.message(),
                self.state
            )),
        }
    }
}

/// Transient state of a single evaluation.
#[derive(Debug, Clone)]
pub struct Run<'a> {
    automaton: &'a Automaton,
    current: &'a State,
    status: RunStatus,
    consumed: usize,
    halted_on: Option<String>,
}

impl<'a> Run<'a> {
    /// Starts a run in the automaton's start state.
    pub fn new(automaton: &'a Automaton) -> Self {
        let current = automaton.start_state();
        Self {
            automaton,
            current,
            status: RunStatus::at(automaton, current),
            consumed: 0,
            halted_on: None,
        }
    }

    /// Consumes one symbol and returns the resulting status.
    ///
    /// Once the run is halted further symbols are ignored.
    pub fn step(&mut self, symbol: &str) -> RunStatus {
        if self.status.is_terminal() {
            return self.status;
        }

        let automaton = self.automaton;
        if !automaton.has_symbol(symbol) {
            self.halt(RunStatus::UnknownSymbol, symbol);
            return self.status;
        }

        match automaton.next_state(self.current.as_str(), symbol) {
            Some(next) => {
                tracing::trace!(from = %self.current, symbol, to = %next, "step");
                self.current = next;
                self.consumed += 1;
                self.status = RunStatus::at(automaton, next);
            }
            None => self.halt(RunStatus::NoTransition, symbol),
        }

        self.status
    }

    fn halt(&mut self, status: RunStatus, symbol: &str) {
        tracing::trace!(state = %self.current, symbol, ?status, "run halted");
        self.status = status;
        self.halted_on = Some(symbol.to_string());
    }

    pub fn current(&self) -> &'a State {
        self.current
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Returns true if the run stopped early.
    pub fn is_halted(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn finish(self) -> RunOutcome {
        RunOutcome {
            verdict: self.status.verdict(),
            status: self.status,
            state: self.current.clone(),
            consumed: self.consumed,
            halted_on: self.halted_on,
        }
    }
}

/// One consumed symbol of a traced run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub from: State,
    pub symbol: String,
    /// Target state, absent when the step halted the run.
    pub to: Option<State>,
    pub status: RunStatus,
}

/// Full path of a run together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    pub steps: Vec<Step>,
    pub outcome: RunOutcome,
}

/// Evaluates `input`, one `char` per symbol.
pub fn evaluate(automaton: &Automaton, input: &str) -> RunOutcome {
    let mut run = Run::new(automaton);
    let mut buf = [0u8; 4];
    for c in input.chars() {
        if run.step(c.encode_utf8(&mut buf)).is_terminal() {
            break;
        }
    }
    run.finish()
}

/// Evaluates a sequence of symbol tokens, for alphabets with multi-character symbols.
pub fn evaluate_symbols<I>(automaton: &Automaton, symbols: I) -> RunOutcome
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut run = Run::new(automaton);
    for symbol in symbols {
        if run.step(symbol.as_ref()).is_terminal() {
            break;
        }
    }
    run.finish()
}

/// Evaluates `input` and records every step taken.
pub fn trace(automaton: &Automaton, input: &str) -> Trace {
    let mut run = Run::new(automaton);
    let mut steps = Vec::new();
    let mut buf = [0u8; 4];

    for c in input.chars() {
        let symbol = c.encode_utf8(&mut buf);
        let from = run.current().clone();
        let status = run.step(symbol);
        steps.push(Step {
            from,
            symbol: symbol.to_string(),
            to: (!status.is_terminal()).then(|| run.current().clone()),
            status,
        });
        if status.is_terminal() {
            break;
        }
    }

    Trace {
        steps,
        outcome: run.finish(),
    }
}

impl Automaton {
    /// Evaluates `input`, one `char` per symbol.
    pub fn evaluate(&self, input: &str) -> RunOutcome {
        evaluate(self, input)
    }

    /// Evaluates a sequence of symbol tokens.
    pub fn evaluate_symbols<I>(&self, symbols: I) -> RunOutcome
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        evaluate_symbols(self, symbols)
    }

    /// Evaluates `input` and records every step taken.
    pub fn trace(&self, input: &str) -> Trace {
        trace(self, input)
    }

    /// Returns true if `input` is accepted.
    pub fn accepts(&self, input: &str) -> bool {
        self.evaluate(input).is_accepted()
    }

    /// Evaluates `input`, hands the verdict to `reporter` and returns it as a bool.
    pub fn check_membership<R>(&self, input: &str, reporter: &mut R) -> bool
    where
        R: Reporter + ?Sized,
    {
        let outcome = self.evaluate(input);
        let reason = outcome.reason();
        reporter.report(outcome.verdict, reason.as_deref());
        outcome.is_accepted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn alternating() -> Automaton {
        Automaton::build(["q0", "q1"], ["a", "b"], "q0-a-q1,q1-b-q0", "q0", ["q1"]).unwrap()
    }

    fn loop_accepting() -> Automaton {
        Automaton::build(["q0"], ["a"], "q0-a-q0", "q0", ["q0"]).unwrap()
    }

    #[test]
    fn test_alternating_inputs() {
        let dfa = alternating();

        let outcome = dfa.evaluate("a");
        assert_eq!(outcome.verdict, Verdict::Accepted);
        assert_eq!(outcome.status, RunStatus::AtFinal);
        assert_eq!(outcome.state.as_str(), "q1");

        let outcome = dfa.evaluate("ab");
        assert_eq!(outcome.verdict, Verdict::Rejected);
        assert_eq!(outcome.status, RunStatus::NotAtFinal);
        assert_eq!(outcome.state.as_str(), "q0");

        assert!(dfa.accepts("aba"));
    }

    #[test]
    fn test_unknown_symbol() {
        let outcome = alternating().evaluate("c");
        assert_eq!(outcome.verdict, Verdict::Rejected);
        assert_eq!(outcome.status, RunStatus::UnknownSymbol);
        assert_eq!(outcome.halted_on.as_deref(), Some("c"));
        assert_eq!(outcome.consumed, 0);
    }

    #[test]
    fn test_no_transition() {
        let outcome = alternating().evaluate("b");
        assert_eq!(outcome.verdict, Verdict::Rejected);
        assert_eq!(outcome.status, RunStatus::NoTransition);
        assert_eq!(outcome.state.as_str(), "q0");
    }

    #[test]
    fn test_run_stops_at_first_failure() {
        // 'b' has no transition from q0, so the unknown 'c' is never reached.
        let outcome = alternating().evaluate("bc");
        assert_eq!(outcome.status, RunStatus::NoTransition);
        assert_eq!(outcome.halted_on.as_deref(), Some("b"));

        let outcome = alternating().evaluate("abca");
        assert_eq!(outcome.status, RunStatus::UnknownSymbol);
        assert_eq!(outcome.consumed, 2);
    }

    #[test]
    fn test_self_loop_accepting_start() {
        let dfa = loop_accepting();
        assert!(dfa.accepts(""));
        assert!(dfa.accepts("aaaa"));
        assert_eq!(dfa.evaluate("").status, RunStatus::AtFinal);
    }

    #[test]
    fn test_empty_input_on_non_accepting_start() {
        let outcome = alternating().evaluate("");
        assert_eq!(outcome.status, RunStatus::NotAtFinal);
        assert_eq!(outcome.verdict, Verdict::Rejected);
    }

    #[test]
    fn test_multi_character_symbols() {
        let dfa = Automaton::build(
            ["locked", "open"],
            ["coin", "push"],
            "locked-coin-open,open-push-locked,open-coin-open",
            "locked",
            ["locked"],
        )
        .unwrap();

        assert!(dfa.evaluate_symbols(["coin", "coin", "push"]).is_accepted());
        assert!(!dfa.evaluate_symbols(vec!["coin".to_string()]).is_accepted());
        assert_eq!(
            dfa.evaluate_symbols(["push"]).status,
            RunStatus::NoTransition
        );
    }

    #[test]
    fn test_run_stepwise() {
        let dfa = alternating();
        let mut run = Run::new(&dfa);
        assert_eq!(run.status(), RunStatus::NotAtFinal);

        assert_eq!(run.step("a"), RunStatus::AtFinal);
        assert_eq!(run.current().as_str(), "q1");
        assert_eq!(run.step("x"), RunStatus::UnknownSymbol);
        assert!(run.is_halted());

        // Halted runs ignore further input.
        assert_eq!(run.step("b"), RunStatus::UnknownSymbol);
        assert_eq!(run.consumed(), 1);
        assert_eq!(run.current().as_str(), "q1");
    }

    #[test]
    fn test_trace() {
        let trace = alternating().trace("abb");
        assert_eq!(trace.steps.len(), 3);
        assert_eq!(trace.steps[0].to.as_ref().map(State::as_str), Some("q1"));
        assert_eq!(trace.steps[1].status, RunStatus::NotAtFinal);
        assert_eq!(trace.steps[2].to, None);
        assert_eq!(trace.steps[2].status, RunStatus::NoTransition);
        assert_eq!(trace.outcome.status, RunStatus::NoTransition);
    }

    #[test]
    fn test_reason() {
        let dfa = alternating();
        assert_eq!(dfa.evaluate("a").reason(), None);
        assert!(dfa.evaluate("c").reason().unwrap().contains("'c' at position 0"));
        assert!(dfa.evaluate("b").reason().unwrap().contains("'q0' on 'b'"));
        assert!(dfa.evaluate("ab").reason().unwrap().contains("stopped in 'q0'"));
    }

    #[test]
    fn test_check_membership_reports() {
        let dfa = alternating();
        let mut reporter = RecordingReporter::default();

        assert!(dfa.check_membership("a", &mut reporter));
        assert!(!dfa.check_membership("b", &mut reporter));

        assert_eq!(reporter.reports.len(), 2);
        assert_eq!(reporter.reports[0], (Verdict::Accepted, None));
        assert_eq!(reporter.reports[1].0, Verdict::Rejected);
        assert!(reporter.reports[1].1.is_some());

        let mut labels = Vec::new();
        let mut collect = |verdict: Verdict, _reason: Option<&str>| labels.push(verdict.label());
        dfa.check_membership("aba", &mut collect);
        assert_eq!(labels, vec!["Accepted"]);
    }

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_value(alternating().evaluate("c")).unwrap();
        assert_eq!(json["verdict"], "Rejected");
        assert_eq!(json["status"], "unknown_symbol");
        assert_eq!(json["halted_on"], "c");

        let json = serde_json::to_value(alternating().evaluate("a")).unwrap();
        assert!(json.get("halted_on").is_none());
    }

    #[test]
    fn test_shared_across_threads() {
        let dfa = Arc::new(alternating());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let dfa = Arc::clone(&dfa);
                std::thread::spawn(move || {
                    let input = "ab".repeat(i) + "a";
                    dfa.accepts(&input)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    /// Automatons over {a, b} with a total transition function.
    fn total_automaton() -> impl Strategy<Value = Automaton> {
        (1usize..6)
            .prop_flat_map(|n| {
                (
                    Just(n),
                    proptest::collection::vec(0..n, n * 2),
                    0..n,
                    proptest::collection::vec(any::<bool>(), n),
                )
            })
            .prop_map(|(n, targets, start, accepting)| {
                let states: Vec<String> = (0..n).map(|i| format!("q{}", i)).collect();
                let records: Vec<String> = targets
                    .chunks(2)
                    .enumerate()
                    .flat_map(|(i, t)| [format!("q{}-a-q{}", i, t[0]), format!("q{}-b-q{}", i, t[1])])
                    .collect();
                let accepted: Vec<String> = accepting
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| **a)
                    .map(|(i, _)| format!("q{}", i))
                    .collect();
                Automaton::build(
                    states,
                    ["a", "b"],
                    &records.join(","),
                    &format!("q{}", start),
                    accepted,
                )
                .unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_empty_input_accepted_iff_start_accepting(dfa in total_automaton()) {
            let accepted = dfa.accepts("");
            prop_assert_eq!(accepted, dfa.is_accepting(dfa.start_state().as_str()));
        }

        #[test]
        fn prop_unknown_symbol_always_rejects(
            dfa in total_automaton(),
            prefix in "[ab]{0,10}",
            unknown in "[c-z]",
            suffix in "[ab]{0,10}",
        ) {
            let input = format!("{}{}{}", prefix, unknown, suffix);
            let outcome = dfa.evaluate(&input);
            prop_assert_eq!(outcome.status, RunStatus::UnknownSymbol);
            prop_assert_eq!(outcome.verdict, Verdict::Rejected);
            prop_assert_eq!(outcome.consumed, prefix.len());
        }

        #[test]
        fn prop_evaluation_is_idempotent(dfa in total_automaton(), input in "[abc]{0,20}") {
            let first = dfa.evaluate(&input);
            let second = dfa.evaluate(&input);
            prop_assert_eq!(first.verdict, first.status.verdict());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_trace_agrees_with_evaluate(dfa in total_automaton(), input in "[ab]{0,20}") {
            let trace = dfa.trace(&input);
            prop_assert_eq!(trace.steps.len(), input.len());
            prop_assert_eq!(trace.outcome, dfa.evaluate(&input));
        }

        #[test]
        fn prop_conflicting_targets_are_rejected(t1 in 0usize..3, t2 in 0usize..3) {
            let table = format!("q0-a-q{},q0-a-q{}", t1, t2);
            let result = Automaton::build(["q0", "q1", "q2"], ["a"], &table, "q0", ["q0"]);
            if t1 == t2 {
                let dfa = result.unwrap();
                prop_assert_eq!(dfa.warnings().len(), 1);
            } else {
                let is_non_deterministic = matches!(
                    result,
                    Err(crate::ConstructionError::NonDeterministicTransition { .. })
                );
                prop_assert!(is_non_deterministic);
            }
        }

        #[test]
        fn prop_unknown_start_state_fails(start in "[r-z][0-9]") {
            let result = Automaton::build(["q0"], ["a"], "q0-a-q0", &start, ["q0"]);
            let is_unknown_start = matches!(
                result,
                Err(crate::ConstructionError::UnknownStartState { .. })
            );
            prop_assert!(is_unknown_start);
        }

        #[test]
        fn prop_unknown_accepted_state_fails(missing in "[r-z][0-9]") {
            let result = Automaton::build(["q0"], ["a"], "q0-a-q0", "q0", ["q0".to_string(), missing]);
            let is_unknown_accepted = matches!(
                result,
                Err(crate::ConstructionError::UnknownAcceptedState { .. })
            );
            prop_assert!(is_unknown_accepted);
        }
    }
}
