//! Terminal rendering of verdicts.

use colored::Colorize;
use dfa_core::{Reporter, RunOutcome, Trace, Verdict};
use std::io::Write;

/// Formats a verdict, with the stop reason when one is given.
pub fn format_verdict(verdict: Verdict, reason: Option<&str>) -> String {
    let label = match verdict {
        Verdict::Accepted => verdict.label().green().bold(),
        Verdict::Rejected => verdict.label().red().bold(),
    };
    match reason {
        Some(reason) => format!("{} {}", label, format!("({})", reason).dimmed()),
        None => label.to_string(),
    }
}

/// Formats an outcome honoring `show_reason`.
pub fn format_outcome(outcome: &RunOutcome, show_reason: bool) -> String {
    let reason = if show_reason { outcome.reason() } else { None };
    format_verdict(outcome.verdict, reason.as_deref())
}

/// Formats each step of a traced run on its own line.
pub fn format_trace(trace: &Trace) -> String {
    let mut output = String::new();
    for step in &trace.steps {
        let line = match &step.to {
            Some(to) => format!(
                "  {} --{}--> {}",
                step.from.as_str().cyan(),
                step.symbol.yellow(),
                to.as_str().cyan()
            ),
            None => format!(
                "  {} --{}--> {}",
                step.from.as_str().cyan(),
                step.symbol.yellow(),
                "halt".red()
            ),
        };
        output.push_str(&line);
        output.push('\n');
    }
    output
}

/// Prints verdicts to a writer, coloured by the global `colored` setting.
pub struct TerminalReporter<W: Write> {
    out: W,
    show_reason: bool,
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W, show_reason: bool) -> Self {
        Self { out, show_reason }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TerminalReporter<W> {
    fn report(&mut self, verdict: Verdict, reason: Option<&str>) {
        let reason = if self.show_reason { reason } else { None };
        if let Err(e) = writeln!(self.out, "{}", format_verdict(verdict, reason)) {
            tracing::warn!("failed to write verdict: {}", e);
        }
    }
}
