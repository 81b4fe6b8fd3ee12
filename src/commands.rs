//! Command execution.

use crate::config::Config;
use crate::reporter::{format_trace, TerminalReporter};
use crate::Commands;
use colored::Colorize;
use dfa_core::{Automaton, Reporter, RunOutcome};
use serde_json::{json, Value};
use std::io::{BufRead, Write};

/// Executes a one-shot command, writing its output to `out`.
///
/// Returns `Ok(false)` when the command ran but the result should fail the
/// process (invalid definition, or a rejected input under `--strict`).
pub fn execute(
    cmd: Commands,
    config: &Config,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<bool, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Repl { .. } => unreachable!(),

        Commands::Check { definition, json } => {
            let raw = definition.load()?;
            let validation = Automaton::validate(&raw);

            if json {
                let report = json!({
                    "valid": validation.is_valid(),
                    "errors": validation.errors.iter().map(|e| json!({
                        "code": e.error_code(),
                        "message": e.to_string(),
                    })).collect::<Vec<_>>(),
                    "warnings": validation.warnings.iter().map(|w| json!({
                        "code": w.warning_code(),
                        "message": w.to_string(),
                    })).collect::<Vec<_>>(),
                });
                writeln!(out, "{}", format_json(&report))?;
                return Ok(validation.is_valid());
            }

            for error in &validation.errors {
                writeln!(out, "{}[{}]: {}", "error".red(), error.error_code(), error)?;
            }
            for warning in &validation.warnings {
                writeln!(
                    out,
                    "{}[{}]: {}",
                    "warning".yellow(),
                    warning.warning_code(),
                    warning
                )?;
            }

            if validation.is_valid() {
                writeln!(out, "{}", "Definition is valid".green())?;
            } else {
                writeln!(
                    out,
                    "{}",
                    format!("{} error(s) found", validation.errors.len()).red()
                )?;
            }
            Ok(validation.is_valid())
        }

        Commands::Show { definition, json } => {
            let automaton = Automaton::from_raw(definition.load()?)?;
            if json {
                writeln!(out, "{}", format_json(&automaton.to_json()?))?;
            } else {
                writeln!(out, "{}", automaton)?;
            }
            Ok(true)
        }

        Commands::Run {
            definition,
            inputs,
            tokens,
            trace,
            json,
            strict,
        } => {
            let automaton = Automaton::from_raw(definition.load()?)?;

            let inputs = if inputs.is_empty() {
                input.lines().collect::<Result<Vec<_>, _>>()?
            } else {
                inputs
            };

            let mut accepted = 0;
            for line in &inputs {
                let outcome = evaluate_line(&automaton, line, tokens);
                if outcome.is_accepted() {
                    accepted += 1;
                }

                if json {
                    let mut record = json!({ "input": line, "outcome": outcome });
                    if trace && !tokens {
                        record["trace"] = serde_json::to_value(automaton.trace(line).steps)?;
                    }
                    writeln!(out, "{}", record)?;
                    continue;
                }

                write!(out, "{:?} ", line)?;
                let mut reporter = TerminalReporter::new(&mut *out, config.output.show_reason);
                let reason = outcome.reason();
                reporter.report(outcome.verdict, reason.as_deref());
                if trace && !tokens {
                    write!(out, "{}", format_trace(&automaton.trace(line)))?;
                }
            }

            tracing::debug!(total = inputs.len(), accepted, "run complete");
            Ok(!strict || accepted == inputs.len())
        }

        Commands::Config { save } => {
            if let Some(path) = save {
                config.save(&path)?;
                tracing::info!("saved config to {}", path.display());
            }
            write!(out, "{}", serde_yaml::to_string(config)?)?;
            Ok(true)
        }
    }
}

fn evaluate_line(automaton: &Automaton, line: &str, tokens: bool) -> RunOutcome {
    if tokens {
        automaton.evaluate_symbols(line.split_whitespace())
    } else {
        automaton.evaluate(line)
    }
}

fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
