//! Interactive REPL.

use crate::config::Config;
use crate::reporter::{format_outcome, format_trace};
use crate::source::DefinitionArgs;
use colored::Colorize;
use dfa_core::Automaton;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config as EditorConfig, Editor};

const HELP_TEXT: &str = r#"
Any line that is not a command is evaluated as an input string.

Available commands:
  :help                 Show this help
  :show                 Print the automaton
  :warnings             List construction warnings
  :empty                Evaluate the empty string
  :trace <input>        Evaluate and print every step
  :tokens <s1> <s2> ..  Evaluate whitespace-separated symbols

  :quit, :exit          Exit the REPL
"#;

pub fn run(definition: &DefinitionArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let automaton = Automaton::from_raw(definition.load()?)?;

    println!("{}", "dfa REPL".bold().cyan());
    println!(
        "{} states, {} symbols, {} transitions",
        automaton.states().len(),
        automaton.alphabet().len(),
        automaton.transitions().len()
    );

    // Create readline editor
    let editor_config = EditorConfig::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(editor_config)?;

    let history_path = config.repl.history_path();
    let _ = rl.load_history(&history_path);

    println!("Type ':help' for available commands.\n");

    loop {
        let prompt = format!("{} ", config.repl.prompt.cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                match execute_repl_command(&automaton, &line, config.output.show_reason) {
                    Some(output) => println!("{}\n", output),
                    None => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        tracing::debug!("failed to save history to {}: {}", history_path.display(), e);
    }

    Ok(())
}

/// Runs one REPL line. Returns `None` when the session should end.
fn execute_repl_command(automaton: &Automaton, line: &str, show_reason: bool) -> Option<String> {
    let Some(command) = line.strip_prefix(':') else {
        return Some(format_outcome(&automaton.evaluate(line), show_reason));
    };

    let (cmd, rest) = command
        .split_once(char::is_whitespace)
        .unwrap_or((command, ""));

    match cmd.to_lowercase().as_str() {
        "help" | "?" => Some(HELP_TEXT.to_string()),

        "quit" | "exit" | "q" => None,

        "show" => Some(automaton.to_string()),

        "warnings" => {
            if automaton.warnings().is_empty() {
                return Some("No warnings".green().to_string());
            }
            let lines: Vec<String> = automaton
                .warnings()
                .iter()
                .map(|w| format!("  {}[{}]: {}", "warning".yellow(), w.warning_code(), w))
                .collect();
            Some(lines.join("\n"))
        }

        "empty" => Some(format_outcome(&automaton.evaluate(""), show_reason)),

        "trace" | "t" => {
            let trace = automaton.trace(rest);
            Some(format!(
                "{}{}",
                format_trace(&trace),
                format_outcome(&trace.outcome, show_reason)
            ))
        }

        "tokens" => {
            let outcome = automaton.evaluate_symbols(rest.split_whitespace());
            Some(format_outcome(&outcome, show_reason))
        }

        _ => Some(format!("Unknown command: {}. Type ':help' for help.", cmd)),
    }
}
