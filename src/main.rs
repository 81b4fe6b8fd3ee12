//! dfa - build, validate and run deterministic finite automata
//!
//! Provides one-shot commands and an interactive REPL.

mod commands;
mod config;
mod reporter;
mod repl;
mod source;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::{ColorMode, Config};
use source::DefinitionArgs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dfa")]
#[command(about = "Build, validate and run deterministic finite automata")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, env = "DFA_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// When to colour verdicts
    #[arg(long, value_enum, global = true)]
    color: Option<ColorMode>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a definition and list every error and warning
    Check {
        #[command(flatten)]
        definition: DefinitionArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the automaton's parameters and transition function
    Show {
        #[command(flatten)]
        definition: DefinitionArgs,

        /// Print the raw definition as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate input strings (read from stdin, one per line, when none are given)
    Run {
        #[command(flatten)]
        definition: DefinitionArgs,

        /// Input strings
        inputs: Vec<String>,

        /// Split each input on whitespace into multi-character symbols
        #[arg(long)]
        tokens: bool,

        /// Print every step taken
        #[arg(long)]
        trace: bool,

        /// Print one JSON outcome per input
        #[arg(long)]
        json: bool,

        /// Exit with a failure status if any input is rejected
        #[arg(long)]
        strict: bool,
    },

    /// Start an interactive session against one automaton
    Repl {
        #[command(flatten)]
        definition: DefinitionArgs,
    },

    /// Print the effective configuration as YAML
    Config {
        /// Also write it to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(color) = cli.color {
        config.output.color = color;
    }
    config.output.color.apply();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => config.log.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Some(path) = &cli.config {
        tracing::debug!("loaded config from {}", path.display());
    }

    let result = match cli.command {
        Commands::Repl { definition } => repl::run(&definition, &config).map(|()| true),
        cmd => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            commands::execute(cmd, &config, &mut stdin.lock(), &mut stdout.lock())
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::FAILURE
        }
    }
}
