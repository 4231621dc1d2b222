//! CLI command definitions for the `parley` binary.

pub mod ask;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Ask a hosted assistant and get back a clean, rewritten answer.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, env = "PARLEY_CONFIG", default_value = "parley.toml")]
    pub config: PathBuf,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the assistant one question on a fresh thread.
    Ask {
        /// The question to ask.
        question: String,

        /// Run-level instructions overriding the assistant's own.
        #[arg(long)]
        instructions: Option<String>,
    },

    /// Start the HTTP server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_parses_question_and_instructions() {
        let cli = Cli::parse_from([
            "parley",
            "--json",
            "ask",
            "What is the total custodial assets?",
            "--instructions",
            "answer briefly",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Ask {
                question,
                instructions,
            } => {
                assert_eq!(question, "What is the total custodial assets?");
                assert_eq!(instructions.as_deref(), Some("answer briefly"));
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::parse_from(["parley", "serve"]);
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, 3000);
                assert_eq!(host, "127.0.0.1");
            }
            _ => panic!("expected serve command"),
        }
    }
}
