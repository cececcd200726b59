//! Command-line interface for twenty_questions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use twenty_questions::PlayerKind;

/// Twenty Questions - two-player guessing game with LLM players
#[derive(Parser, Debug)]
#[command(name = "twenty_questions")]
#[command(about = "Twenty Questions between humans and LLM players", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (optional)
    #[arg(short, long, global = true, default_value = "twenty_questions.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the REST game server
    Serve {
        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Play one game in this terminal
    Play {
        /// Who sets and answers: human or llm
        #[arg(long, default_value = "llm")]
        first: PlayerKind,

        /// Who asks and guesses: human or llm
        #[arg(long, default_value = "human")]
        second: PlayerKind,
    },
}
