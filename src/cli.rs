//! Command-line interface for noir_detective.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use noir_detective::Language;

/// Noir Detective - interrogate AI suspects and name the killer
#[derive(Parser, Debug)]
#[command(name = "noir_detective")]
#[command(about = "A noir murder mystery played against an LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal
    Play {
        /// Path to the game config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Language of cases, dialogue and UI text (overrides the config)
        #[arg(short, long, value_enum)]
        language: Option<Language>,
    },

    /// Generate one case and print it as JSON
    Generate {
        /// Path to the game config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Language of the generated case (overrides the config)
        #[arg(short, long, value_enum)]
        language: Option<Language>,
    },
}
