//! Command-line interface for skillfive.

use clap::{Parser, Subcommand};
use skillfive::Difficulty;

/// Skillfive - five-in-a-row with skills, an AI opponent and live rooms
#[derive(Parser, Debug)]
#[command(name = "skillfive")]
#[command(about = "Real-time five-in-a-row server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// SQLite database path (overrides the config file)
        #[arg(long)]
        database: Option<String>,
    },

    /// Play the AI against itself and print the final board
    Selfplay {
        /// Strength of both sides
        #[arg(short, long, default_value = "medium")]
        difficulty: Difficulty,

        /// Seed for a reproducible game
        #[arg(long)]
        seed: Option<u64>,
    },
}
