//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use polytris::store::config::DEFAULT_CONFIG_FILE;

/// Falling-block game with pieces from four to seven cells.
#[derive(Parser, Debug)]
#[command(name = "polytris")]
#[command(about = "Terminal falling-block game with tetromino to heptomino pieces", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (created with defaults when missing)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Subcommand to run (defaults to `play`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a new game
    Play {
        /// Player name (overrides the config)
        #[arg(short, long)]
        player: Option<String>,

        /// Piece size from 4 to 7 (overrides the config)
        #[arg(long)]
        piece_size: Option<u8>,

        /// Field width in cells (overrides the config)
        #[arg(long)]
        width: Option<usize>,

        /// Field height in cells (overrides the config)
        #[arg(long)]
        height: Option<usize>,
    },

    /// Resume a saved game
    Load {
        /// Save file name as shown by `saves`
        file: String,
    },

    /// List saved games, newest first
    Saves,

    /// Delete a saved game
    Delete {
        /// Save file name as shown by `saves`
        file: String,
    },

    /// Show the leaderboard for a field and piece size
    Leaders {
        /// Piece size (defaults to the config)
        #[arg(long)]
        piece_size: Option<u8>,

        /// Field width (defaults to the config)
        #[arg(long)]
        width: Option<usize>,

        /// Field height (defaults to the config)
        #[arg(long)]
        height: Option<usize>,
    },
}
