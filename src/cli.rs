use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stickerforge")]
#[command(author, version, about = "Chat-triggered sticker maker")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one `!sticker` request against local files
    Make {
        /// File treated as media attached to the command message
        #[arg(long)]
        attach: Option<PathBuf>,

        /// File treated as media on the quoted message
        #[arg(long)]
        quote: Option<PathBuf>,

        /// Directory the sticker is written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Command text after `!sticker`: caption, options, and an optional image link
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tail: Vec<String>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Remove stale scratch files
    Sweep,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
