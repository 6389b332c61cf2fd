//! CLI argument definitions using clap derive

use crate::search::SearchDepth;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// whatexec - locate executables
///
/// Resolves names through PATH like `which`/`where`, validates every
/// candidate by its binary header, and falls back to searching every
/// local drive when PATH has no match.
#[derive(Parser, Debug)]
#[command(name = "whatexec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "WHATEXEC_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve names through PATH, then the filesystem
    Find(FindArgs),

    /// Search drives or one directory, skipping PATH
    Search(SearchArgs),

    /// List every executable below a directory
    List(ListArgs),

    /// Show the parsed PATH entries and executable extensions
    Path(PathArgs),

    /// Show the drives a fallback search would walk
    Drives(DrivesArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by commands that walk the filesystem
#[derive(clap::Args, Debug, Clone)]
pub struct WalkArgs {
    /// How deep to search: top, all, or a number of levels
    #[arg(long, value_parser = parse_depth)]
    pub depth: Option<SearchDepth>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Also accept #! scripts as executables
    #[arg(long)]
    pub scripts: bool,
}

/// Arguments for the find command
#[derive(Parser, Debug)]
pub struct FindArgs {
    /// Executable names or paths
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Report every instance instead of the best match
    #[arg(short, long)]
    pub all: bool,

    /// Maximum paths per name with --all
    #[arg(short = 'n', long, requires = "all")]
    pub limit: Option<usize>,

    /// Only consult PATH, never walk drives
    #[arg(long)]
    pub no_fallback: bool,

    /// Read PATH fresh instead of using the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Ask whether to continue after access-denied errors
    #[arg(short, long)]
    pub interactive: bool,

    #[command(flatten)]
    pub walk: WalkArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the search command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Executable names
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Search this directory instead of every drive
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Report every instance instead of the best match
    #[arg(short, long)]
    pub all: bool,

    #[command(flatten)]
    pub walk: WalkArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Directory to list
    pub dir: PathBuf,

    #[command(flatten)]
    pub walk: WalkArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the path command
#[derive(Parser, Debug)]
pub struct PathArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the drives command
#[derive(Parser, Debug)]
pub struct DrivesArgs {
    /// Include drives the search would skip
    #[arg(short, long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}

/// Output format for result listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

fn parse_depth(s: &str) -> Result<SearchDepth, String> {
    s.parse().map_err(|e: crate::error::WhatExecError| e.to_string())
}
