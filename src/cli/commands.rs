//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Teamtailor source CLI
#[derive(Parser, Debug)]
#[command(name = "source-teamtailor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connector definition: a built-in name or a YAML file (default: teamtailor)
    #[arg(short, long, global = true)]
    pub connector: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON, takes precedence over --config
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON), updated in place at every checkpoint
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show connector specification
    Spec,

    /// Test connection to the API
    Check,

    /// Discover available streams
    Discover {
        /// Sample records to infer schema (0 = no sampling, open schema)
        #[arg(long, default_value = "0")]
        sample: usize,
    },

    /// Read data from streams
    Read {
        /// Streams to sync (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,

        /// Configured catalog file (JSON); defaults to every stream in its best mode
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// List available stream names (lightweight, no schemas)
    Streams,

    /// Validate connector definition
    Validate,

    /// List built-in connectors
    List,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

impl Commands {
    /// Stream names selected with `--streams`, if any
    pub fn stream_filter(&self) -> Option<Vec<&str>> {
        match self {
            Commands::Read {
                streams: Some(streams),
                ..
            } => {
                let names: Vec<&str> = streams
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
                (!names.is_empty()).then_some(names)
            }
            _ => None,
        }
    }
}
