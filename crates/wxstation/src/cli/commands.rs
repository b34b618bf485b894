//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Run command arguments.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Capture file of framed packets (KIND PAYLOAD lines, blank line
    /// between polling cycles)
    pub capture: PathBuf,

    /// Process a single polling cycle and exit
    #[arg(short, long)]
    pub once: bool,

    /// Seconds to wait between polling cycles
    #[arg(short, long, default_value = "0")]
    pub interval: u64,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Report command arguments.
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Output the raw snapshot as JSON instead of a text report
    #[arg(short, long)]
    pub json: bool,

    /// Include the indoor section even if the config disables it
    #[arg(long)]
    pub indoor: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
