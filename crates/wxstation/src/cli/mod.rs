//! Command-line interface for wxstation.
//!
//! This module provides the CLI structure and command handlers for the
//! `wxstn` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ReportCommand, RunCommand, StatusCommand};

/// wxstn - decode and archive 433 MHz weather sensor traffic
///
/// Validates and decodes framed Oregon Scientific v2.1 packets, folds them
/// into a single weather snapshot, and archives the snapshot after every
/// polling cycle.
#[derive(Debug, Parser)]
#[command(name = "wxstn")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the station pipeline over a capture file
    Run(RunCommand),

    /// Show archive status
    Status(StatusCommand),

    /// Print the current conditions from the latest archived snapshot
    Report(ReportCommand),

    /// Create the archive database
    Init,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
