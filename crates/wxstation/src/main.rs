//! `wxstn` - CLI for wxstation
//!
//! This binary drives the station pipeline over capture files and inspects
//! the archive it maintains.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::Context;
use chrono::{TimeZone, Utc};
use clap::Parser;
use tracing::warn;

use wxstation::archive::{ArchiveCommand, ArchiveQueue, Store};
use wxstation::cli::{Cli, Command, ConfigCommand, ReportCommand, RunCommand, StatusCommand};
use wxstation::radio::ReplaySource;
use wxstation::station::{Station, Trigger};
use wxstation::{generate_report, init_logging, Config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Run(run_cmd) => handle_run(&config, &run_cmd),
        Command::Status(StatusCommand { json }) => handle_status(&config, json),
        Command::Report(report_cmd) => handle_report(&config, &report_cmd),
        Command::Init => handle_init(&config),
        Command::Config(config_cmd) => handle_config(&config, &config_cmd),
    }
}

/// Open the configured archive, falling back to no persistence.
///
/// A missing archive is created when the config allows it; any other
/// failure leaves the station running with an in-memory snapshot only.
fn open_archive(config: &Config) -> Option<ArchiveQueue> {
    let path = config.database_path();
    match Store::open(&path) {
        Ok(store) => Some(ArchiveQueue::start(store)),
        Err(err) if err.is_archive_missing() && config.storage.create_missing => {
            match Store::create(&path) {
                Ok(store) => Some(ArchiveQueue::start(store)),
                Err(err) => {
                    warn!(%err, "could not create archive, running without persistence");
                    None
                }
            }
        }
        Err(err) => {
            warn!(%err, "could not open archive, running without persistence");
            None
        }
    }
}

fn handle_run(config: &Config, cmd: &RunCommand) -> anyhow::Result<()> {
    let mut source = ReplaySource::from_path(&cmd.capture)
        .with_context(|| format!("loading capture file {}", cmd.capture.display()))?;

    let station = Station::new(config.station.elevation, open_archive(config));
    if let Err(err) = station.seed_from_archive() {
        warn!(%err, "could not seed state from archive");
    }

    let trigger = if cmd.once {
        Trigger::Once
    } else {
        Trigger::Every(Duration::from_secs(cmd.interval))
    };
    station.run(&mut source, trigger, &AtomicBool::new(false))?;

    let (_, snapshot) = station.state().observation();
    print!(
        "{}",
        generate_report(&snapshot, config.report.include_indoor)
    );

    if let Some(archive) = station.archive() {
        archive.cancel();
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let path = config.database_path();
    let latest = match Store::open(&path) {
        Ok(store) => {
            let queue = ArchiveQueue::start(store);
            let rows = queue.request(ArchiveCommand::Latest)?;
            queue.cancel();
            Some(rows.into_iter().next())
        }
        Err(err) if err.is_archive_missing() => None,
        Err(err) => return Err(err.into()),
    };

    if json {
        let status = serde_json::json!({
            "database_path": path,
            "archive_exists": latest.is_some(),
            "latest": latest.flatten(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("wxstn status");
    println!("------------");
    println!("Archive:  {}", path.display());
    match latest {
        None => println!("Status:   not initialized (run `wxstn init`)"),
        Some(None) => println!("Status:   empty"),
        Some(Some(row)) => {
            println!("Status:   ok");
            println!("Latest:   {}", format_timestamp(row.timestamp));
        }
    }
    Ok(())
}

/// Render a unix timestamp for display.
fn format_timestamp(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map_or_else(|| timestamp.to_string(), |dt| dt.to_rfc3339())
}

fn handle_report(config: &Config, cmd: &ReportCommand) -> anyhow::Result<()> {
    let store = Store::open(config.database_path())?;
    let queue = ArchiveQueue::start(store);
    let rows = queue.request(ArchiveCommand::Latest)?;
    queue.cancel();

    let Some(row) = rows.into_iter().next() else {
        println!("No archived data.");
        return Ok(());
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&row)?);
    } else {
        let include_indoor = cmd.indoor || config.report.include_indoor;
        print!("{}", generate_report(&row.snapshot, include_indoor));
    }
    Ok(())
}

fn handle_init(config: &Config) -> anyhow::Result<()> {
    let path = config.database_path();
    Store::create(&path).with_context(|| format!("creating archive at {}", path.display()))?;
    println!("Archive ready at {}", path.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Station]");
                println!("  Elevation (m):      {}", config.station.elevation);
                println!("  Poll interval (s):  {}", config.station.poll_interval_secs);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Create missing:     {}", config.storage.create_missing);
                println!();
                println!("[Report]");
                println!("  Include indoor:     {}", config.report.include_indoor);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.clone().unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
