//! `wxstation` - decode, aggregate, and archive 433 MHz weather telemetry
//!
//! This library validates and decodes framed Oregon Scientific v2.1 sensor
//! packets, folds decoded readings into one coherent weather snapshot with
//! derived quantities (dew point, windchill, sea-level pressure), and
//! persists snapshots through a single-writer archive queue.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod radio;
pub mod report;
pub mod snapshot;
pub mod station;
pub mod units;

pub use aggregate::decode_stream;
pub use archive::{ArchiveCommand, ArchiveQueue, ArchiveRow, Store};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use protocol::{DecodedPacket, RawPacket, SensorFamily};
pub use report::generate_report;
pub use snapshot::WeatherSnapshot;
pub use station::{SharedState, Station, Trigger};
