//! The polling orchestrator.
//!
//! One loop serves every deployment shape: a single cycle for cron-style
//! runs, a periodic timer for daemon-style runs, and [`Station::ingest`] as
//! the entry point for event-driven radio callbacks. The in-progress
//! observation lives in a [`SharedState`] that every task receives by
//! reference; each read-modify-write cycle happens under its lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::aggregate::decode_stream;
use crate::archive::{ArchiveCommand, ArchiveQueue, ArchiveRow};
use crate::error::Result;
use crate::protocol::RawPacket;
use crate::radio::PacketSource;
use crate::snapshot::WeatherSnapshot;

/// What drives the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Run a single cycle and stop.
    Once,
    /// Run a cycle every interval until stopped or the source runs dry.
    Every(Duration),
}

/// The current observation: a poll timestamp plus the snapshot built so far.
#[derive(Debug, Clone, Default, PartialEq)]
struct Observation {
    timestamp: Option<i64>,
    snapshot: WeatherSnapshot,
}

/// Lock a mutex, recovering the guard if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The in-progress observation shared between capture tasks.
///
/// At most one logical holder mutates it at a time; `update` keeps the lock
/// across the whole read-modify-write cycle.
#[derive(Debug, Default)]
pub struct SharedState {
    inner: Mutex<Observation>,
}

impl SharedState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one read-modify-write cycle under the lock.
    ///
    /// The closure receives the current snapshot and returns the updated
    /// one; the observation is stamped with the current time.
    pub fn update(&self, f: impl FnOnce(WeatherSnapshot) -> WeatherSnapshot) -> WeatherSnapshot {
        let mut observation = lock(&self.inner);
        let updated = f(observation.snapshot.clone());
        observation.timestamp = Some(Utc::now().timestamp());
        observation.snapshot = updated.clone();
        updated
    }

    /// Replace the observation wholesale (used when seeding from the
    /// archive).
    pub fn seed(&self, timestamp: i64, snapshot: WeatherSnapshot) {
        let mut observation = lock(&self.inner);
        observation.timestamp = Some(timestamp);
        observation.snapshot = snapshot;
    }

    /// Read the current observation.
    #[must_use]
    pub fn observation(&self) -> (Option<i64>, WeatherSnapshot) {
        let observation = lock(&self.inner);
        (observation.timestamp, observation.snapshot.clone())
    }
}

/// Ties the decoder pipeline, the shared state, and the archive together.
#[derive(Debug)]
pub struct Station {
    elevation_m: f64,
    state: SharedState,
    archive: Option<ArchiveQueue>,
}

impl Station {
    /// Create a station.
    ///
    /// `archive` is optional: without a store the station still decodes and
    /// accumulates state, it just never persists it.
    #[must_use]
    pub fn new(elevation_m: f64, archive: Option<ArchiveQueue>) -> Self {
        Self {
            elevation_m,
            state: SharedState::new(),
            archive,
        }
    }

    /// The shared observation state.
    #[must_use]
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// The archive queue, if the station has one.
    #[must_use]
    pub fn archive(&self) -> Option<&ArchiveQueue> {
        self.archive.as_ref()
    }

    /// Load the most recent archived row into the shared state.
    ///
    /// Returns whether a row was found.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive queue is closed.
    pub fn seed_from_archive(&self) -> Result<bool> {
        let Some(archive) = &self.archive else {
            return Ok(false);
        };
        let rows = archive.request(ArchiveCommand::Latest)?;
        match rows.into_iter().next() {
            Some(row) => {
                info!(timestamp = row.timestamp, "seeded state from archive");
                self.state.seed(row.timestamp, row.snapshot);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fold a packet batch into the shared state.
    ///
    /// This is the event-callback entry point; radio listeners call it
    /// directly as frames arrive. The whole cycle runs under the state
    /// lock and stamps a fresh observation time, even for a batch with no
    /// valid packets.
    pub fn ingest(&self, packets: &[RawPacket]) -> WeatherSnapshot {
        self.state
            .update(|prior| decode_stream(packets, self.elevation_m, Some(prior)))
    }

    /// Persist the current observation.
    ///
    /// Returns the archived timestamp, or `None` when the station has no
    /// archive or nothing has been observed yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive queue is closed.
    pub fn archive_current(&self) -> Result<Option<i64>> {
        let Some(archive) = &self.archive else {
            return Ok(None);
        };
        let (timestamp, snapshot) = self.state.observation();
        let Some(timestamp) = timestamp else {
            return Ok(None);
        };
        archive.request(ArchiveCommand::Insert(ArchiveRow {
            timestamp,
            snapshot,
        }))?;
        Ok(Some(timestamp))
    }

    /// Run the polling loop against a packet source.
    ///
    /// Each cycle polls one batch, folds it into the state, and archives
    /// the result unless the observation timestamp hasn't moved since the
    /// last write. With [`Trigger::Every`] the loop keeps cycling until
    /// `stop` is raised or the source reports exhaustion.
    ///
    /// # Errors
    ///
    /// Returns an error if the packet source fails. Archive trouble is
    /// logged and never aborts the loop.
    pub fn run<S: PacketSource + ?Sized>(
        &self,
        source: &mut S,
        trigger: Trigger,
        stop: &AtomicBool,
    ) -> Result<()> {
        let mut last_archived: Option<i64> = None;
        loop {
            let started = Instant::now();
            let packets = source.poll()?;
            debug!(
                source = source.name(),
                packets = packets.len(),
                "polled packet batch"
            );
            self.ingest(&packets);

            let (timestamp, _) = self.state.observation();
            if timestamp == last_archived {
                warn!("data timestamp has not changed since last poll, archiving skipped");
            } else {
                match self.archive_current() {
                    Ok(Some(archived)) => {
                        info!(timestamp = archived, "saved current state to archive");
                        last_archived = Some(archived);
                    }
                    Ok(None) => {}
                    Err(err) => warn!(%err, "failed to archive current state"),
                }
            }

            match trigger {
                Trigger::Once => break,
                Trigger::Every(interval) => {
                    if stop.load(Ordering::SeqCst) || source.exhausted() {
                        break;
                    }
                    let elapsed = started.elapsed();
                    if elapsed < interval {
                        std::thread::sleep(interval - elapsed);
                    }
                }
            }
        }
        Ok(())
    }
}
