//! Concurrency-safe weather archive.
//!
//! All reads and writes to the persistent store funnel through exactly one
//! worker thread; no other code ever touches the store handle. Callers
//! submit a command, receive a correlation id, and block on `await_result`
//! until that specific response is produced. Each request carries its own
//! one-shot completion channel, so responses can never be delivered to the
//! wrong waiter and no caller ever scans a shared response queue.

pub mod migrations;
pub mod schema;
pub mod store;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::snapshot::WeatherSnapshot;

pub use store::Store;

/// An immutable persisted (timestamp, snapshot) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRow {
    /// Unix timestamp of the observation, in seconds.
    pub timestamp: i64,
    /// The snapshot at that time.
    pub snapshot: WeatherSnapshot,
}

/// A command executed by the archive worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveCommand {
    /// Insert a row; responds with the inserted row.
    Insert(ArchiveRow),
    /// Fetch the most recent row.
    Latest,
    /// Fetch the oldest row at or after the given unix timestamp.
    FirstSince(i64),
    /// Fetch the first row of the current calendar year.
    StartOfYear,
}

/// Token pairing an archive request with its eventual response.
pub type CorrelationId = u64;

/// One queued request: command plus the completion channel for its response.
struct Request {
    id: CorrelationId,
    command: ArchiveCommand,
    reply: oneshot::Sender<Vec<ArchiveRow>>,
}

/// Lock a mutex, recovering the guard if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single-worker, multi-submitter serializer guarding the persistent store.
///
/// `start` spawns the worker bound to one [`Store`]; `cancel` signals
/// shutdown, lets the worker drain every already-queued request, then joins
/// it and releases the store. Submissions after shutdown fail with
/// [`Error::QueueClosed`] instead of hanging.
#[derive(Debug)]
pub struct ArchiveQueue {
    tx: Mutex<Option<mpsc::UnboundedSender<Request>>>,
    pending: Mutex<HashMap<CorrelationId, oneshot::Receiver<Vec<ArchiveRow>>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ArchiveQueue {
    /// Spawn the archive worker bound to the given store.
    #[must_use]
    pub fn start(store: Store) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = thread::spawn(move || worker_loop(store, rx));
        Self {
            tx: Mutex::new(Some(tx)),
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue a command and return its correlation id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] if shutdown has been signaled.
    pub fn submit(&self, command: ArchiveCommand) -> Result<CorrelationId> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::QueueClosed);
        }
        let guard = lock(&self.tx);
        let Some(tx) = guard.as_ref() else {
            return Err(Error::QueueClosed);
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (reply_tx, reply_rx) = oneshot::channel();
        lock(&self.pending).insert(id, reply_rx);

        if tx
            .send(Request {
                id,
                command,
                reply: reply_tx,
            })
            .is_err()
        {
            lock(&self.pending).remove(&id);
            return Err(Error::QueueClosed);
        }
        Ok(id)
    }

    /// Block the calling thread until the response for `id` is produced.
    ///
    /// Each correlation id resolves exactly once; asking a second time (or
    /// asking for an id this queue never issued) fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRequest`] for a foreign or already-consumed
    /// id, or [`Error::QueueClosed`] if the worker went away before
    /// responding.
    pub fn await_result(&self, id: CorrelationId) -> Result<Vec<ArchiveRow>> {
        let receiver = lock(&self.pending)
            .remove(&id)
            .ok_or(Error::UnknownRequest { id })?;
        receiver.blocking_recv().map_err(|_| Error::QueueClosed)
    }

    /// Submit a command and wait for its response.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::submit`] and [`Self::await_result`].
    pub fn request(&self, command: ArchiveCommand) -> Result<Vec<ArchiveRow>> {
        let id = self.submit(command)?;
        self.await_result(id)
    }

    /// Signal shutdown, drain already-queued requests, and release the
    /// store handle.
    pub fn cancel(&self) {
        self.closed.store(true, Ordering::SeqCst);
        // Dropping the sender closes the channel; the worker drains what is
        // already queued and exits.
        lock(&self.tx).take();
        if let Some(handle) = lock(&self.worker).take() {
            if handle.join().is_err() {
                error!("archive worker panicked");
            }
        }
    }

    /// Check whether shutdown has been signaled.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for ArchiveQueue {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The worker: dequeue one request at a time, execute it, publish the
/// result. An execution failure is logged and resolves that one request as
/// empty; the worker keeps going.
fn worker_loop(store: Store, mut rx: mpsc::UnboundedReceiver<Request>) {
    info!("archive worker started");
    while let Some(request) = rx.blocking_recv() {
        let rows = match execute(&store, &request.command) {
            Ok(rows) => rows,
            Err(err) => {
                error!(id = request.id, %err, "archive command failed");
                Vec::new()
            }
        };
        debug!(id = request.id, rows = rows.len(), "archive command done");
        // The caller may have given up on the response; that's fine.
        let _ = request.reply.send(rows);
    }
    info!("archive worker stopped");
}

fn execute(store: &Store, command: &ArchiveCommand) -> Result<Vec<ArchiveRow>> {
    match command {
        ArchiveCommand::Insert(row) => {
            store.insert(row)?;
            Ok(vec![row.clone()])
        }
        ArchiveCommand::Latest => Ok(store.latest()?.into_iter().collect()),
        ArchiveCommand::FirstSince(since) => Ok(store.first_since(*since)?.into_iter().collect()),
        ArchiveCommand::StartOfYear => Ok(store
            .start_of_year(Utc::now().timestamp())?
            .into_iter()
            .collect()),
    }
}
