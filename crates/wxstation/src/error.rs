//! Error types for wxstation.
//!
//! This module defines all error types used throughout the wxstation crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for wxstation operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Archive Errors ===
    /// Failed to open or create the archive database.
    #[error("failed to open archive at {path}: {source}")]
    ArchiveOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// The archive database does not exist.
    #[error("archive database not found at {path}")]
    ArchiveMissing {
        /// Path that was expected to hold the database.
        path: PathBuf,
    },

    /// An archive query failed.
    #[error("archive query failed: {0}")]
    ArchiveQuery(#[from] rusqlite::Error),

    /// Failed to run archive schema migrations.
    #[error("archive migration failed: {message}")]
    ArchiveMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Queue Errors ===
    /// The archive queue has been shut down.
    #[error("archive queue is closed")]
    QueueClosed,

    /// No pending request matches the given correlation id.
    #[error("no pending request with correlation id {id}")]
    UnknownRequest {
        /// The correlation id that failed to resolve.
        id: u64,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Capture Errors ===
    /// A capture file could not be read or parsed.
    #[error("bad capture file {path}: {message}")]
    CaptureFile {
        /// Path to the capture file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for wxstation operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a capture file error.
    #[must_use]
    pub fn capture_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CaptureFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error indicates the archive database is missing.
    #[must_use]
    pub fn is_archive_missing(&self) -> bool {
        matches!(self, Self::ArchiveMissing { .. })
    }

    /// Check if this error indicates the archive queue is closed.
    #[must_use]
    pub fn is_queue_closed(&self) -> bool {
        matches!(self, Self::QueueClosed)
    }
}
