//! Error types for the watch pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or running the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error while setting up the notification channel.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Registering the directory watch failed.
    #[error("Failed to watch '{}': {source}", path.display())]
    Watch {
        /// Directory that could not be watched.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A notification entry claims more bytes than the read delivered.
    #[error("Corrupt notification stream: entry spans {declared} bytes but only {available} remain")]
    Corruption {
        /// Bytes the entry header declares (header plus name).
        declared: usize,
        /// Bytes left in the current read.
        available: usize,
    },

    /// The work queue has been closed.
    #[error("Work queue is closed")]
    QueueClosed,

    /// A worker thread could not be started.
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
