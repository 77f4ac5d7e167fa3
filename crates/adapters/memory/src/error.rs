//! Storage-specific error type for the in-memory stores.

use std::path::PathBuf;

use daily_tracker_domain::error::TrackerError;

/// Errors originating from the in-memory storage layer.
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    /// A thread panicked while holding the store's lock.
    #[error("{store} store lock poisoned")]
    Poisoned { store: &'static str },
    /// The backup file could not be read or written.
    #[error("failed to access backup {}", path.display())]
    BackupIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The backup file does not hold valid entries.
    #[error("invalid {store} backup")]
    BackupFormat {
        store: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<MemoryStoreError> for TrackerError {
    fn from(err: MemoryStoreError) -> Self {
        Self::Storage(Box::new(err))
    }
}
