//! Error types for prefixsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use prefixsync_core::PrefixError;
use prefixsync_host::HostError;

/// All errors that can abort a synchronization run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Address query or tool lookup failed.
    #[error(transparent)]
    Host(#[from] HostError),

    /// No usable address, or prefix arithmetic failed.
    #[error(transparent)]
    Prefix(#[from] PrefixError),

    /// The daemon configuration file does not exist.
    #[error("daemon configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// The daemon configuration could not be used as-is.
    #[error("invalid daemon configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error on the write path.
    #[error("daemon configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::ConfigInvalid`].
pub(crate) fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> SyncError {
    SyncError::ConfigInvalid {
        path: path.into(),
        reason: reason.into(),
    }
}
