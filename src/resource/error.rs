//! Top-level error type for the pipeline commands.

use thiserror::Error;

use crate::bitbucket::ApiError;
use crate::repo::SnapshotError;

/// Errors that abort a check, in, or out invocation.
///
/// Each variant is wrapped with the producing operation so failures remain
/// causally traceable from the single stderr line the orchestrator shows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResourceError {
    /// Required configuration is missing or malformed. Raised pre-flight,
    /// before any network or filesystem work.
    #[error("invalid configuration: {message}")]
    Validation {
        /// What was missing or malformed.
        message: String,
    },

    /// The hosted API rejected or failed a request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A git operation on the snapshot failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// A filesystem operation failed.
    #[error("{operation}: {message}")]
    Io {
        /// The operation that failed.
        operation: String,
        /// Error detail from the underlying I/O layer.
        message: String,
    },

    /// The persisted version file did not contain valid JSON.
    #[error("decoding version file {path} failed: {message}")]
    StorageDecode {
        /// Location of the unreadable file.
        path: String,
        /// Parser error detail.
        message: String,
    },

    /// The request on stdin did not contain valid JSON.
    #[error("decoding request failed: {message}")]
    Protocol {
        /// Parser error detail.
        message: String,
    },
}
