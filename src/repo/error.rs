//! Error types for repository snapshot operations.

use thiserror::Error;

/// Errors that may occur while cloning, resolving, or walking a snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// Cloning the remote repository failed. Always fatal to the invocation.
    #[error("cloning {url} failed: {message}")]
    Clone {
        /// Remote URL the clone was attempted against.
        url: String,
        /// Error detail from the git layer.
        message: String,
    },

    /// A ref could not be parsed or does not resolve to a commit.
    ///
    /// Fatal when resolving the single explicit target of a materialize
    /// step; logged and skipped when resolving one of many pull-request
    /// commits during check.
    #[error("ref '{reference}' not found: {message}")]
    RefNotFound {
        /// The ref text that failed to resolve.
        reference: String,
        /// Error detail from the git layer.
        message: String,
    },

    /// The snapshot has no working tree for the requested operation.
    #[error("snapshot at '{path}' has no working tree")]
    NoWorkTree {
        /// Filesystem location of the snapshot.
        path: String,
    },

    /// Any other git operation failed.
    #[error("git error: {message}")]
    Git {
        /// Error detail from the git2 library.
        message: String,
    },
}

impl From<git2::Error> for SnapshotError {
    fn from(error: git2::Error) -> Self {
        Self::Git {
            message: error.message().to_owned(),
        }
    }
}
