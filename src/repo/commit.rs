//! Value object describing a resolved commit.

use chrono::{DateTime, Utc};

use super::types::CommitSha;

/// Details of a commit resolved inside a snapshot.
///
/// Owned by the snapshot that produced it and immutable once resolved. The
/// timestamp is the committer time, which is the ordering input for the
/// version resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetails {
    /// Full 40-hex commit SHA.
    pub sha: CommitSha,
    /// Author display name.
    pub author: String,
    /// Committer timestamp.
    pub committed_at: DateTime<Utc>,
    /// Full commit message.
    pub message: String,
}

impl CommitDetails {
    /// Creates new commit details.
    #[must_use]
    pub const fn new(
        sha: CommitSha,
        author: String,
        committed_at: DateTime<Utc>,
        message: String,
    ) -> Self {
        Self {
            sha,
            author,
            committed_at,
            message,
        }
    }

    /// Returns the first line of the commit message.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}
