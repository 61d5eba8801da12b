//! Domain-specific types for repository snapshots.
//!
//! This module provides newtype wrappers for Git-related strings, improving
//! type safety and making APIs more self-documenting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A Git commit SHA identifier.
///
/// This newtype wrapper provides type safety for commit SHA strings,
/// preventing accidental misuse of unrelated string values. Serializes
/// transparently as a plain string in the pipeline protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitSha(String);

impl CommitSha {
    /// Creates a new `CommitSha` from a string.
    #[must_use]
    pub const fn new(sha: String) -> Self {
        Self(sha)
    }

    /// Returns the SHA as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CommitSha {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for CommitSha {
    fn from(s: &str) -> Self {
        Self::new(s.to_owned())
    }
}

impl AsRef<str> for CommitSha {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A remote-tracking branch together with its tip commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBranch {
    /// Full remote-tracking name as reported by the snapshot
    /// (e.g. `origin/feature-x`).
    pub name: String,
    /// Commit SHA the branch currently points at.
    pub tip: CommitSha,
}

impl RemoteBranch {
    /// Creates a new remote branch entry.
    #[must_use]
    pub const fn new(name: String, tip: CommitSha) -> Self {
        Self { name, tip }
    }

    /// Returns the branch name with the leading remote component stripped
    /// (`origin/feature-x` → `feature-x`).
    ///
    /// Hosted APIs report source branches without the remote prefix, so
    /// attribution results must be normalized the same way before they are
    /// compared or surfaced.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name
            .split_once('/')
            .map_or(self.name.as_str(), |(_, rest)| rest)
    }
}
