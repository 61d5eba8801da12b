//! Commit build-status types for the report step.

use serde::{Deserialize, Serialize};

/// Build outcome reported against a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildStatus {
    /// The build finished successfully.
    Successful,
    /// The build failed.
    Failed,
    /// The build is still running.
    InProgress,
    /// The build was stopped before completion.
    Stopped,
}

impl BuildStatus {
    /// Parses a status name as it appears in pipeline params.
    ///
    /// Matching is case-insensitive; returns `None` for anything outside
    /// the four recognised states.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_uppercase().as_str() {
            "SUCCESSFUL" => Some(Self::Successful),
            "FAILED" => Some(Self::Failed),
            "INPROGRESS" => Some(Self::InProgress),
            "STOPPED" => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Returns the wire form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Successful => "SUCCESSFUL",
            Self::Failed => "FAILED",
            Self::InProgress => "INPROGRESS",
            Self::Stopped => "STOPPED",
        }
    }
}

/// Body of a commit build-status POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildStatusUpdate {
    /// Stable key identifying the reporting build system.
    pub key: String,
    /// Build outcome.
    pub state: BuildStatus,
    /// Human-readable build name.
    pub name: String,
    /// Longer description shown alongside the status.
    pub description: String,
    /// Link back to the build.
    pub url: String,
}
