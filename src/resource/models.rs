//! Pipeline protocol models.
//!
//! One JSON object arrives on stdin per invocation and one response leaves
//! on stdout. Version fields are string-valued by protocol convention, and
//! the canonical version schema keeps every field optional except the
//! commit hash (earlier revisions of the source system disagreed on the
//! decoration fields; the commit is the only identity).

use serde::{Deserialize, Serialize};

use crate::bitbucket::PullRequest;
use crate::repo::CommitSha;

use super::error::ResourceError;

/// Resource configuration shared by every step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Source {
    /// Workspace (account) the repository lives in.
    pub workspace: String,
    /// Repository slug within the workspace.
    pub slug: String,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password or app-specific token.
    pub password: String,
    /// Enables debug-level logging on stderr.
    #[serde(default)]
    pub debug: bool,
}

impl Source {
    /// Validates required fields before any network or filesystem work.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] naming the first missing field.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let missing = [
            ("workspace", &self.workspace),
            ("slug", &self.slug),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty());

        match missing {
            Some((field, _)) => Err(ResourceError::Validation {
                message: format!("source: {field} is empty"),
            }),
            None => Ok(()),
        }
    }
}

/// A version presented to the pipeline scheduler.
///
/// Identity is the commit hash alone; `id`, `branch`, and `title` are
/// decoration for display and never participate in cursor matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Head commit hash the version stands for.
    pub commit: CommitSha,
    /// Pull-request identifier, stringly typed per protocol convention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Source branch name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Pull-request title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Version {
    /// Creates a bare version carrying only a commit hash.
    #[must_use]
    pub const fn new(commit: CommitSha) -> Self {
        Self {
            commit,
            id: None,
            branch: None,
            title: None,
        }
    }

    /// Builds the candidate version for a pull request whose source commit
    /// resolved to `sha`.
    #[must_use]
    pub fn for_pull_request(pull: &PullRequest, sha: &CommitSha) -> Self {
        Self {
            commit: sha.clone(),
            id: Some(pull.id.to_string()),
            branch: Some(pull.source_branch.clone()),
            title: Some(pull.title.clone()),
        }
    }

    /// Prefix-tolerant identity test: does this version's commit match
    /// `reference`?
    ///
    /// Schedulers may persist abbreviated hashes, so a non-empty prefix of
    /// the full hash counts as a match.
    #[must_use]
    pub fn matches_commit(&self, reference: &str) -> bool {
        !reference.is_empty() && self.commit.as_str().starts_with(reference)
    }

    /// Validates that the version carries a commit hash.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when the commit is empty.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.commit.as_str().is_empty() {
            return Err(ResourceError::Validation {
                message: "version: commit is empty".to_owned(),
            });
        }
        Ok(())
    }
}

/// A single name/value pair of metadata shown by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataField {
    /// Field name.
    pub name: String,
    /// Field value.
    pub value: String,
}

impl MetadataField {
    /// Creates a metadata field.
    #[must_use]
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_owned(),
            value: value.into(),
        }
    }
}

/// Input for the check step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckRequest {
    /// Resource configuration.
    pub source: Source,
    /// The scheduler's previous cursor, absent on the first poll.
    #[serde(default)]
    pub version: Option<Version>,
}

/// Input for the in step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InRequest {
    /// Resource configuration.
    pub source: Source,
    /// The version chosen by the scheduler.
    pub version: Version,
}

/// Output of the in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InResponse {
    /// The materialized version, echoed verbatim.
    pub version: Version,
    /// Informational metadata about the materialized commit.
    pub metadata: Vec<MetadataField>,
}

/// Params of the out step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutParams {
    /// Directory (relative to the step input) holding the materialized tree.
    pub repo_path: String,
    /// Build outcome to report; one of SUCCESSFUL, FAILED, INPROGRESS,
    /// STOPPED (case-insensitive).
    pub status: String,
    /// Stable key identifying the reporting build system. Defaults to
    /// `build`.
    #[serde(default)]
    pub key: Option<String>,
    /// Human-readable build name.
    #[serde(default)]
    pub name: Option<String>,
    /// Longer description shown alongside the status.
    #[serde(default)]
    pub description: Option<String>,
    /// Link back to the build.
    #[serde(default)]
    pub url: Option<String>,
    /// Overrides the default `<repo_path>/.version.json` location of the
    /// persisted version file, relative to the step input.
    #[serde(default)]
    pub version_path: Option<String>,
}

impl OutParams {
    /// Validates required params.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when `repo_path` or `status`
    /// is empty.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.repo_path.is_empty() {
            return Err(ResourceError::Validation {
                message: "params: repo_path is empty".to_owned(),
            });
        }
        if self.status.is_empty() {
            return Err(ResourceError::Validation {
                message: "params: status is empty".to_owned(),
            });
        }
        Ok(())
    }
}

/// Input for the out step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutRequest {
    /// Resource configuration.
    pub source: Source,
    /// Invocation params.
    pub params: OutParams,
}

/// Output of the out step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutResponse {
    /// The version the status was reported for.
    pub version: Version,
    /// Informational metadata about the report.
    pub metadata: Vec<MetadataField>,
}
