//! Data models for pull requests returned by the Bitbucket API.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into public domain types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::repo::CommitSha;

/// Lifecycle state of a pull request.
///
/// Distinct from the state of any single commit or its CI build flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestState {
    /// The pull request is open.
    Open,
    /// The pull request has been merged.
    Merged,
    /// The pull request was superseded by another one.
    Superseded,
    /// The pull request was declined.
    Declined,
}

impl PullRequestState {
    /// Returns true for pull requests still awaiting a decision.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// An immutable snapshot of a pull request as reported by the API.
///
/// Identity is the numeric `id`; every other field reflects the hosted
/// repository's view at fetch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request identifier.
    pub id: u64,
    /// Title of the pull request.
    pub title: String,
    /// Lifecycle state.
    pub state: PullRequestState,
    /// Author display name.
    pub author: String,
    /// Head commit of the source branch.
    pub source_commit: CommitSha,
    /// Source branch name (without any remote prefix).
    pub source_branch: String,
    /// Destination branch name, when the API reported one.
    pub destination_branch: Option<String>,
    /// Whether the source branch is deleted after merge.
    pub close_source_branch: bool,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_on: DateTime<Utc>,
}

/// Paged response envelope: `{size, next, values}`.
///
/// `next` is an opaque URL to follow until absent; relative order of values
/// across pages carries no meaning.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct Paged<T> {
    #[serde(default)]
    pub(super) size: Option<u64>,
    #[serde(default)]
    pub(super) next: Option<String>,
    pub(super) values: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) id: u64,
    pub(super) title: Option<String>,
    pub(super) state: PullRequestState,
    #[serde(default)]
    pub(super) close_source_branch: bool,
    pub(super) author: Option<ApiAuthor>,
    pub(super) source: ApiReference,
    pub(super) destination: Option<ApiReference>,
    pub(super) created_on: DateTime<Utc>,
    pub(super) updated_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiAuthor {
    pub(super) display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiReference {
    pub(super) commit: ApiCommit,
    pub(super) branch: ApiBranch,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCommit {
    pub(super) hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiBranch {
    pub(super) name: String,
}

impl From<ApiPullRequest> for PullRequest {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            id: value.id,
            title: value.title.unwrap_or_default(),
            state: value.state,
            author: value
                .author
                .and_then(|author| author.display_name)
                .unwrap_or_else(|| "unknown".to_owned()),
            source_commit: CommitSha::new(value.source.commit.hash),
            source_branch: value.source.branch.name,
            destination_branch: value.destination.map(|dest| dest.branch.name),
            close_source_branch: value.close_source_branch,
            created_on: value.created_on,
            updated_on: value.updated_on,
        }
    }
}
