//! Pipeline resource engine for Bitbucket Cloud pull requests.
//!
//! The crate resolves the ordered sequence of versions (one per open pull
//! request's head commit) that a polling scheduler diffs against its
//! previous cursor, materializes a chosen version into a detached working
//! tree with branch attribution, and reports build outcomes back against
//! the live HEAD of that tree.

pub mod bitbucket;
pub mod logging;
pub mod repo;
pub mod resolve;
pub mod resource;

pub use bitbucket::{ApiError, Client, Credentials, PullRequest, PullRequestSource};
pub use repo::{CloneCredentials, CommitSha, Git2Snapshot, RepoSnapshot, SnapshotError};
pub use resolve::{containing_branch, resolve_versions};
pub use resource::ResourceError;
pub use resource::models::{Source, Version};
