//! The in step: materialize a chosen version into a working tree.

use camino::Utf8Path;
use tracing::{debug, info};

use crate::bitbucket::{Client, Credentials};
use crate::repo::{CloneCredentials, Git2Snapshot, RepoSnapshot};
use crate::resolve::containing_branch;

use super::error::ResourceError;
use super::models::{InRequest, InResponse, MetadataField, Version};
use super::storage;

/// Runs a materialize cycle for the requested version.
///
/// # Errors
///
/// Returns an error when validation, the clone, the target-ref resolution,
/// or the checkout fails. Unlike check, a ref-resolution failure here is
/// fatal: there is a single explicit target and no fallback.
pub fn run(destination: &Utf8Path, request: &InRequest) -> Result<InResponse, ResourceError> {
    request.source.validate()?;
    request.version.validate()?;
    let source = &request.source;

    std::fs::create_dir_all(destination.as_std_path()).map_err(|error| ResourceError::Io {
        operation: format!("creating destination {destination}"),
        message: error.to_string(),
    })?;

    let client = Client::new(
        &source.workspace,
        &source.slug,
        Credentials::new(source.username.clone(), source.password.clone()),
    )?;
    let credentials = CloneCredentials::new(source.username.clone(), source.password.clone());

    materialize(client.repo_url(), &credentials, destination, &request.version)
}

/// Clones `url` into `destination`, force-checks-out the version's commit
/// detached, attributes the containing remote branch, and persists the
/// version file for the report step.
///
/// The request version is echoed verbatim in the response and in the
/// persisted file; the working tree is owned by the orchestrator afterwards.
///
/// # Errors
///
/// Returns an error when the clone, resolution, checkout, attribution, or
/// version persistence fails.
pub fn materialize(
    url: &str,
    credentials: &CloneCredentials,
    destination: &Utf8Path,
    version: &Version,
) -> Result<InResponse, ResourceError> {
    let snapshot = Git2Snapshot::clone_worktree(url, destination, credentials)?;

    let commit = snapshot.resolve_ref(version.commit.as_str())?;
    snapshot.checkout_detached(&commit.sha)?;
    info!(commit = %commit.sha, "checked out detached");

    let branch = containing_branch(&snapshot, &commit.sha)?;
    debug!(branch = branch.as_deref().unwrap_or("none"), "attributed branch");

    storage::write_version(destination, version)?;

    let mut metadata = vec![
        MetadataField::new("author", commit.author.clone()),
        MetadataField::new("commit", commit.sha.to_string()),
        MetadataField::new("message", commit.summary()),
        MetadataField::new("timestamp", commit.committed_at.to_rfc3339()),
    ];
    if let Some(name) = branch {
        metadata.push(MetadataField::new("branch", name));
    }

    Ok(InResponse {
        version: version.clone(),
        metadata,
    })
}
