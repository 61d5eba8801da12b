//! The check step: poll the repository for the ordered version sequence.

use std::env;

use camino::Utf8PathBuf;
use tracing::{debug, info};

use crate::bitbucket::{Client, Credentials, PullRequestSource};
use crate::repo::{CloneCredentials, Git2Snapshot};
use crate::resolve::resolve_versions;

use super::error::ResourceError;
use super::models::{CheckRequest, Version};

/// Runs a poll cycle: fetch pull requests, clone a bare snapshot, resolve
/// the ordered version sequence, and remove the scratch clone.
///
/// # Errors
///
/// Returns an error when validation, the pull-request fetch, the clone, or
/// the scratch cleanup fails. Individual pull requests with unresolvable
/// commits are skipped inside the resolver, not raised here.
pub fn run(request: &CheckRequest) -> Result<Vec<Version>, ResourceError> {
    request.source.validate()?;
    let source = &request.source;

    let client = Client::new(
        &source.workspace,
        &source.slug,
        Credentials::new(source.username.clone(), source.password.clone()),
    )?;

    let pulls = client.fetch_all()?;
    info!(count = pulls.len(), "fetched pull requests");

    let scratch = scratch_directory(&source.slug)?;
    debug!(%scratch, "cloning bare snapshot");

    let credentials = CloneCredentials::new(source.username.clone(), source.password.clone());
    let snapshot = Git2Snapshot::clone_bare(client.repo_url(), &scratch, &credentials)?;

    let versions = resolve_versions(&pulls, &snapshot, request.version.as_ref());
    drop(snapshot);

    std::fs::remove_dir_all(scratch.as_std_path()).map_err(|error| ResourceError::Io {
        operation: format!("removing scratch directory {scratch}"),
        message: error.to_string(),
    })?;

    Ok(versions)
}

/// Scratch clone location for one tracked repository.
///
/// Scoped by slug so concurrent invocations against different repositories
/// cannot collide; a leftover directory from a killed invocation makes the
/// next clone fail loudly instead of corrupting state.
fn scratch_directory(slug: &str) -> Result<Utf8PathBuf, ResourceError> {
    let temp = Utf8PathBuf::try_from(env::temp_dir()).map_err(|error| ResourceError::Io {
        operation: "locating system temp directory".to_owned(),
        message: error.to_string(),
    })?;
    Ok(temp.join(format!("tugboat-check-{slug}")))
}
