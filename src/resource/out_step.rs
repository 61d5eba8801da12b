//! The out step: report a build outcome against the materialized commit.

use camino::Utf8Path;
use tracing::info;

use crate::bitbucket::{BuildStatus, BuildStatusUpdate, Client, Credentials};
use crate::repo::{Git2Snapshot, RepoSnapshot};

use super::error::ResourceError;
use super::models::{MetadataField, OutParams, OutRequest, OutResponse};
use super::storage;

/// Default status key when params do not name one.
const DEFAULT_STATUS_KEY: &str = "build";

/// Runs a report cycle: read back the persisted version, take the live HEAD
/// of the materialized tree, and publish the build status.
///
/// # Errors
///
/// Returns an error when validation, the version read-back, opening the
/// repository, or the status POST fails.
pub fn run(input_directory: &Utf8Path, request: &OutRequest) -> Result<OutResponse, ResourceError> {
    request.source.validate()?;
    let source = &request.source;

    let client = Client::new(
        &source.workspace,
        &source.slug,
        Credentials::new(source.username.clone(), source.password.clone()),
    )?;

    run_with_client(input_directory, &request.params, &client)
}

/// Report cycle against an explicit client; exercised directly by tests
/// pointing at a local mock server.
pub(crate) fn run_with_client(
    input_directory: &Utf8Path,
    params: &OutParams,
    client: &Client,
) -> Result<OutResponse, ResourceError> {
    params.validate()?;

    let status = BuildStatus::parse(&params.status).ok_or_else(|| ResourceError::Validation {
        message: format!("params: unknown build status '{}'", params.status),
    })?;

    let repo_dir = input_directory.join(&params.repo_path);
    let version = match &params.version_path {
        Some(relative) => storage::read_version_at(&input_directory.join(relative))?,
        None => storage::read_version(&repo_dir)?,
    };

    // Intermediate steps may have committed on top of the materialized
    // version; the status belongs to whatever HEAD points at now.
    let snapshot = Git2Snapshot::open(&repo_dir)?;
    let head = snapshot.head_commit()?;

    let update = BuildStatusUpdate {
        key: params
            .key
            .clone()
            .unwrap_or_else(|| DEFAULT_STATUS_KEY.to_owned()),
        state: status,
        name: params.name.clone().unwrap_or_default(),
        description: params.description.clone().unwrap_or_default(),
        url: params.url.clone().unwrap_or_default(),
    };

    client.publish_build_status(&head, &update)?;
    info!(commit = %head, state = status.as_str(), "published build status");

    Ok(OutResponse {
        version,
        metadata: vec![
            MetadataField::new("commit", head.to_string()),
            MetadataField::new("status", status.as_str()),
        ],
    })
}
