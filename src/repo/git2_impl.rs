//! Git2-based implementation of [`RepoSnapshot`].

use camino::Utf8Path;
use chrono::{DateTime, TimeZone, Utc};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    BranchType, CertificateCheckStatus, Commit, Cred, FetchOptions, Oid, RemoteCallbacks,
    Repository, Sort,
};
use tracing::debug;

use super::commit::CommitDetails;
use super::error::SnapshotError;
use super::types::{CommitSha, RemoteBranch};
use super::{CloneCredentials, RepoSnapshot};

/// Snapshot backed by a git2 [`Repository`].
///
/// All operations run synchronously on the calling thread; the resource is
/// single-threaded by design, so no interior locking is needed.
pub struct Git2Snapshot {
    repo: Repository,
}

impl std::fmt::Debug for Git2Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git2Snapshot")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git2Snapshot {
    /// Clones `url` into `directory` as a bare object store.
    ///
    /// Used by the check path, which only resolves refs and never touches a
    /// working tree.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Clone`] when the clone fails, including when
    /// `directory` already exists and is not empty.
    pub fn clone_bare(
        url: &str,
        directory: &Utf8Path,
        credentials: &CloneCredentials,
    ) -> Result<Self, SnapshotError> {
        Self::clone_with(url, directory, credentials, true)
    }

    /// Clones `url` into `directory` with a working tree.
    ///
    /// Used by the materialize path ahead of a detached checkout.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Clone`] when the clone fails.
    pub fn clone_worktree(
        url: &str,
        directory: &Utf8Path,
        credentials: &CloneCredentials,
    ) -> Result<Self, SnapshotError> {
        Self::clone_with(url, directory, credentials, false)
    }

    /// Opens an existing repository, typically one a previous materialize
    /// step left behind.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Git`] when `directory` is not a repository.
    pub fn open(directory: &Utf8Path) -> Result<Self, SnapshotError> {
        let repo = Repository::open(directory.as_std_path())?;
        Ok(Self { repo })
    }

    /// Wraps an already-open repository. Used by tests that build fixtures
    /// directly through git2.
    #[must_use]
    pub const fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    fn clone_with(
        url: &str,
        directory: &Utf8Path,
        credentials: &CloneCredentials,
        bare: bool,
    ) -> Result<Self, SnapshotError> {
        debug!(url, %directory, bare, "cloning repository");

        let CloneCredentials { username, password } = credentials.clone();

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, _username_from_url, _allowed| {
            Cred::userpass_plaintext(&username, &password)
        });
        callbacks.certificate_check(|_cert, _hostname| Ok(CertificateCheckStatus::CertificateOk));

        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(callbacks);

        let repo = RepoBuilder::new()
            .bare(bare)
            .fetch_options(fetch)
            .clone(url, directory.as_std_path())
            .map_err(|error| SnapshotError::Clone {
                url: url.to_owned(),
                message: error.message().to_owned(),
            })?;

        Ok(Self { repo })
    }
}

impl RepoSnapshot for Git2Snapshot {
    fn resolve_ref(&self, reference: &str) -> Result<CommitDetails, SnapshotError> {
        let object =
            self.repo
                .revparse_single(reference)
                .map_err(|error| SnapshotError::RefNotFound {
                    reference: reference.to_owned(),
                    message: error.message().to_owned(),
                })?;

        let commit = object
            .peel_to_commit()
            .map_err(|error| SnapshotError::RefNotFound {
                reference: reference.to_owned(),
                message: error.message().to_owned(),
            })?;

        Ok(details_from_commit(&commit))
    }

    fn remote_branches(&self) -> Result<Vec<RemoteBranch>, SnapshotError> {
        let mut branches = Vec::new();

        for entry in self.repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()? else {
                continue;
            };
            // origin/HEAD is a symbolic pointer, not a branch.
            let Some(tip) = branch.get().target() else {
                continue;
            };
            branches.push(RemoteBranch::new(
                name.to_owned(),
                CommitSha::new(tip.to_string()),
            ));
        }

        Ok(branches)
    }

    fn walk_reachable_from(
        &self,
        tip: &CommitSha,
    ) -> Result<Box<dyn Iterator<Item = Result<CommitSha, SnapshotError>> + '_>, SnapshotError>
    {
        let oid = parse_oid(tip)?;

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL)?;
        walk.push(oid).map_err(|error| SnapshotError::RefNotFound {
            reference: tip.to_string(),
            message: error.message().to_owned(),
        })?;

        Ok(Box::new(walk.map(|item| {
            item.map(|found| CommitSha::new(found.to_string()))
                .map_err(SnapshotError::from)
        })))
    }

    fn checkout_detached(&self, sha: &CommitSha) -> Result<(), SnapshotError> {
        if self.repo.is_bare() {
            return Err(SnapshotError::NoWorkTree {
                path: self.repo.path().display().to_string(),
            });
        }

        let oid = parse_oid(sha)?;
        let object = self
            .repo
            .find_object(oid, None)
            .map_err(|error| SnapshotError::RefNotFound {
                reference: sha.to_string(),
                message: error.message().to_owned(),
            })?;

        debug!(%sha, "forced detached checkout");

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_tree(&object, Some(&mut checkout))?;
        self.repo.set_head_detached(oid)?;

        Ok(())
    }

    fn head_commit(&self) -> Result<CommitSha, SnapshotError> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(CommitSha::new(commit.id().to_string()))
    }
}

fn parse_oid(sha: &CommitSha) -> Result<Oid, SnapshotError> {
    Oid::from_str(sha.as_str()).map_err(|error| SnapshotError::RefNotFound {
        reference: sha.to_string(),
        message: error.message().to_owned(),
    })
}

fn details_from_commit(commit: &Commit<'_>) -> CommitDetails {
    let author = commit.author().name().unwrap_or("unknown").to_owned();
    let committed_at = timestamp_from_seconds(commit.time().seconds());
    let message = commit.message().unwrap_or("").to_owned();

    CommitDetails::new(
        CommitSha::new(commit.id().to_string()),
        author,
        committed_at,
        message,
    )
}

fn timestamp_from_seconds(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).single().unwrap_or_default()
}
