//! Shared git fixtures for integration suites.

use git2::build::CheckoutBuilder;
use git2::{ErrorCode, Oid, Repository, Signature, Time};
use tempfile::TempDir;

/// Error type for test fixtures and helpers.
pub type TestError = Box<dyn std::error::Error>;

/// Initialises an origin repository with a committer identity configured.
pub fn init_origin() -> Result<(TempDir, Repository), TestError> {
    let dir = TempDir::new()?;
    let repo = Repository::init(dir.path())?;

    let mut config = repo.config()?;
    config.set_str("user.name", "Test User")?;
    config.set_str("user.email", "test@example.com")?;

    Ok((dir, repo))
}

/// Commits the given files on HEAD with an explicit committer timestamp.
pub fn commit_at(
    repo: &Repository,
    message: &str,
    files: &[(&str, &str)],
    epoch_seconds: i64,
) -> Result<Oid, TestError> {
    let when = Time::new(epoch_seconds, 0);
    let sig = Signature::new("Test User", "test@example.com", &when)?;
    let mut index = repo.index()?;

    let workdir = repo
        .workdir()
        .ok_or("repository has no working directory")?;

    for (path, content) in files {
        let file_path = workdir.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, content)?;
        index.add_path(std::path::Path::new(path))?;
    }

    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let parent: Option<git2::Commit<'_>> = match repo.head() {
        Ok(head_ref) => Some(head_ref.peel_to_commit()?),
        Err(e) if e.code() == ErrorCode::UnbornBranch => None,
        Err(e) => return Err(e.into()),
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    Ok(repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?)
}

/// Commits once on a side branch and returns to the original branch,
/// leaving the new commit reachable only from that branch.
pub fn commit_on_branch(
    repo: &Repository,
    branch: &str,
    message: &str,
    files: &[(&str, &str)],
    epoch_seconds: i64,
) -> Result<Oid, TestError> {
    let default_ref = repo
        .head()?
        .name()
        .ok_or("HEAD name is not valid UTF-8")?
        .to_owned();

    let base = repo.head()?.peel_to_commit()?;
    repo.branch(branch, &base, false)?;
    repo.set_head(&format!("refs/heads/{branch}"))?;
    repo.checkout_head(Some(CheckoutBuilder::new().force()))?;

    let oid = commit_at(repo, message, files, epoch_seconds)?;

    repo.set_head(&default_ref)?;
    repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
    Ok(oid)
}

/// Converts a temp directory handle to a UTF-8 path.
pub fn utf8_path(dir: &TempDir) -> Result<camino::Utf8PathBuf, TestError> {
    Ok(camino::Utf8PathBuf::try_from(dir.path().to_path_buf())?)
}
