//! Ordered, continuity-preserving version resolution.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::bitbucket::PullRequest;
use crate::repo::RepoSnapshot;
use crate::resource::models::Version;

struct Candidate {
    version: Version,
    committed_at: DateTime<Utc>,
    pull_id: u64,
}

/// Resolves the ordered version sequence for a poll cycle.
///
/// Each pull request's source commit is resolved in the snapshot; requests
/// whose commit no longer exists (deleted source branch, GC'd commit) are
/// dropped with a logged warning rather than failing the invocation.
///
/// The ordering key is fixed: **ascending commit timestamp, ties broken by
/// ascending pull-request id**. This is a strict total order and part of the
/// resource's contract; consumers rely on build order, so changing the key
/// is a breaking change.
///
/// Continuity: the scheduler finds new work by locating its previous cursor
/// inside this sequence, so a previous version that is still resolvable must
/// reappear. When its commit is absent from the candidates (the pull request
/// merged or closed) but still resolves in the snapshot, the previous
/// version is prepended verbatim. A previous version that no longer resolves
/// contributes nothing. Cursor matching tolerates truncated hashes.
///
/// An empty result (no open pull requests) is valid, not an error.
#[must_use]
pub fn resolve_versions(
    pulls: &[PullRequest],
    snapshot: &dyn RepoSnapshot,
    previous: Option<&Version>,
) -> Vec<Version> {
    let mut candidates = Vec::with_capacity(pulls.len());

    for pull in pulls {
        match snapshot.resolve_ref(pull.source_commit.as_str()) {
            Ok(details) => {
                debug!(pull_id = pull.id, commit = %details.sha, "resolved candidate");
                candidates.push(Candidate {
                    version: Version::for_pull_request(pull, &details.sha),
                    committed_at: details.committed_at,
                    pull_id: pull.id,
                });
            }
            Err(error) => {
                warn!(
                    pull_id = pull.id,
                    commit = %pull.source_commit,
                    %error,
                    "skipping pull request with unresolvable source commit"
                );
            }
        }
    }

    candidates.sort_by(|a, b| {
        a.committed_at
            .cmp(&b.committed_at)
            .then_with(|| a.pull_id.cmp(&b.pull_id))
    });

    let mut versions: Vec<Version> = candidates
        .into_iter()
        .map(|candidate| candidate.version)
        .collect();

    if let Some(cursor) = previous.filter(|version| !version.commit.as_str().is_empty()) {
        let cursor_present = versions
            .iter()
            .any(|version| version.matches_commit(cursor.commit.as_str()));

        if !cursor_present {
            match snapshot.resolve_ref(cursor.commit.as_str()) {
                Ok(_) => {
                    debug!(
                        commit = %cursor.commit,
                        "previous version absent from candidates but still resolvable; prepending"
                    );
                    versions.insert(0, cursor.clone());
                }
                Err(error) => {
                    debug!(
                        commit = %cursor.commit,
                        %error,
                        "previous version no longer resolvable; cursor dropped"
                    );
                }
            }
        }
    }

    versions
}
