//! Attribution of a commit to the remote branch containing it.

use tracing::debug;

use crate::repo::{CommitSha, RepoSnapshot, SnapshotError};

/// Finds the remote branch containing `target`, if any.
///
/// Every remote branch tip is walked for reachability; when several branches
/// contain the commit the winner is chosen by an explicit tie-break rather
/// than enumeration order: shortest normalized name first, lexicographic on
/// equal length. Names are normalized by stripping the remote prefix so they
/// match API-reported source-branch names.
///
/// No containing branch is a valid absence (`Ok(None)`), not an error.
///
/// Cost is O(branches × history size); acceptable because attribution runs
/// once per materialize, never per poll.
///
/// # Errors
///
/// Returns an error when branch enumeration or a reachability walk fails.
pub fn containing_branch(
    snapshot: &dyn RepoSnapshot,
    target: &CommitSha,
) -> Result<Option<String>, SnapshotError> {
    let mut containing = Vec::new();

    for branch in snapshot.remote_branches()? {
        if walk_contains(snapshot, &branch.tip, target)? {
            containing.push(branch.local_name().to_owned());
        }
    }

    containing.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    containing.dedup();

    debug!(
        commit = %target,
        matches = containing.len(),
        winner = containing.first().map_or("none", String::as_str),
        "branch attribution finished"
    );

    Ok(containing.into_iter().next())
}

fn walk_contains(
    snapshot: &dyn RepoSnapshot,
    tip: &CommitSha,
    target: &CommitSha,
) -> Result<bool, SnapshotError> {
    for reached in snapshot.walk_reachable_from(tip)? {
        if reached? == *target {
            return Ok(true);
        }
    }
    Ok(false)
}
