//! Resolver and attributor tests over an in-memory snapshot fake.

#![expect(
    clippy::panic_in_result_fn,
    reason = "Test assertions are expected to panic on failure"
)]

use std::collections::HashMap;

use chrono::{TimeZone, Utc};

use crate::bitbucket::{PullRequest, PullRequestState};
use crate::repo::{CommitDetails, CommitSha, RemoteBranch, RepoSnapshot, SnapshotError};
use crate::resource::models::Version;

use super::{containing_branch, resolve_versions};

/// In-memory implementation of [`RepoSnapshot`] backed by an explicit
/// commit graph.
#[derive(Debug, Default)]
struct FakeSnapshot {
    commits: Vec<CommitDetails>,
    branches: Vec<RemoteBranch>,
    parents: HashMap<String, Vec<String>>,
}

impl FakeSnapshot {
    fn new() -> Self {
        Self::default()
    }

    fn with_commit(mut self, sha: &str, epoch_seconds: i64) -> Self {
        let committed_at = Utc
            .timestamp_opt(epoch_seconds, 0)
            .single()
            .unwrap_or_default();
        self.commits.push(CommitDetails::new(
            CommitSha::from(sha),
            "Alice".to_owned(),
            committed_at,
            format!("commit {sha}"),
        ));
        self
    }

    fn with_branch(mut self, name: &str, tip: &str) -> Self {
        self.branches
            .push(RemoteBranch::new(name.to_owned(), CommitSha::from(tip)));
        self
    }

    fn with_edge(mut self, child: &str, parent: &str) -> Self {
        self.parents
            .entry(child.to_owned())
            .or_default()
            .push(parent.to_owned());
        self
    }
}

impl RepoSnapshot for FakeSnapshot {
    fn resolve_ref(&self, reference: &str) -> Result<CommitDetails, SnapshotError> {
        if reference.is_empty() {
            return Err(SnapshotError::RefNotFound {
                reference: reference.to_owned(),
                message: "empty ref".to_owned(),
            });
        }
        self.commits
            .iter()
            .find(|commit| commit.sha.as_str().starts_with(reference))
            .cloned()
            .ok_or_else(|| SnapshotError::RefNotFound {
                reference: reference.to_owned(),
                message: "no such commit".to_owned(),
            })
    }

    fn remote_branches(&self) -> Result<Vec<RemoteBranch>, SnapshotError> {
        Ok(self.branches.clone())
    }

    fn walk_reachable_from(
        &self,
        tip: &CommitSha,
    ) -> Result<Box<dyn Iterator<Item = Result<CommitSha, SnapshotError>> + '_>, SnapshotError>
    {
        if !self.commits.iter().any(|commit| commit.sha == *tip) {
            return Err(SnapshotError::RefNotFound {
                reference: tip.to_string(),
                message: "no such commit".to_owned(),
            });
        }

        let mut reached = Vec::new();
        let mut pending = vec![tip.as_str().to_owned()];
        while let Some(sha) = pending.pop() {
            if reached.contains(&sha) {
                continue;
            }
            if let Some(parents) = self.parents.get(&sha) {
                pending.extend(parents.iter().cloned());
            }
            reached.push(sha);
        }

        Ok(Box::new(
            reached.into_iter().map(|sha| Ok(CommitSha::new(sha))),
        ))
    }

    fn checkout_detached(&self, _sha: &CommitSha) -> Result<(), SnapshotError> {
        Err(SnapshotError::Git {
            message: "fake snapshot has no working tree".to_owned(),
        })
    }

    fn head_commit(&self) -> Result<CommitSha, SnapshotError> {
        Err(SnapshotError::Git {
            message: "fake snapshot has no working tree".to_owned(),
        })
    }
}

fn pull(id: u64, commit: &str, branch: &str) -> PullRequest {
    let stamp = Utc
        .timestamp_opt(1_704_067_200, 0)
        .single()
        .unwrap_or_default();
    PullRequest {
        id,
        title: format!("Change {id}"),
        state: PullRequestState::Open,
        author: "Alice".to_owned(),
        source_commit: CommitSha::from(commit),
        source_branch: branch.to_owned(),
        destination_branch: Some("main".to_owned()),
        close_source_branch: false,
        created_on: stamp,
        updated_on: stamp,
    }
}

fn commits_of(versions: &[Version]) -> Vec<&str> {
    versions
        .iter()
        .map(|version| version.commit.as_str())
        .collect()
}

#[test]
fn orders_candidates_by_commit_time() {
    // Scenario: #12 carries the older commit, #7 the newer one.
    let snapshot = FakeSnapshot::new()
        .with_commit("aaa111", 1_704_067_200)
        .with_commit("bbb222", 1_706_745_600);
    let pulls = vec![pull(7, "bbb222", "feature-b"), pull(12, "aaa111", "feature-a")];

    let versions = resolve_versions(&pulls, &snapshot, None);

    assert_eq!(commits_of(&versions), vec!["aaa111", "bbb222"]);
    let first = versions.first().map(|version| version.id.as_deref());
    assert_eq!(first, Some(Some("12")));
}

#[test]
fn equal_commit_times_break_ties_by_pull_request_id() {
    let snapshot = FakeSnapshot::new()
        .with_commit("aaa111", 1_704_067_200)
        .with_commit("bbb222", 1_704_067_200);
    let pulls = vec![pull(9, "bbb222", "b"), pull(4, "aaa111", "a")];

    let versions = resolve_versions(&pulls, &snapshot, None);

    let ids: Vec<Option<&str>> = versions.iter().map(|v| v.id.as_deref()).collect();
    assert_eq!(ids, vec![Some("4"), Some("9")]);
}

#[test]
fn candidates_carry_pull_request_decoration() {
    let snapshot = FakeSnapshot::new().with_commit("aaa111", 1_704_067_200);
    let pulls = vec![pull(12, "aaa111", "feature-a")];

    let versions = resolve_versions(&pulls, &snapshot, None);

    let Some(version) = versions.first() else {
        panic!("expected one version");
    };
    assert_eq!(version.id.as_deref(), Some("12"));
    assert_eq!(version.branch.as_deref(), Some("feature-a"));
    assert_eq!(version.title.as_deref(), Some("Change 12"));
}

#[test]
fn previous_version_still_resolvable_is_prepended() {
    // Scenario: the cursor's pull request merged, but its commit survives.
    let snapshot = FakeSnapshot::new()
        .with_commit("aaa111", 1_704_067_200)
        .with_commit("ccc333", 1_701_388_800);
    let pulls = vec![pull(12, "aaa111", "feature-a")];
    let previous = Version::new(CommitSha::from("ccc333"));

    let versions = resolve_versions(&pulls, &snapshot, Some(&previous));

    assert_eq!(commits_of(&versions), vec!["ccc333", "aaa111"]);
}

#[test]
fn previous_version_present_among_candidates_is_not_duplicated() {
    let snapshot = FakeSnapshot::new()
        .with_commit("aaa111", 1_704_067_200)
        .with_commit("bbb222", 1_706_745_600);
    let pulls = vec![pull(7, "bbb222", "b"), pull(12, "aaa111", "a")];
    let previous = Version::new(CommitSha::from("aaa111"));

    let versions = resolve_versions(&pulls, &snapshot, Some(&previous));

    assert_eq!(commits_of(&versions), vec!["aaa111", "bbb222"]);
}

#[test]
fn truncated_previous_hash_still_matches_its_candidate() {
    let snapshot = FakeSnapshot::new().with_commit("aaa111", 1_704_067_200);
    let pulls = vec![pull(12, "aaa111", "a")];
    let previous = Version::new(CommitSha::from("aaa"));

    let versions = resolve_versions(&pulls, &snapshot, Some(&previous));

    assert_eq!(commits_of(&versions), vec!["aaa111"]);
}

#[test]
fn unresolvable_previous_version_contributes_nothing() {
    let snapshot = FakeSnapshot::new().with_commit("aaa111", 1_704_067_200);
    let pulls = vec![pull(12, "aaa111", "a")];
    let previous = Version::new(CommitSha::from("ddd444"));

    let versions = resolve_versions(&pulls, &snapshot, Some(&previous));

    assert_eq!(commits_of(&versions), vec!["aaa111"]);
}

#[test]
fn empty_previous_commit_is_ignored() {
    let snapshot = FakeSnapshot::new().with_commit("aaa111", 1_704_067_200);
    let pulls = vec![pull(12, "aaa111", "a")];
    let previous = Version::new(CommitSha::from(""));

    let versions = resolve_versions(&pulls, &snapshot, Some(&previous));

    assert_eq!(commits_of(&versions), vec!["aaa111"]);
}

#[test]
fn pull_request_with_missing_commit_is_skipped() {
    // Scenario: #9's source branch was force-pushed away; the commit is gone.
    let snapshot = FakeSnapshot::new()
        .with_commit("aaa111", 1_704_067_200)
        .with_commit("bbb222", 1_706_745_600);
    let pulls = vec![
        pull(12, "aaa111", "a"),
        pull(9, "deadbee", "gone"),
        pull(7, "bbb222", "b"),
    ];

    let versions = resolve_versions(&pulls, &snapshot, None);

    assert_eq!(commits_of(&versions), vec!["aaa111", "bbb222"]);
}

#[test]
fn no_open_pull_requests_is_a_valid_empty_sequence() {
    let snapshot = FakeSnapshot::new();
    let versions = resolve_versions(&[], &snapshot, None);
    assert!(versions.is_empty());
}

#[test]
fn unchanged_inputs_resolve_to_identical_sequences() {
    let snapshot = FakeSnapshot::new()
        .with_commit("aaa111", 1_704_067_200)
        .with_commit("bbb222", 1_706_745_600);
    let pulls = vec![pull(7, "bbb222", "b"), pull(12, "aaa111", "a")];

    let first = resolve_versions(&pulls, &snapshot, None);
    let second = resolve_versions(&pulls, &snapshot, None);

    assert_eq!(first, second);
}

#[test]
fn attributes_commit_to_the_containing_branch() -> Result<(), SnapshotError> {
    // main: base <- m1; feature-x: base <- f1
    let snapshot = FakeSnapshot::new()
        .with_commit("base00", 1_704_000_000)
        .with_commit("m1", 1_704_000_100)
        .with_commit("f1", 1_704_000_200)
        .with_edge("m1", "base00")
        .with_edge("f1", "base00")
        .with_branch("origin/main", "m1")
        .with_branch("origin/feature-x", "f1");

    let branch = containing_branch(&snapshot, &CommitSha::from("f1"))?;
    assert_eq!(branch.as_deref(), Some("feature-x"));
    Ok(())
}

#[test]
fn ambiguous_reachability_breaks_ties_by_name_length_then_order() -> Result<(), SnapshotError> {
    let snapshot = FakeSnapshot::new()
        .with_commit("base00", 1_704_000_000)
        .with_commit("x1", 1_704_000_100)
        .with_commit("y1", 1_704_000_200)
        .with_edge("x1", "base00")
        .with_edge("y1", "base00")
        .with_branch("origin/feature-long", "x1")
        .with_branch("origin/dev", "y1");

    // Both branches reach the shared base; "dev" wins on length.
    let branch = containing_branch(&snapshot, &CommitSha::from("base00"))?;
    assert_eq!(branch.as_deref(), Some("dev"));
    Ok(())
}

#[test]
fn equal_length_names_break_ties_lexicographically() -> Result<(), SnapshotError> {
    let snapshot = FakeSnapshot::new()
        .with_commit("base00", 1_704_000_000)
        .with_branch("origin/bbb", "base00")
        .with_branch("origin/aaa", "base00");

    let branch = containing_branch(&snapshot, &CommitSha::from("base00"))?;
    assert_eq!(branch.as_deref(), Some("aaa"));
    Ok(())
}

#[test]
fn unreachable_commit_attributes_to_no_branch() -> Result<(), SnapshotError> {
    let snapshot = FakeSnapshot::new()
        .with_commit("m1", 1_704_000_100)
        .with_commit("orphan", 1_704_000_300)
        .with_branch("origin/main", "m1");

    let branch = containing_branch(&snapshot, &CommitSha::from("orphan"))?;
    assert_eq!(branch, None);
    Ok(())
}
