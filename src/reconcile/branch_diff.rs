use crate::error::ReconcileError;
use crate::git::commit::{Commit, CommitId};
use crate::git::gateway::VersionControl;
use crate::reconcile::fingerprint_index::FingerprintIndex;
use crate::utils::Timer;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Commits unique to each side of two branches since their merge base.
///
/// Both lists keep the version-control listing order (newest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchDiffResult {
    pub merge_base: CommitId,
    pub unique_to_from: Vec<CommitId>,
    pub unique_to_to: Vec<CommitId>,
}

impl BranchDiffResult {
    pub fn is_empty(&self) -> bool {
        self.unique_to_from.is_empty() && self.unique_to_to.is_empty()
    }
}

/// Outcome of pairing one commit from each side that share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairResolution {
    /// Same title and author date: the same change on both sides.
    Matched { from: CommitId, to: CommitId },
    /// Same patch, different metadata. Needs human review.
    Ambiguous { from: Commit, to: Commit },
}

/// Compute the commits present on `from_branch` but not on `to_branch`, and
/// the reverse, matching commits by patch content rather than id.
///
/// Read-only. Slow when the merge base is far back, since every commit on
/// both sides is fingerprinted.
pub fn compute_branch_diffs<V: VersionControl + ?Sized>(
    vcs: &V,
    from_branch: &str,
    to_branch: &str,
) -> Result<BranchDiffResult, ReconcileError> {
    let from_ref = vcs.resolve_reference(from_branch)?;
    let to_ref = vcs.resolve_reference(to_branch)?;
    let merge_base = vcs.merge_base(&from_ref, &to_ref)?.ok_or_else(|| {
        ReconcileError::NoCommonAncestor {
            from: from_branch.to_string(),
            to: to_branch.to_string(),
        }
    })?;
    debug!(from = %from_ref, to = %to_ref, merge_base = %merge_base, "computing branch diffs");

    let from_commits = vcs.list_commits_exclusive(&merge_base, &from_ref)?;
    let to_commits = vcs.list_commits_exclusive(&merge_base, &to_ref)?;

    let (unique_to_from, unique_to_to) = subtract_matching(vcs, &from_commits, &to_commits)?;
    info!(
        from_branch,
        to_branch,
        from_listed = from_commits.len(),
        to_listed = to_commits.len(),
        unique_to_from = unique_to_from.len(),
        unique_to_to = unique_to_to.len(),
        "branch diff computed"
    );

    Ok(BranchDiffResult {
        merge_base,
        unique_to_from,
        unique_to_to,
    })
}

/// Remove commits whose fingerprints appear on both sides, returning the
/// residue of each list in its original order.
///
/// A fingerprint with the same multiplicity on both sides matches wholesale.
/// Otherwise commits are paired from the end of each fingerprint's list (the
/// oldest listed commit first) until one side runs out, and every pair must
/// agree on title and author date. The longer side keeps its unpaired extras:
/// those are real duplicates or reverts.
pub fn subtract_matching<V: VersionControl + ?Sized>(
    vcs: &V,
    from_commits: &[CommitId],
    to_commits: &[CommitId],
) -> Result<(Vec<CommitId>, Vec<CommitId>), ReconcileError> {
    let end = Timer::default().start("fingerprint both sides");
    let from_index = FingerprintIndex::build(vcs.fingerprint_commits(from_commits)?);
    let to_index = FingerprintIndex::build(vcs.fingerprint_commits(to_commits)?);
    end();

    let mut matched_from: HashSet<CommitId> = HashSet::new();
    let mut matched_to: HashSet<CommitId> = HashSet::new();

    for (fingerprint, from_ids, to_ids) in from_index.shared_with(&to_index) {
        if from_ids.len() == to_ids.len() {
            matched_from.extend(from_ids.iter().cloned());
            matched_to.extend(to_ids.iter().cloned());
            continue;
        }

        debug!(
            fingerprint = %fingerprint,
            from = from_ids.len(),
            to = to_ids.len(),
            "resolving duplicated fingerprint pairwise"
        );
        let mut from_stack = from_ids.to_vec();
        let mut to_stack = to_ids.to_vec();
        while !from_stack.is_empty() && !to_stack.is_empty() {
            let (Some(from), Some(to)) = (from_stack.pop(), to_stack.pop()) else {
                break;
            };
            match resolve_pair(vcs, &from, &to)? {
                PairResolution::Matched { from, to } => {
                    matched_from.insert(from);
                    matched_to.insert(to);
                }
                PairResolution::Ambiguous { from, to } => {
                    return Err(ReconcileError::ambiguity(&from, &to));
                }
            }
        }
    }

    let residue = |commits: &[CommitId], matched: &HashSet<CommitId>| -> Vec<CommitId> {
        commits
            .iter()
            .filter(|c| !matched.contains(*c))
            .cloned()
            .collect()
    };
    Ok((
        residue(from_commits, &matched_from),
        residue(to_commits, &matched_to),
    ))
}

/// Decide whether two fingerprint-sharing commits are the same change.
pub fn resolve_pair<V: VersionControl + ?Sized>(
    vcs: &V,
    from: &CommitId,
    to: &CommitId,
) -> Result<PairResolution, ReconcileError> {
    let from_commit = vcs.read_commit_metadata(from)?;
    let to_commit = vcs.read_commit_metadata(to)?;
    if from_commit.title == to_commit.title && from_commit.author_date == to_commit.author_date {
        Ok(PairResolution::Matched {
            from: from_commit.id,
            to: to_commit.id,
        })
    } else {
        Ok(PairResolution::Ambiguous {
            from: from_commit,
            to: to_commit,
        })
    }
}
