use crate::error::ReconcileError;
use crate::git::commit::CommitId;
use crate::git::gateway::VersionControl;
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayedCommit {
    pub source: CommitId,
    pub replayed: CommitId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub target_branch: String,
    /// Branch checked out again once every commit was replayed.
    pub restored_branch: String,
    /// Oldest first.
    pub commits: Vec<ReplayedCommit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    NothingToDo,
    Replayed(ReplayReport),
}

/// Replay order for commits listed newest-first: oldest first.
pub fn plan_replay(unique_to_from: &[CommitId]) -> Vec<CommitId> {
    unique_to_from.iter().rev().cloned().collect()
}

/// The caller's branch, held while another branch is checked out.
///
/// Only [`BranchGuard::release`] switches back. Dropping the guard leaves the
/// target branch checked out, which is what a failed replay needs so the
/// partial state can be resolved by hand.
pub struct BranchGuard<'a, V: VersionControl + ?Sized> {
    vcs: &'a V,
    original: String,
}

impl<'a, V: VersionControl + ?Sized> BranchGuard<'a, V> {
    /// Remember the current branch, then check out `target`.
    pub fn acquire(vcs: &'a V, target: &str) -> Result<Self, ReconcileError> {
        let original = vcs.current_branch()?;
        vcs.checkout(target)?;
        Ok(BranchGuard { vcs, original })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Check out the remembered branch again.
    pub fn release(self) -> Result<String, ReconcileError> {
        self.vcs.checkout(&self.original)?;
        Ok(self.original)
    }
}

pub fn replay_commits<V: VersionControl + ?Sized>(
    vcs: &V,
    unique_to_from: &[CommitId],
    to_branch: &str,
) -> Result<ReplayOutcome, ReconcileError> {
    replay_commits_with_progress(vcs, unique_to_from, to_branch, &ProgressBar::hidden())
}

/// Replay `unique_to_from` (newest first) onto `to_branch`, oldest first.
///
/// Stops at the first failing commit without rolling back and without
/// switching back to the caller's branch. On success the caller's branch is
/// checked out again.
pub fn replay_commits_with_progress<V: VersionControl + ?Sized>(
    vcs: &V,
    unique_to_from: &[CommitId],
    to_branch: &str,
    progress: &ProgressBar,
) -> Result<ReplayOutcome, ReconcileError> {
    if unique_to_from.is_empty() {
        info!(to_branch, "nothing to replay");
        return Ok(ReplayOutcome::NothingToDo);
    }

    let plan = plan_replay(unique_to_from);
    let guard = BranchGuard::acquire(vcs, to_branch)?;
    info!(
        to_branch,
        original = guard.original(),
        count = plan.len(),
        "replaying commits"
    );

    progress.set_length(plan.len() as u64);
    let mut commits: Vec<ReplayedCommit> = Vec::with_capacity(plan.len());
    for source in plan {
        progress.set_message(source.short().to_string());
        match vcs.replay_onto(&source) {
            Ok(replayed) => {
                info!(source = %source, replayed = %replayed, "replayed");
                commits.push(ReplayedCommit { source, replayed });
                progress.inc(1);
            }
            Err(ReconcileError::CherryPick { message, .. }) => {
                progress.abandon();
                warn!(source = %source, to_branch, "replay failed, leaving partial state");
                return Err(ReconcileError::ReplayConflict {
                    commit: source,
                    branch: to_branch.to_string(),
                    applied: commits.into_iter().map(|c| c.source).collect(),
                    message,
                });
            }
            Err(e) => {
                // The apply may have landed; only the cherry-pick's own failure is a conflict
                progress.abandon();
                warn!(source = %source, to_branch, error = %e, "replay interrupted after apply");
                return Err(e);
            }
        }
    }
    progress.finish_and_clear();

    let restored_branch = guard.release()?;
    Ok(ReplayOutcome::Replayed(ReplayReport {
        target_branch: to_branch.to_string(),
        restored_branch,
        commits,
    }))
}
