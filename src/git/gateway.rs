use crate::error::ReconcileError;
use crate::git::commit::{Commit, CommitId};
use crate::git::patch_id::CommitFingerprint;

/// Primitive version-control operations consumed by branch diffing and replay.
///
/// Every call is synchronous. Implementations assume exclusive access to the
/// working tree and branch pointers for the duration of a call.
pub trait VersionControl {
    /// Resolve a branch, tag or revision to a commit. Unknown names, and names
    /// whose candidate refs point at different commits, fail with
    /// [`ReconcileError::Reference`].
    fn resolve_reference(&self, name: &str) -> Result<CommitId, ReconcileError>;

    /// Commits reachable from `tip` but not from `base`, newest first.
    fn list_commits_exclusive(
        &self,
        base: &CommitId,
        tip: &CommitId,
    ) -> Result<Vec<CommitId>, ReconcileError>;

    /// Best common ancestor, or `None` when the histories are unrelated.
    fn merge_base(&self, a: &CommitId, b: &CommitId) -> Result<Option<CommitId>, ReconcileError>;

    /// One fingerprint per input commit, in input order.
    fn fingerprint_commits(
        &self,
        commits: &[CommitId],
    ) -> Result<Vec<CommitFingerprint>, ReconcileError>;

    fn read_commit_metadata(&self, commit: &CommitId) -> Result<Commit, ReconcileError>;

    fn current_branch(&self) -> Result<String, ReconcileError>;

    fn checkout(&self, branch: &str) -> Result<(), ReconcileError>;

    /// Apply `commit` on top of the checked-out branch, recording the source id
    /// in the new commit's message. Returns the id of the new commit.
    ///
    /// Only a failed apply is reported as [`ReconcileError::CherryPick`]; any
    /// other error may follow a successful apply.
    fn replay_onto(&self, commit: &CommitId) -> Result<CommitId, ReconcileError>;

    fn push(&self, branch: &str) -> Result<(), ReconcileError>;
}
