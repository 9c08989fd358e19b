//! Content-based reconciliation of two branches: find the commits each side is
//! missing by patch fingerprint, then replay the missing ones.

pub mod branch_diff;
pub mod fingerprint_index;
pub mod replay;

pub use branch_diff::{BranchDiffResult, PairResolution, compute_branch_diffs};
pub use fingerprint_index::FingerprintIndex;
pub use replay::{
    BranchGuard, ReplayOutcome, ReplayReport, ReplayedCommit, plan_replay, replay_commits,
    replay_commits_with_progress,
};
