use crate::git::commit::{Commit, CommitId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A branch or ref name does not resolve, or resolves ambiguously.
    #[error("reference `{name}` could not be resolved: {message}")]
    Reference { name: String, message: String },

    #[error("branches `{from}` and `{to}` share no common ancestor")]
    NoCommonAncestor { from: String, to: String },

    /// Two commits share a fingerprint but their metadata disagrees. Needs a human.
    #[error(
        "unexpected differences between {from_title} ({from}) and {to_title} ({to}): \
         same patch content but different title or author date"
    )]
    ReconciliationAmbiguity {
        from: CommitId,
        from_title: String,
        to: CommitId,
        to_title: String,
    },

    #[error("could not fingerprint commit {commit}: {message}")]
    Fingerprinting { commit: CommitId, message: String },

    /// Replaying `commit` failed. `applied` lists the commits that were already
    /// replayed onto the target branch, oldest first.
    #[error("replay of {commit} onto `{branch}` failed after {} applied commit(s): {message}", .applied.len())]
    ReplayConflict {
        commit: CommitId,
        branch: String,
        applied: Vec<CommitId>,
        message: String,
    },

    /// `git cherry-pick` itself refused or stopped on `commit`.
    #[error("cherry-pick of {commit} failed: {message}")]
    CherryPick { commit: CommitId, message: String },

    #[error("checkout of `{branch}` failed: {message}")]
    Checkout { branch: String, message: String },

    #[error("push of `{branch}` to `{remote}` failed: {message}")]
    Push {
        remote: String,
        branch: String,
        message: String,
    },

    #[error("git {} exited with {}: {stderr}", .args.join(" "), .code.map_or("signal".to_string(), |c| c.to_string()))]
    GitCliError {
        code: Option<i32>,
        stderr: String,
        args: Vec<String>,
    },

    #[error("could not parse commit metadata: {0}")]
    CommitParse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("From UTF-8 error: {0}")]
    FromUtf8Error(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Generic(String),
}

impl ReconcileError {
    pub fn ambiguity(from: &Commit, to: &Commit) -> Self {
        ReconcileError::ReconciliationAmbiguity {
            from: from.id.clone(),
            from_title: from.title.clone(),
            to: to.id.clone(),
            to_title: to.title.clone(),
        }
    }

    /// Stderr of a failed git invocation, or the display form for any other error.
    pub fn git_message(&self) -> String {
        match self {
            ReconcileError::GitCliError { stderr, .. } => stderr.trim().to_string(),
            ReconcileError::CherryPick { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
