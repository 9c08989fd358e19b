//! In-memory [`VersionControl`] for unit tests of branch diffing and replay.

use crate::error::ReconcileError;
use crate::git::commit::{Commit, CommitId};
use crate::git::gateway::VersionControl;
use crate::git::patch_id::{CommitFingerprint, Fingerprint};
use chrono::DateTime;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeOp {
    Checkout(String),
    Replay { commit: CommitId, branch: String },
    Push(String),
}

#[derive(Debug, Clone)]
struct FakeCommit {
    fingerprint: Option<String>,
    title: String,
    author_ts: i64,
}

/// Branches hang off a single shared merge base; each branch is listed newest-first.
pub struct FakeVcs {
    base: Option<CommitId>,
    refs: HashMap<String, CommitId>,
    ambiguous: HashSet<String>,
    ranges: HashMap<CommitId, Vec<CommitId>>,
    commits: HashMap<CommitId, FakeCommit>,
    failing_replays: HashSet<CommitId>,
    failing_after_replay: HashSet<CommitId>,
    failing_checkouts: HashSet<String>,
    current: RefCell<String>,
    ops: RefCell<Vec<FakeOp>>,
    metadata_reads: RefCell<Vec<CommitId>>,
}

impl FakeVcs {
    pub fn new(current_branch: &str) -> Self {
        FakeVcs {
            base: Some(CommitId::new("base")),
            refs: HashMap::new(),
            ambiguous: HashSet::new(),
            ranges: HashMap::new(),
            commits: HashMap::new(),
            failing_replays: HashSet::new(),
            failing_after_replay: HashSet::new(),
            failing_checkouts: HashSet::new(),
            current: RefCell::new(current_branch.to_string()),
            ops: RefCell::new(Vec::new()),
            metadata_reads: RefCell::new(Vec::new()),
        }
    }

    pub fn unrelated(mut self) -> Self {
        self.base = None;
        self
    }

    /// Add a branch whose commits since the merge base are `commits`, newest first.
    pub fn branch(mut self, name: &str, commits: &[&str]) -> Self {
        let tip = match commits.first() {
            Some(tip) => CommitId::new(*tip),
            None => CommitId::new("base"),
        };
        self.ranges
            .insert(tip.clone(), commits.iter().map(|c| CommitId::new(*c)).collect());
        self.refs.insert(name.to_string(), tip);
        self
    }

    pub fn commit(mut self, id: &str, fingerprint: &str, title: &str, author_ts: i64) -> Self {
        self.commits.insert(
            CommitId::new(id),
            FakeCommit {
                fingerprint: Some(fingerprint.to_string()),
                title: title.to_string(),
                author_ts,
            },
        );
        self
    }

    /// A commit git cannot fingerprint, such as a merge.
    pub fn unfingerprintable(mut self, id: &str) -> Self {
        self.commits.insert(
            CommitId::new(id),
            FakeCommit {
                fingerprint: None,
                title: format!("Merge {}", id),
                author_ts: 0,
            },
        );
        self
    }

    pub fn ambiguous_ref(mut self, name: &str) -> Self {
        self.ambiguous.insert(name.to_string());
        self
    }

    pub fn fail_replay_of(mut self, id: &str) -> Self {
        self.failing_replays.insert(CommitId::new(id));
        self
    }

    /// Apply `id`, then fail reading back the new HEAD.
    pub fn fail_after_replay_of(mut self, id: &str) -> Self {
        self.failing_after_replay.insert(CommitId::new(id));
        self
    }

    pub fn fail_checkout_of(mut self, branch: &str) -> Self {
        self.failing_checkouts.insert(branch.to_string());
        self
    }

    pub fn ops(&self) -> Vec<FakeOp> {
        self.ops.borrow().clone()
    }

    pub fn checkouts(&self) -> Vec<String> {
        self.ops
            .borrow()
            .iter()
            .filter_map(|op| match op {
                FakeOp::Checkout(b) => Some(b.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn replayed(&self) -> Vec<CommitId> {
        self.ops
            .borrow()
            .iter()
            .filter_map(|op| match op {
                FakeOp::Replay { commit, .. } => Some(commit.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn metadata_reads(&self) -> Vec<CommitId> {
        self.metadata_reads.borrow().clone()
    }

    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }
}

impl VersionControl for FakeVcs {
    fn resolve_reference(&self, name: &str) -> Result<CommitId, ReconcileError> {
        if self.ambiguous.contains(name) {
            return Err(ReconcileError::Reference {
                name: name.to_string(),
                message: "reference is ambiguous".to_string(),
            });
        }
        self.refs
            .get(name)
            .cloned()
            .ok_or_else(|| ReconcileError::Reference {
                name: name.to_string(),
                message: "unknown revision".to_string(),
            })
    }

    fn list_commits_exclusive(
        &self,
        _base: &CommitId,
        tip: &CommitId,
    ) -> Result<Vec<CommitId>, ReconcileError> {
        Ok(self.ranges.get(tip).cloned().unwrap_or_default())
    }

    fn merge_base(&self, _a: &CommitId, _b: &CommitId) -> Result<Option<CommitId>, ReconcileError> {
        Ok(self.base.clone())
    }

    fn fingerprint_commits(
        &self,
        commits: &[CommitId],
    ) -> Result<Vec<CommitFingerprint>, ReconcileError> {
        commits
            .iter()
            .map(|id| {
                let fingerprint = self
                    .commits
                    .get(id)
                    .and_then(|c| c.fingerprint.clone())
                    .ok_or_else(|| ReconcileError::Fingerprinting {
                        commit: id.clone(),
                        message: "merge commits have no single-parent patch to fingerprint"
                            .to_string(),
                    })?;
                Ok(CommitFingerprint {
                    commit: id.clone(),
                    fingerprint: Fingerprint::new(fingerprint),
                })
            })
            .collect()
    }

    fn read_commit_metadata(&self, commit: &CommitId) -> Result<Commit, ReconcileError> {
        self.metadata_reads.borrow_mut().push(commit.clone());
        let fake = self
            .commits
            .get(commit)
            .ok_or_else(|| ReconcileError::CommitParse(format!("unknown commit {}", commit)))?;
        let author_date = DateTime::from_timestamp(fake.author_ts, 0)
            .ok_or_else(|| ReconcileError::CommitParse("bad timestamp".to_string()))?;
        Ok(Commit {
            id: commit.clone(),
            author: "Test User <test@example.com>".to_string(),
            author_date,
            commit_date: Some(author_date),
            title: fake.title.clone(),
            body: String::new(),
        })
    }

    fn current_branch(&self) -> Result<String, ReconcileError> {
        Ok(self.current())
    }

    fn checkout(&self, branch: &str) -> Result<(), ReconcileError> {
        if self.failing_checkouts.contains(branch) {
            return Err(ReconcileError::Checkout {
                branch: branch.to_string(),
                message: "pathspec did not match any file(s) known to git".to_string(),
            });
        }
        self.ops.borrow_mut().push(FakeOp::Checkout(branch.to_string()));
        *self.current.borrow_mut() = branch.to_string();
        Ok(())
    }

    fn replay_onto(&self, commit: &CommitId) -> Result<CommitId, ReconcileError> {
        if self.failing_replays.contains(commit) {
            return Err(ReconcileError::CherryPick {
                commit: commit.clone(),
                message: format!("error: could not apply {}\nCONFLICT (content)", commit.short()),
            });
        }
        self.ops.borrow_mut().push(FakeOp::Replay {
            commit: commit.clone(),
            branch: self.current(),
        });
        if self.failing_after_replay.contains(commit) {
            return Err(ReconcileError::GitCliError {
                code: Some(128),
                stderr: "fatal: unable to read HEAD".to_string(),
                args: vec!["rev-parse".to_string(), "HEAD".to_string()],
            });
        }
        Ok(CommitId::new(format!("{}-replayed", commit)))
    }

    fn push(&self, branch: &str) -> Result<(), ReconcileError> {
        self.ops.borrow_mut().push(FakeOp::Push(branch.to_string()));
        Ok(())
    }
}
