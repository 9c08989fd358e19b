use crate::error::ReconcileError;
use crate::git::commit::CommitId;
use serde::Serialize;
use std::fmt;

/// A `git patch-id --stable` hash. Two commits with equal fingerprints introduce
/// the same change, whatever their ids, dates or messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Fingerprint(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFingerprint {
    pub commit: CommitId,
    pub fingerprint: Fingerprint,
}

/// Parse `git patch-id` output, one `<patch-id> <commit-id>` pair per line, in input order.
pub fn parse_patch_id_output(output: &str) -> Result<Vec<CommitFingerprint>, ReconcileError> {
    let mut result = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(fingerprint), Some(commit), None) => result.push(CommitFingerprint {
                commit: CommitId::new(commit),
                fingerprint: Fingerprint::new(fingerprint),
            }),
            _ => {
                return Err(ReconcileError::Fingerprinting {
                    commit: CommitId::new(line),
                    message: format!("unexpected patch-id output line {:?}", line),
                });
            }
        }
    }
    Ok(result)
}
