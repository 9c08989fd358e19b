use crate::error::ReconcileError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Full hex object id of a commit, as printed by git.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        CommitId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for human-facing output.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        &self.0[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        CommitId(id.to_string())
    }
}

impl From<String> for CommitId {
    fn from(id: String) -> Self {
        CommitId(id)
    }
}

/// Commit metadata as read from `git show --format=fuller --date=unix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: CommitId,
    pub author: String,
    pub author_date: DateTime<Utc>,
    pub commit_date: Option<DateTime<Utc>>,
    pub title: String,
    pub body: String,
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.id)
    }
}

/// Parse the output of `git show --format=fuller --date=unix [--shortstat] <rev>`:
///
/// ```text
/// commit <sha>
/// Merge: <p1> <p2>          (merge commits only)
/// Author:     <author>
/// AuthorDate: <unix seconds>
/// Commit:     <committer>
/// CommitDate: <unix seconds>
///
///     <title>
///
///     <body>
///
///  N files changed, ...
/// ```
pub fn parse_fuller_format(output: &str) -> Result<Commit, ReconcileError> {
    let mut lines: Vec<&str> = output.lines().collect();
    if lines.len() > 1 && lines[1].starts_with("Merge:") {
        lines.remove(1);
    }
    if lines.len() < 6 {
        return Err(ReconcileError::CommitParse(format!(
            "expected at least 6 header lines, got {}",
            lines.len()
        )));
    }

    let id = lines[0]
        .strip_prefix("commit ")
        .and_then(|rest| rest.split_whitespace().next())
        .ok_or_else(|| ReconcileError::CommitParse(format!("bad commit line: {:?}", lines[0])))?;
    let author = header_value(lines[1], "Author:")?;
    let author_date = parse_unix_date(header_value(lines[2], "AuthorDate:")?)?;
    header_value(lines[3], "Commit:")?;
    let commit_date = parse_unix_date(header_value(lines[4], "CommitDate:")?)?;
    if !lines[5].is_empty() {
        return Err(ReconcileError::CommitParse(format!(
            "expected blank line after headers, got {:?}",
            lines[5]
        )));
    }

    // Message lines are indented by four spaces; the shortstat trailer by one.
    let mut message: Vec<&str> = Vec::new();
    for line in &lines[6..] {
        if let Some(text) = line.strip_prefix("    ") {
            message.push(text);
        } else if line.trim().is_empty() {
            message.push("");
        } else {
            break;
        }
    }
    while message.last().is_some_and(|l| l.is_empty()) {
        message.pop();
    }

    let title = message.first().map(|t| t.trim().to_string()).unwrap_or_default();
    let body = message
        .iter()
        .skip(1)
        .skip_while(|l| l.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Commit {
        id: CommitId::new(id),
        author: author.to_string(),
        author_date,
        commit_date: Some(commit_date),
        title,
        body,
    })
}

fn header_value<'a>(line: &'a str, key: &str) -> Result<&'a str, ReconcileError> {
    line.strip_prefix(key)
        .map(str::trim)
        .ok_or_else(|| ReconcileError::CommitParse(format!("expected `{}` header, got {:?}", key, line)))
}

fn parse_unix_date(value: &str) -> Result<DateTime<Utc>, ReconcileError> {
    let secs: i64 = value
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ReconcileError::CommitParse(format!("bad unix timestamp {:?}", value)))?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| ReconcileError::CommitParse(format!("timestamp out of range: {}", secs)))
}
