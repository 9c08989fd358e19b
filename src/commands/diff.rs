use crate::error::ReconcileError;
use crate::git::commit::CommitId;
use crate::git::gateway::VersionControl;
use crate::reconcile::{BranchDiffResult, compute_branch_diffs};
use std::fmt::Write;

pub fn run<V: VersionControl + ?Sized>(
    vcs: &V,
    from_branch: &str,
    to_branch: &str,
    json: bool,
) -> Result<(), ReconcileError> {
    let diff = compute_branch_diffs(vcs, from_branch, to_branch)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        print!("{}", format_diff(vcs, &diff, from_branch, to_branch)?);
    }
    Ok(())
}

/// Human-readable listing of both sides, one `<short id> <title>` line per commit.
pub fn format_diff<V: VersionControl + ?Sized>(
    vcs: &V,
    diff: &BranchDiffResult,
    from_branch: &str,
    to_branch: &str,
) -> Result<String, ReconcileError> {
    let mut out = String::new();
    let _ = writeln!(out, "merge base: {}", diff.merge_base);
    if diff.is_empty() {
        let _ = writeln!(
            out,
            "{} and {} contain the same changes",
            from_branch, to_branch
        );
        return Ok(out);
    }
    write_side(vcs, &mut out, &diff.unique_to_from, from_branch, to_branch)?;
    write_side(vcs, &mut out, &diff.unique_to_to, to_branch, from_branch)?;
    Ok(out)
}

fn write_side<V: VersionControl + ?Sized>(
    vcs: &V,
    out: &mut String,
    commits: &[CommitId],
    present_on: &str,
    missing_from: &str,
) -> Result<(), ReconcileError> {
    let _ = writeln!(
        out,
        "{} commit(s) on {} missing from {}:",
        commits.len(),
        present_on,
        missing_from
    );
    for id in commits {
        let commit = vcs.read_commit_metadata(id)?;
        let _ = writeln!(out, "  {} {}", id.short(), commit.title);
    }
    Ok(())
}
