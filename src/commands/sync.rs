use crate::error::ReconcileError;
use crate::git::commit::CommitId;
use crate::git::gateway::VersionControl;
use crate::reconcile::{
    ReplayOutcome, ReplayReport, compute_branch_diffs, plan_replay, replay_commits_with_progress,
};
use indicatif::ProgressBar;
use std::fmt::Write;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub from_branch: String,
    pub to_branch: String,
    pub dry_run: bool,
    pub push: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncSummary {
    NothingToDo {
        /// Commits on the target that the source lacks; never replayed.
        only_on_target: usize,
    },
    DryRun {
        plan: Vec<CommitId>,
        only_on_target: usize,
    },
    Replayed {
        report: ReplayReport,
        only_on_target: usize,
        pushed_to: Option<String>,
    },
}

/// Replay the commits `from_branch` has and `to_branch` lacks onto `to_branch`,
/// then optionally push `to_branch`.
pub fn run<V: VersionControl + ?Sized>(
    vcs: &V,
    options: &SyncOptions,
    remote: &str,
    progress: &ProgressBar,
) -> Result<SyncSummary, ReconcileError> {
    let diff = compute_branch_diffs(vcs, &options.from_branch, &options.to_branch)?;
    let only_on_target = diff.unique_to_to.len();

    if options.dry_run {
        return Ok(SyncSummary::DryRun {
            plan: plan_replay(&diff.unique_to_from),
            only_on_target,
        });
    }

    match replay_commits_with_progress(vcs, &diff.unique_to_from, &options.to_branch, progress)? {
        ReplayOutcome::NothingToDo => Ok(SyncSummary::NothingToDo { only_on_target }),
        ReplayOutcome::Replayed(report) => {
            let pushed_to = if options.push {
                vcs.push(&options.to_branch)?;
                Some(remote.to_string())
            } else {
                None
            };
            Ok(SyncSummary::Replayed {
                report,
                only_on_target,
                pushed_to,
            })
        }
    }
}

pub fn format_summary(options: &SyncOptions, summary: &SyncSummary) -> String {
    let mut out = String::new();
    let only_on_target = match summary {
        SyncSummary::NothingToDo { only_on_target } => {
            let _ = writeln!(out, "Nothing to do");
            *only_on_target
        }
        SyncSummary::DryRun {
            plan,
            only_on_target,
        } => {
            let _ = writeln!(
                out,
                "Would replay {} commit(s) from {} onto {}:",
                plan.len(),
                options.from_branch,
                options.to_branch
            );
            for id in plan {
                let _ = writeln!(out, "  {}", id);
            }
            *only_on_target
        }
        SyncSummary::Replayed {
            report,
            only_on_target,
            pushed_to,
        } => {
            let _ = writeln!(
                out,
                "Replayed {} commit(s) from {} onto {}:",
                report.commits.len(),
                options.from_branch,
                report.target_branch
            );
            for commit in &report.commits {
                let _ = writeln!(out, "  {} -> {}", commit.source.short(), commit.replayed.short());
            }
            if let Some(remote) = pushed_to {
                let _ = writeln!(out, "Pushed {} to {}", report.target_branch, remote);
            }
            *only_on_target
        }
    };
    if only_on_target > 0 {
        let _ = writeln!(
            out,
            "Note: {} commit(s) on {} are not on {}",
            only_on_target, options.to_branch, options.from_branch
        );
    }
    out
}
