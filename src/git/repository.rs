use crate::config::Config;
use crate::error::ReconcileError;
use crate::git::commit::{Commit, CommitId, parse_fuller_format};
use crate::git::gateway::VersionControl;
use crate::git::patch_id::{CommitFingerprint, parse_patch_id_output};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

// Keeps `git show` argv well under platform command-line limits.
const FINGERPRINT_BATCH_SIZE: usize = 256;

/// Handle on a git working tree. Every git invocation runs as `git -C <path> ...`,
/// so nothing depends on the process's current directory.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    remote: String,
}

pub fn find_repository() -> Result<Repository, ReconcileError> {
    find_repository_in_path(Config::get().repo_dir())
}

/// Open the repository containing `path`, rooted at its top-level directory.
pub fn find_repository_in_path(path: impl AsRef<Path>) -> Result<Repository, ReconcileError> {
    let path = path.as_ref();
    let args = vec![
        "-C".to_string(),
        path.to_string_lossy().to_string(),
        "rev-parse".to_string(),
        "--show-toplevel".to_string(),
    ];
    let output = exec_git(&args).map_err(|e| {
        ReconcileError::Generic(format!(
            "{} is not inside a git repository: {}",
            path.display(),
            e.git_message()
        ))
    })?;
    let toplevel = String::from_utf8(output.stdout)?.trim().to_string();
    Ok(Repository {
        path: PathBuf::from(toplevel),
        remote: Config::get().remote_name().to_string(),
    })
}

impl Repository {
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Leading arguments for every git call against this repository.
    pub fn global_args_for_exec(&self) -> Vec<String> {
        vec!["-C".to_string(), self.path.to_string_lossy().to_string()]
    }

    fn git(&self, args: &[&str]) -> Result<Output, ReconcileError> {
        let mut full = self.global_args_for_exec();
        full.extend(args.iter().map(|a| a.to_string()));
        exec_git(&full)
    }

    fn git_stdout(&self, args: &[&str]) -> Result<String, ReconcileError> {
        let output = self.git(args)?;
        Ok(String::from_utf8(output.stdout)?)
    }

    pub fn head_hash(&self) -> Result<CommitId, ReconcileError> {
        let out = self.git_stdout(&["rev-parse", "HEAD"])?;
        Ok(CommitId::new(out.trim()))
    }

    /// Full message of `rev`, as written by the committer.
    pub fn commit_message(&self, rev: &str) -> Result<String, ReconcileError> {
        self.git_stdout(&["log", "-1", "--format=%B", rev])
    }

    /// Full ref names `name` can stand for, following git's lookup rules
    /// (`refs/<name>`, `refs/tags/<name>`, `refs/heads/<name>`,
    /// `refs/remotes/<name>`, `refs/remotes/<name>/HEAD`).
    fn matching_refs(&self, name: &str) -> Result<Vec<String>, ReconcileError> {
        let mut candidates = vec![
            format!("refs/{}", name),
            format!("refs/tags/{}", name),
            format!("refs/heads/{}", name),
            format!("refs/remotes/{}", name),
            format!("refs/remotes/{}/HEAD", name),
        ];
        if name.starts_with("refs/") {
            candidates.insert(0, name.to_string());
        }

        let mut args = vec!["for-each-ref", "--format=%(refname)"];
        args.extend(candidates.iter().map(String::as_str));
        let out = self.git_stdout(&args)?;

        // for-each-ref also matches everything below a pattern, so keep exact names only
        let listed: Vec<&str> = out.lines().map(str::trim).collect();
        Ok(candidates
            .into_iter()
            .filter(|c| listed.contains(&c.as_str()))
            .collect())
    }

    fn peel_to_commit(&self, rev: &str) -> Result<CommitId, ReconcileError> {
        let spec = format!("{}^{{commit}}", rev);
        let out = self
            .git_stdout(&["rev-parse", "--verify", "--quiet", &spec])
            .map_err(|e| ReconcileError::Reference {
                name: rev.to_string(),
                message: match e.git_message() {
                    msg if msg.is_empty() => "unknown revision".to_string(),
                    msg => msg,
                },
            })?;
        Ok(CommitId::new(out.trim()))
    }

    /// Parent ids of each commit, keyed by commit.
    fn parents_of(
        &self,
        commits: &[CommitId],
    ) -> Result<HashMap<CommitId, Vec<CommitId>>, ReconcileError> {
        let mut args = vec!["log", "--no-walk=unsorted", "--format=%H %P"];
        args.extend(commits.iter().map(CommitId::as_str));
        let out = self.git_stdout(&args)?;
        let mut parents = HashMap::new();
        for line in out.lines() {
            let mut ids = line.split_whitespace().map(CommitId::new);
            if let Some(commit) = ids.next() {
                parents.insert(commit, ids.collect());
            }
        }
        Ok(parents)
    }

    fn fingerprint_batch(
        &self,
        commits: &[CommitId],
    ) -> Result<Vec<CommitFingerprint>, ReconcileError> {
        // patch-id only understands single-parent diffs
        let parents = self.parents_of(commits)?;
        if let Some(merge) = commits
            .iter()
            .find(|c| parents.get(*c).is_some_and(|p| p.len() > 1))
        {
            return Err(ReconcileError::Fingerprinting {
                commit: merge.clone(),
                message: "merge commits have no single-parent patch to fingerprint".to_string(),
            });
        }

        let mut show_args = vec![
            "show",
            "--no-color",
            "--no-ext-diff",
            "--no-decorate",
            "--pretty=medium",
        ];
        show_args.extend(commits.iter().map(CommitId::as_str));
        let patches = self.git(&show_args)?;

        let mut patch_id_args = self.global_args_for_exec();
        patch_id_args.push("patch-id".to_string());
        patch_id_args.push("--stable".to_string());
        let output = exec_git_stdin(&patch_id_args, &patches.stdout)?;
        let parsed = parse_patch_id_output(&String::from_utf8(output.stdout)?)?;

        let by_commit: HashMap<CommitId, CommitFingerprint> = parsed
            .into_iter()
            .map(|fp| (fp.commit.clone(), fp))
            .collect();
        commits
            .iter()
            .map(|commit| {
                by_commit
                    .get(commit)
                    .cloned()
                    .ok_or_else(|| ReconcileError::Fingerprinting {
                        commit: commit.clone(),
                        message: "git patch-id produced no fingerprint".to_string(),
                    })
            })
            .collect()
    }
}

impl VersionControl for Repository {
    fn resolve_reference(&self, name: &str) -> Result<CommitId, ReconcileError> {
        if name.is_empty() || name.starts_with('-') {
            return Err(ReconcileError::Reference {
                name: name.to_string(),
                message: "not a valid reference name".to_string(),
            });
        }

        let refs = self.matching_refs(name)?;
        if refs.is_empty() {
            // Object ids and revision expressions such as `main~2`
            let id = self.peel_to_commit(name)?;
            debug!(name, id = %id, "resolved revision");
            return Ok(id);
        }

        let mut targets: Vec<(String, CommitId)> = Vec::with_capacity(refs.len());
        for refname in refs {
            let id = self
                .peel_to_commit(&refname)
                .map_err(|e| ReconcileError::Reference {
                    name: name.to_string(),
                    message: format!("{} does not point at a commit: {}", refname, e.git_message()),
                })?;
            targets.push((refname, id));
        }
        let first = &targets[0].1;
        if targets.iter().any(|(_, id)| id != first) {
            let listing = targets
                .iter()
                .map(|(refname, id)| format!("{} -> {}", refname, id.short()))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ReconcileError::Reference {
                name: name.to_string(),
                message: format!("reference is ambiguous: {}", listing),
            });
        }
        debug!(name, id = %first, refs = targets.len(), "resolved reference");
        Ok(first.clone())
    }

    fn list_commits_exclusive(
        &self,
        base: &CommitId,
        tip: &CommitId,
    ) -> Result<Vec<CommitId>, ReconcileError> {
        let range = format!("{}..{}", base, tip);
        let out = self.git_stdout(&["rev-list", &range, "--", "."])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(CommitId::new)
            .collect())
    }

    fn merge_base(&self, a: &CommitId, b: &CommitId) -> Result<Option<CommitId>, ReconcileError> {
        match self.git(&["merge-base", a.as_str(), b.as_str()]) {
            Ok(output) => {
                let id = String::from_utf8(output.stdout)?.trim().to_string();
                Ok(Some(CommitId::new(id)))
            }
            // merge-base exits 1 with no output when the histories are unrelated
            Err(ReconcileError::GitCliError { code: Some(1), .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn fingerprint_commits(
        &self,
        commits: &[CommitId],
    ) -> Result<Vec<CommitFingerprint>, ReconcileError> {
        let mut result = Vec::with_capacity(commits.len());
        for batch in commits.chunks(FINGERPRINT_BATCH_SIZE) {
            result.extend(self.fingerprint_batch(batch)?);
        }
        Ok(result)
    }

    fn read_commit_metadata(&self, commit: &CommitId) -> Result<Commit, ReconcileError> {
        let out = self.git_stdout(&[
            "show",
            "--no-color",
            "--format=fuller",
            "--date=unix",
            "--shortstat",
            commit.as_str(),
        ])?;
        parse_fuller_format(&out)
    }

    fn current_branch(&self) -> Result<String, ReconcileError> {
        let out = self
            .git_stdout(&["symbolic-ref", "--short", "HEAD"])
            .map_err(|e| ReconcileError::Reference {
                name: "HEAD".to_string(),
                message: format!("HEAD is not on a branch: {}", e.git_message()),
            })?;
        Ok(out.trim().to_string())
    }

    fn checkout(&self, branch: &str) -> Result<(), ReconcileError> {
        debug!(branch, "checkout");
        self.git(&["checkout", "--quiet", branch])
            .map(|_| ())
            .map_err(|e| ReconcileError::Checkout {
                branch: branch.to_string(),
                message: e.git_message(),
            })
    }

    fn replay_onto(&self, commit: &CommitId) -> Result<CommitId, ReconcileError> {
        debug!(commit = %commit, "cherry-pick");
        self.git(&["cherry-pick", "-x", commit.as_str()])
            .map_err(|e| ReconcileError::CherryPick {
                commit: commit.clone(),
                message: e.git_message(),
            })?;
        self.head_hash()
    }

    fn push(&self, branch: &str) -> Result<(), ReconcileError> {
        debug!(remote = %self.remote, branch, "push");
        self.git(&["push", &self.remote, branch])
            .map(|_| ())
            .map_err(|e| ReconcileError::Push {
                remote: self.remote.clone(),
                branch: branch.to_string(),
                message: e.git_message(),
            })
    }
}

/// Run git with `args`, failing with [`ReconcileError::GitCliError`] on a non-zero exit.
pub fn exec_git(args: &[String]) -> Result<Output, ReconcileError> {
    debug!(?args, "exec git");
    let output = Command::new(Config::get().git_cmd())
        .args(args)
        .stdin(Stdio::null())
        .output()?;
    check_status(args, output)
}

/// Like [`exec_git`], feeding `stdin` to the child process.
pub fn exec_git_stdin(args: &[String], stdin: &[u8]) -> Result<Output, ReconcileError> {
    debug!(?args, stdin_len = stdin.len(), "exec git with stdin");
    let mut child = Command::new(Config::get().git_cmd())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut child_stdin) = child.stdin.take() {
        child_stdin.write_all(stdin)?;
    }

    let output = child.wait_with_output()?;
    check_status(args, output)
}

fn check_status(args: &[String], output: Output) -> Result<Output, ReconcileError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(ReconcileError::GitCliError {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            args: args.to_vec(),
        })
    }
}
