#![allow(dead_code)]

use git_reconcile::git::{Repository, find_repository_in_path};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Scratch git repository on `main` with a single initial commit.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = Self { dir };
        repo.git(&["init", "--quiet"]).expect("git init should succeed");
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"])
            .expect("should point HEAD at main");
        repo.git(&["config", "user.name", "Test User"]).unwrap();
        repo.git(&["config", "user.email", "test@example.com"]).unwrap();
        repo.git(&["config", "commit.gpgsign", "false"]).unwrap();
        repo.commit_file("README.md", "hello\n", "Initial commit");
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) -> Result<String, String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args(args)
            .output()
            .unwrap_or_else(|e| panic!("Failed to execute git {:?}: {}", args, e));

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(stdout)
        } else {
            Err(stderr)
        }
    }

    pub fn write_file(&self, name: &str, contents: &str) {
        fs::write(self.path().join(name), contents).expect("failed to write file");
    }

    pub fn read_file(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.path().join(name)).ok()
    }

    /// Write `name`, commit it with `message` and return the new commit id.
    pub fn commit_file(&self, name: &str, contents: &str, message: &str) -> String {
        self.write_file(name, contents);
        self.git(&["add", name]).expect("add should succeed");
        self.git(&["commit", "--quiet", "-m", message])
            .expect("commit should succeed");
        self.rev_parse("HEAD")
    }

    pub fn rev_parse(&self, rev: &str) -> String {
        self.git(&["rev-parse", rev])
            .expect("rev-parse should succeed")
            .trim()
            .to_string()
    }

    pub fn current_branch(&self) -> String {
        self.git(&["symbolic-ref", "--short", "HEAD"])
            .expect("HEAD should be on a branch")
            .trim()
            .to_string()
    }

    pub fn checkout(&self, branch: &str) {
        self.git(&["checkout", "--quiet", branch])
            .expect("checkout should succeed");
    }

    pub fn create_branch(&self, name: &str) {
        self.git(&["branch", name]).expect("branch should succeed");
    }

    pub fn cherry_pick(&self, rev: &str) -> String {
        self.git(&["cherry-pick", rev]).expect("cherry-pick should succeed");
        self.rev_parse("HEAD")
    }

    pub fn repository(&self) -> Repository {
        find_repository_in_path(self.path()).expect("should open test repository")
    }
}
