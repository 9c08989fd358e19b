use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_REMOTE: &str = "origin";

/// Centralized configuration for the application
pub struct Config {
    git_path: String,
    remote_name: String,
    repo_dir: PathBuf,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    /// Initialize the global configuration exactly once.
    /// Safe to call multiple times; subsequent calls are no-ops.
    pub fn init() {
        let _ = Self::get();
    }

    /// Access the global configuration, resolving it from the environment on first use.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| Config {
            git_path: resolve_git_path(),
            remote_name: non_empty_env("GIT_REMOTE_NAME").unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            repo_dir: non_empty_env("GIT_REPO_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    /// Returns the command to invoke git.
    pub fn git_cmd(&self) -> &str {
        &self.git_path
    }

    /// Remote used by `push` when none is given on the command line.
    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }

    /// Repository directory used when `-C` is not given.
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }
}

const GIT_CANDIDATES: &[&str] = &[
    "/opt/homebrew/bin/git",
    "/usr/local/bin/git",
    "/usr/bin/git",
    "/bin/git",
    r"C:\Program Files\Git\bin\git.exe",
];

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn resolve_git_path() -> String {
    // 1) Environment override
    if let Some(val) = non_empty_env("GIT_RECONCILE_GIT") {
        return val;
    }

    // 2) Probe common locations, then fall back to PATH resolution
    if let Some(found) = GIT_CANDIDATES.iter().map(Path::new).find(|p| p.is_file()) {
        return found.to_string_lossy().to_string();
    }

    "git".to_string()
}
