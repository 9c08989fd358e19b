use clap::{Parser, Subcommand};
use git_reconcile::commands;
use git_reconcile::commands::sync::SyncOptions;
use git_reconcile::config::Config;
use git_reconcile::error::ReconcileError;
use git_reconcile::git::{Repository, find_repository, find_repository_in_path};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "git-reconcile")]
#[command(about = "Sync a long-lived branch with another by patch content, not commit id", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Run as if started in <path> (defaults to $GIT_REPO_DIR, then the current directory)
    #[arg(short = 'C', long = "repo", global = true)]
    repo: Option<PathBuf>,

    /// Remote used by --push (defaults to $GIT_REMOTE_NAME, then "origin")
    #[arg(long, global = true)]
    remote: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List commits each branch has that the other lacks, by patch content
    Diff {
        #[arg(long)]
        from_branch: String,
        #[arg(long)]
        to_branch: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay commits missing from --to-branch onto it, oldest first
    Sync {
        #[arg(long)]
        from_branch: String,
        #[arg(long)]
        to_branch: String,
        /// Show what would be replayed without touching the repository
        #[arg(long)]
        dry_run: bool,
        /// Push --to-branch after a successful replay
        #[arg(long)]
        push: bool,
    },
    /// Print the metadata used to disambiguate duplicated patches
    Show {
        rev: String,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_logging();
    Config::init();

    let cli = Cli::parse();
    let repo = match open_repository(&cli) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("Failed to find repository: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Diff {
            from_branch,
            to_branch,
            json,
        } => commands::diff::run(&repo, &from_branch, &to_branch, json),
        Command::Sync {
            from_branch,
            to_branch,
            dry_run,
            push,
        } => handle_sync(
            &repo,
            SyncOptions {
                from_branch,
                to_branch,
                dry_run,
                push,
            },
        ),
        Command::Show { rev, json } => commands::show::run(&repo, &rev, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let ReconcileError::ReplayConflict { branch, applied, .. } = &e {
            eprintln!(
                "{} is left checked out with {} replayed commit(s); resolve the conflict by hand",
                branch,
                applied.len()
            );
            for id in applied {
                eprintln!("  applied {}", id);
            }
        }
        std::process::exit(1);
    }
}

fn handle_sync(repo: &Repository, options: SyncOptions) -> Result<(), ReconcileError> {
    let progress = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{bar:30.green} {pos}/{len} replaying {msg}") {
        progress.set_style(style);
    }
    let summary = commands::sync::run(repo, &options, repo.remote(), &progress)?;
    print!("{}", commands::sync::format_summary(&options, &summary));
    Ok(())
}

fn open_repository(cli: &Cli) -> Result<Repository, ReconcileError> {
    let repo = match &cli.repo {
        Some(path) => find_repository_in_path(path)?,
        None => find_repository()?,
    };
    Ok(match &cli.remote {
        Some(remote) => repo.with_remote(remote.clone()),
        None => repo,
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("GIT_RECONCILE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
