use crate::error::ReconcileError;
use crate::git::commit::Commit;
use crate::git::gateway::VersionControl;

pub fn run<V: VersionControl + ?Sized>(vcs: &V, rev: &str, json: bool) -> Result<(), ReconcileError> {
    let id = vcs.resolve_reference(rev)?;
    let commit = vcs.read_commit_metadata(&id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&commit)?);
    } else {
        print!("{}", format_commit(&commit));
    }
    Ok(())
}

pub fn format_commit(commit: &Commit) -> String {
    let mut out = format!(
        "commit {}\nauthor: {}\nauthor date: {}\n",
        commit.id,
        commit.author,
        commit.author_date.to_rfc3339()
    );
    if let Some(date) = commit.commit_date {
        out.push_str(&format!("commit date: {}\n", date.to_rfc3339()));
    }
    out.push_str(&format!("title: {}\n", commit.title));
    if !commit.body.is_empty() {
        out.push('\n');
        out.push_str(&commit.body);
        out.push('\n');
    }
    out
}
