//! Core trait definitions

use crate::error::RevlensResult;
use crate::types::{CommitMeta, FileChangeRecord};
use std::path::Path;

/// Narrow capability surface over the underlying version-control toolchain.
///
/// The engine depends on exactly these three operations, so the concrete
/// toolchain (embedded library, shelled-out binary, scripted test double)
/// can be swapped without touching fetcher, walker, or inspector. The
/// operations are synchronous; callers that must not block move them onto
/// a blocking pool.
pub trait VcsBackend: Send + Sync {
    /// Clone `url` into `dest`, checking out the named branch.
    ///
    /// Must fail fast instead of prompting for credentials.
    fn clone_with_branch(&self, url: &str, branch: &str, dest: &Path) -> RevlensResult<()>;

    /// Walk ancestry from the repository head, most recent first, visiting
    /// at most `limit` commits.
    fn walk_from_head(&self, repo_path: &Path, limit: usize) -> RevlensResult<Vec<CommitMeta>>;

    /// Diff a commit against its first parent (or the empty tree for a root
    /// commit) and return one record per changed file.
    fn diff_against_parent(
        &self,
        repo_path: &Path,
        commit_id: &str,
    ) -> RevlensResult<Vec<FileChangeRecord>>;
}
