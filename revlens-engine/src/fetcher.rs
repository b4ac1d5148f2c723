//! Repository fetching with default-branch fallback
//!
//! Different repositories use different default-branch conventions; the
//! engine tries the primary convention first and retries once with the
//! secondary so callers never need to know which one applies.

use revlens_core::{RevlensResult, VcsBackend};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

pub const PRIMARY_DEFAULT_BRANCH: &str = "main";
pub const SECONDARY_DEFAULT_BRANCH: &str = "master";

/// Obtains a local working copy of a remote repository
pub struct RepositoryFetcher<'a> {
    backend: &'a dyn VcsBackend,
}

impl<'a> RepositoryFetcher<'a> {
    pub fn new(backend: &'a dyn VcsBackend) -> Self {
        Self { backend }
    }

    /// Clone `url` into a directory under `workspace` and return its path.
    pub fn fetch(&self, url: &str, workspace: &Path) -> RevlensResult<PathBuf> {
        let dest = workspace.join(repo_dir_name(url));
        scrub(&dest);

        debug!(url, branch = PRIMARY_DEFAULT_BRANCH, "Cloning repository");
        match self
            .backend
            .clone_with_branch(url, PRIMARY_DEFAULT_BRANCH, &dest)
        {
            Ok(()) => Ok(dest),
            Err(primary) => {
                // A failed attempt can leave a partial checkout behind.
                scrub(&dest);

                debug!(
                    url,
                    branch = SECONDARY_DEFAULT_BRANCH,
                    "Primary default branch failed, retrying with secondary"
                );
                match self
                    .backend
                    .clone_with_branch(url, SECONDARY_DEFAULT_BRANCH, &dest)
                {
                    Ok(()) => Ok(dest),
                    // The second failure is usually just "no such branch
                    // either"; the first message carries the root cause.
                    Err(_secondary) => Err(primary),
                }
            }
        }
    }
}

/// Directory name for a clone, derived from the URL's trailing path segment
/// (minus any `.git` suffix). Unparseable URLs fall back to a generated
/// unique name.
pub fn repo_dir_name(url: &str) -> String {
    let trailing = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .map(|s| s.to_string()),
        // scp-style remotes (git@host:owner/repo.git) and plain paths are
        // not URL-parseable; take whatever follows the last separator.
        Err(_) => url
            .trim_end_matches('/')
            .rsplit(['/', ':'])
            .next()
            .map(|s| s.to_string()),
    };

    let name = trailing
        .as_deref()
        .map(|s| s.strip_suffix(".git").unwrap_or(s))
        .unwrap_or("");

    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();

    if sanitized.is_empty() {
        format!("repo-{}", uuid::Uuid::new_v4().simple())
    } else {
        sanitized
    }
}

fn scrub(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_dir_all(path) {
            warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove stale clone directory"
            );
        }
    }
}
