//! Scratch workspace management
//!
//! Each analysis invocation gets its own uniquely-named directory under a
//! configured scratch root. Cleanup is best-effort and never escalates: a
//! leftover directory must not mask or block the primary result.

use revlens_core::{ErrorContext, RevlensError, RevlensResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Owns the scratch area and hands out per-invocation workspaces
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

/// A provisioned workspace directory, valid until released
#[derive(Debug)]
pub struct WorkspaceHandle {
    path: PathBuf,
}

impl WorkspaceHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkspaceManager {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Provision a fresh workspace directory for one analysis.
    ///
    /// The directory name is salted so concurrent invocations against the
    /// same repository never share a path. Any stale directory at the chosen
    /// path is removed first, best-effort.
    pub fn acquire(&self, repo_name: &str) -> RevlensResult<WorkspaceHandle> {
        fs::create_dir_all(&self.root).map_err(|e| RevlensError::Workspace {
            message: format!("Failed to create scratch root {}: {}", self.root.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("workspace_manager")
                .with_operation("acquire")
                .with_suggestion("Check that the workspace root is writable"),
        })?;

        let salt = uuid::Uuid::new_v4().simple().to_string();
        let dir_name = format!("{}-{}", sanitize_name(repo_name), &salt[..8]);
        let path = self.root.join(dir_name);

        if path.exists() {
            if let Err(e) = fs::remove_dir_all(&path) {
                warn!(
                    workspace = %path.display(),
                    error = %e,
                    "Failed to remove pre-existing workspace directory"
                );
            }
        }

        fs::create_dir_all(&path).map_err(|e| RevlensError::Workspace {
            message: format!("Failed to create workspace {}: {}", path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("workspace_manager").with_operation("acquire"),
        })?;

        debug!(workspace = %path.display(), "Workspace acquired");
        Ok(WorkspaceHandle { path })
    }

    /// Recursively delete a workspace.
    ///
    /// Idempotent; failures are logged and swallowed.
    pub fn release(&self, handle: &WorkspaceHandle) {
        match fs::remove_dir_all(&handle.path) {
            Ok(()) => debug!(workspace = %handle.path.display(), "Workspace released"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Already gone; release must tolerate double cleanup.
            }
            Err(e) => {
                warn!(
                    workspace = %handle.path.display(),
                    error = %e,
                    "Workspace cleanup failed"
                );
            }
        }
    }
}

/// Keep only filesystem-safe characters from a repository name
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "workspace".to_string()
    } else {
        cleaned
    }
}
