//! Analysis orchestration
//!
//! Sequences fetch, walk, inspect, and aggregate for one invocation, and
//! guarantees the scratch workspace is released on every exit path.

use crate::aggregator::aggregate;
use crate::fetcher::{repo_dir_name, RepositoryFetcher};
use crate::git::Git2Backend;
use crate::inspector::ChangeInspector;
use crate::walker::CommitRangeWalker;
use crate::workspace::{WorkspaceHandle, WorkspaceManager};
use revlens_core::{
    AnalysisRequest, AnalysisResult, EngineConfig, ErrorContext, RevlensError, RevlensResult,
    VcsBackend,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, info_span};

/// Phases one analysis invocation moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnalysisPhase {
    Fetching,
    Walking,
    Inspecting,
    Aggregating,
    Done,
    Failed,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnalysisPhase::Fetching => "fetching",
            AnalysisPhase::Walking => "walking",
            AnalysisPhase::Inspecting => "inspecting",
            AnalysisPhase::Aggregating => "aggregating",
            AnalysisPhase::Done => "done",
            AnalysisPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Entry point for running analyses
pub struct AnalysisOrchestrator {
    workspaces: WorkspaceManager,
    backend: Arc<dyn VcsBackend>,
}

impl AnalysisOrchestrator {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_backend(config, Arc::new(Git2Backend::new()))
    }

    /// Build an orchestrator over a specific toolchain implementation.
    pub fn with_backend(config: &EngineConfig, backend: Arc<dyn VcsBackend>) -> Self {
        Self {
            workspaces: WorkspaceManager::new(&config.workspace_root),
            backend,
        }
    }

    /// Run one analysis invocation.
    ///
    /// The blocking VCS work runs on the tokio blocking pool, so independent
    /// invocations can proceed concurrently; each owns its own workspace.
    pub async fn analyze(&self, request: AnalysisRequest) -> RevlensResult<AnalysisResult> {
        request.validate()?;

        let workspaces = self.workspaces.clone();
        let backend = Arc::clone(&self.backend);

        tokio::task::spawn_blocking(move || run_analysis(&workspaces, backend.as_ref(), &request))
            .await
            .map_err(|e| RevlensError::Internal {
                message: format!("Analysis task aborted: {e}"),
                source: None,
                context: ErrorContext::new("orchestrator").with_operation("spawn_blocking"),
            })?
    }

    /// Synchronous entry point for callers that already own a worker thread.
    pub fn analyze_blocking(&self, request: &AnalysisRequest) -> RevlensResult<AnalysisResult> {
        request.validate()?;
        run_analysis(&self.workspaces, self.backend.as_ref(), request)
    }
}

/// Releases the workspace when dropped, so cleanup happens on success,
/// failure, and panic alike.
struct ReleaseOnDrop<'a> {
    manager: &'a WorkspaceManager,
    handle: &'a WorkspaceHandle,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.manager.release(self.handle);
    }
}

fn run_analysis(
    workspaces: &WorkspaceManager,
    backend: &dyn VcsBackend,
    request: &AnalysisRequest,
) -> RevlensResult<AnalysisResult> {
    let span = info_span!("analysis", url = %request.repository_url);
    let _entered = span.enter();

    let workspace = workspaces.acquire(&repo_dir_name(&request.repository_url))?;
    let _cleanup = ReleaseOnDrop {
        manager: workspaces,
        handle: &workspace,
    };

    let result = run_pipeline(backend, workspace.path(), request);
    if let Err(e) = &result {
        error!(phase = %AnalysisPhase::Failed, error = %e, "Analysis failed");
    }
    result
}

fn run_pipeline(
    backend: &dyn VcsBackend,
    workspace: &Path,
    request: &AnalysisRequest,
) -> RevlensResult<AnalysisResult> {
    debug!(phase = %AnalysisPhase::Fetching, "Fetching repository");
    let repo_path = RepositoryFetcher::new(backend).fetch(&request.repository_url, workspace)?;

    debug!(phase = %AnalysisPhase::Walking, "Walking commit history");
    let commits_in_range = CommitRangeWalker::new(backend).walk(
        &repo_path,
        request.start_date,
        request.end_date,
    )?;

    debug!(
        phase = %AnalysisPhase::Inspecting,
        commits = commits_in_range.len(),
        "Inspecting commits"
    );
    let inspector = ChangeInspector::new(backend);
    let mut commits = Vec::with_capacity(commits_in_range.len());
    let mut file_changes = Vec::new();
    for meta in &commits_in_range {
        let (record, files) = inspector.inspect(&repo_path, meta)?;
        commits.push(record);
        file_changes.extend(files);
    }

    debug!(phase = %AnalysisPhase::Aggregating, "Aggregating results");
    let summary = aggregate(&commits, &file_changes);

    info!(
        phase = %AnalysisPhase::Done,
        total_commits = summary.total_commits,
        total_files_changed = summary.total_files_changed,
        contributors = summary.contributors.len(),
        "Analysis complete"
    );

    Ok(AnalysisResult {
        commits,
        file_changes,
        summary,
    })
}
