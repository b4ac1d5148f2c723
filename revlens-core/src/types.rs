//! Core data type definitions

use crate::error::RevlensResult;
use crate::validation_error;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Accepted remote shapes: https://<host>/<owner>/<repo>.git and
// git@<host>:<owner>/<repo>.git
static HTTPS_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://[\w.-]+/[\w.-]+/[\w.-]+\.git$").expect("valid https url pattern")
});
static SSH_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@[\w.-]+:[\w.-]+/[\w.-]+\.git$").expect("valid ssh url pattern")
});

/// Check whether a string looks like a clonable git remote URL
pub fn is_valid_git_url(url: &str) -> bool {
    HTTPS_URL_PATTERN.is_match(url) || SSH_URL_PATTERN.is_match(url)
}

/// One analysis invocation: a repository and an author-date window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub repository_url: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl AnalysisRequest {
    pub fn new(
        repository_url: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            repository_url: repository_url.into(),
            start_date,
            end_date,
        }
    }

    /// Check the request invariants.
    ///
    /// URL *shape* is the caller's concern (checked when a repository is
    /// registered); the engine only requires a non-empty URL and an ordered
    /// date range.
    pub fn validate(&self) -> RevlensResult<()> {
        if self.repository_url.trim().is_empty() {
            return Err(validation_error!(
                "repository URL must not be empty",
                "repository_url",
                "analysis_request"
            ));
        }

        if self.start_date >= self.end_date {
            return Err(validation_error!(
                "start date must be earlier than end date",
                "start_date",
                "analysis_request"
            ));
        }

        Ok(())
    }
}

/// Raw commit metadata produced by the version-control backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitMeta {
    /// Full object id (hex)
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub author_date: DateTime<Utc>,
    pub message: String,
}

/// Per-commit change statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Abbreviated commit id (8 hex chars)
    pub hash: String,
    pub author: String,
    pub email: String,
    pub date: DateTime<Utc>,
    pub message: String,
    pub files_changed: usize,
    pub lines_added: usize,
    pub lines_deleted: usize,
}

/// Classification of a single file-level change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileChangeStatus::Added => "added",
            FileChangeStatus::Modified => "modified",
            FileChangeStatus::Deleted => "deleted",
            FileChangeStatus::Renamed => "renamed",
        }
    }
}

impl std::fmt::Display for FileChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed file within one commit.
///
/// The same path may appear in many records across commits; deduplication
/// happens only in the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChangeRecord {
    pub file_path: String,
    pub status: FileChangeStatus,
    pub lines_added: usize,
    pub lines_deleted: usize,
}

/// Aggregated counters over one analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_commits: usize,
    /// Distinct file paths across all file changes, not the per-commit sum
    pub total_files_changed: usize,
    pub total_lines_added: usize,
    pub total_lines_deleted: usize,
    /// Distinct author names, first-seen order
    pub contributors: Vec<String>,
}

/// Complete output of one analysis invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub commits: Vec<CommitRecord>,
    pub file_changes: Vec<FileChangeRecord>,
    pub summary: AnalysisSummary,
}

/// Lifecycle of a review record.
///
/// Owned by the persistence layer; the only legal transitions are
/// pending -> processing and processing -> completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Processing => "processing",
            ReviewStatus::Completed => "completed",
            ReviewStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "processing" => Ok(ReviewStatus::Processing),
            "completed" => Ok(ReviewStatus::Completed),
            "failed" => Ok(ReviewStatus::Failed),
            other => Err(format!("unknown review status: {other}")),
        }
    }
}
