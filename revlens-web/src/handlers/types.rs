//! Shared request and response types for the HTTP API

use chrono::{DateTime, Utc};
use revlens_core::{AnalysisResult, ReviewStatus};
use serde::{Deserialize, Serialize};

/// Uniform JSON envelope: `{ success, data }` or `{ success, error }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Repository registration request
#[derive(Debug, Deserialize)]
pub struct CreateRepositoryRequest {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
}

/// Review creation request; dates are RFC 3339 or plain `YYYY-MM-DD`
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub repository_id: String,
    pub start_date: String,
    pub end_date: String,
}

/// Acknowledgement payload for deletions
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for a freshly generated report
#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub review_id: String,
    pub report_id: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

/// Stored report joined with its review row
#[derive(Debug, Serialize)]
pub struct ReportDetail {
    pub id: String,
    pub review_id: String,
    pub repository_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ReviewStatus,
    pub total_commits: i64,
    pub total_files_changed: i64,
    pub total_lines_added: i64,
    pub total_lines_deleted: i64,
    pub report_data: AnalysisResult,
    pub created_at: DateTime<Utc>,
}
