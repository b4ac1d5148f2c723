//! Review lifecycle handlers
//!
//! A review is created `pending`, moves to `processing` while the engine
//! runs, and ends `completed` or `failed`. Failures are surfaced to the
//! caller with the engine's message; nothing is retried automatically.

use super::types::{
    ApiResponse, CreateReviewRequest, GenerateReportResponse, ReportDetail,
};
use crate::db::{ReviewRecord, ReviewSummary};
use crate::{AppState, WebError, WebResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as JsonExtractor,
};
use chrono::{DateTime, NaiveDate, Utc};
use revlens_core::{performance, AnalysisRequest, AnalysisResult, ReviewStatus};
use tracing::{error, info};

/// List all reviews with their repository names
pub async fn list_reviews(
    State(state): State<AppState>,
) -> WebResult<Json<ApiResponse<Vec<ReviewSummary>>>> {
    let reviews = state.database.list_reviews().await?;
    Ok(Json(ApiResponse::ok(reviews)))
}

/// Create a review request for a registered repository
pub async fn create_review(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<CreateReviewRequest>,
) -> WebResult<(StatusCode, Json<ApiResponse<ReviewRecord>>)> {
    if request.repository_id.trim().is_empty() {
        return Err(WebError::Validation("repository_id is required".to_string()));
    }

    let start_date = parse_date(&request.start_date, "start_date")?;
    let end_date = parse_date(&request.end_date, "end_date")?;

    if start_date >= end_date {
        return Err(WebError::Validation(
            "start date must be earlier than end date".to_string(),
        ));
    }

    if state
        .database
        .get_repository(&request.repository_id)
        .await?
        .is_none()
    {
        return Err(WebError::NotFound("repository".to_string()));
    }

    let review = state
        .database
        .create_review(&request.repository_id, start_date, end_date)
        .await?;

    info!(review_id = %review.id, repository_id = %review.repository_id, "Review created");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}

/// Get a single review
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<ApiResponse<ReviewRecord>>> {
    let review = state
        .database
        .get_review(&id)
        .await?
        .ok_or_else(|| WebError::NotFound("review".to_string()))?;

    Ok(Json(ApiResponse::ok(review)))
}

/// Run the analysis for a review and store the produced report
pub async fn generate_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<ApiResponse<GenerateReportResponse>>> {
    let review = state
        .database
        .get_review(&id)
        .await?
        .ok_or_else(|| WebError::NotFound("review".to_string()))?;

    let repository = state
        .database
        .get_repository(&review.repository_id)
        .await?
        .ok_or_else(|| WebError::NotFound("repository".to_string()))?;

    state
        .database
        .set_review_status(&review.id, ReviewStatus::Processing)
        .await?;

    info!(review_id = %review.id, url = %repository.url, "Running analysis");
    let analysis = AnalysisRequest::new(repository.url.clone(), review.start_date, review.end_date);

    match performance::measure_async("generate_report", state.engine.analyze(analysis)).await {
        Ok(result) => {
            let report = state.database.insert_report(&review.id, &result).await?;
            state
                .database
                .set_review_status(&review.id, ReviewStatus::Completed)
                .await?;

            info!(review_id = %review.id, report_id = %report.id, "Report stored");
            Ok(Json(ApiResponse::ok(GenerateReportResponse {
                review_id: review.id,
                report_id: report.id,
                result,
            })))
        }
        Err(engine_error) => {
            if let Err(db_error) = state
                .database
                .set_review_status(&review.id, ReviewStatus::Failed)
                .await
            {
                error!(review_id = %review.id, error = %db_error, "Failed to record review failure");
            }
            Err(WebError::Engine(engine_error))
        }
    }
}

/// Fetch the stored report for a review
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<ApiResponse<ReportDetail>>> {
    let review = state
        .database
        .get_review(&id)
        .await?
        .ok_or_else(|| WebError::NotFound("review".to_string()))?;

    let report = state
        .database
        .get_report(&review.id)
        .await?
        .ok_or_else(|| WebError::NotFound("report".to_string()))?;

    let report_data: AnalysisResult = serde_json::from_str(&report.report_data)?;

    Ok(Json(ApiResponse::ok(ReportDetail {
        id: report.id,
        review_id: report.review_id,
        repository_id: review.repository_id,
        start_date: review.start_date,
        end_date: review.end_date,
        status: review.status,
        total_commits: report.total_commits,
        total_files_changed: report.total_files_changed,
        total_lines_added: report.total_lines_added,
        total_lines_deleted: report.total_lines_deleted,
        report_data,
        created_at: report.created_at,
    })))
}

/// Accept RFC 3339 timestamps or plain dates (interpreted as UTC midnight)
fn parse_date(value: &str, field: &str) -> WebResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(WebError::Validation(format!(
        "{field} is not a valid date; expected RFC 3339 or YYYY-MM-DD"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_plain_dates() {
        let full = parse_date("2024-03-05T10:30:00Z", "start_date").unwrap();
        assert_eq!(full.to_rfc3339(), "2024-03-05T10:30:00+00:00");

        let plain = parse_date("2024-03-05", "start_date").unwrap();
        assert_eq!(plain.to_rfc3339(), "2024-03-05T00:00:00+00:00");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("05/03/2024", "start_date").is_err());
        assert!(parse_date("yesterday", "end_date").is_err());
        assert!(parse_date("", "end_date").is_err());
    }
}
