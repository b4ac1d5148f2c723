//! Repository management handlers

use super::types::{ApiResponse, CreateRepositoryRequest, MessageResponse};
use crate::db::RepositoryRecord;
use crate::{AppState, WebError, WebResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as JsonExtractor,
};
use revlens_core::is_valid_git_url;
use tracing::info;

/// List all registered repositories
pub async fn list_repositories(
    State(state): State<AppState>,
) -> WebResult<Json<ApiResponse<Vec<RepositoryRecord>>>> {
    let repositories = state.database.list_repositories().await?;
    Ok(Json(ApiResponse::ok(repositories)))
}

/// Register a new repository
pub async fn create_repository(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<CreateRepositoryRequest>,
) -> WebResult<(StatusCode, Json<ApiResponse<RepositoryRecord>>)> {
    if request.name.trim().is_empty() || request.url.trim().is_empty() {
        return Err(WebError::Validation(
            "repository name and URL are required".to_string(),
        ));
    }

    // Malformed URLs are rejected here; the engine assumes a clonable remote.
    if !is_valid_git_url(&request.url) {
        return Err(WebError::Validation(
            "invalid git repository URL; expected https://host/owner/repo.git or git@host:owner/repo.git".to_string(),
        ));
    }

    let repository = state
        .database
        .create_repository(
            request.name.trim(),
            request.url.trim(),
            request.description.as_deref(),
        )
        .await?;

    info!(repository_id = %repository.id, url = %repository.url, "Repository registered");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(repository))))
}

/// Get a single repository
pub async fn get_repository(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<ApiResponse<RepositoryRecord>>> {
    let repository = state
        .database
        .get_repository(&id)
        .await?
        .ok_or_else(|| WebError::NotFound("repository".to_string()))?;

    Ok(Json(ApiResponse::ok(repository)))
}

/// Delete a repository along with its reviews and reports
pub async fn delete_repository(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<ApiResponse<MessageResponse>>> {
    let deleted = state.database.delete_repository(&id).await?;
    if !deleted {
        return Err(WebError::NotFound("repository".to_string()));
    }

    info!(repository_id = %id, "Repository deleted");
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "repository deleted".to_string(),
    })))
}
