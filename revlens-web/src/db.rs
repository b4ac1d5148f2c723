//! SQLite persistence for repositories, reviews, and reports

use crate::{WebError, WebResult};
use chrono::{DateTime, Utc};
use revlens_core::{AnalysisResult, ReviewStatus};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// A registered repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review request over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: String,
    pub repository_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

/// A review joined with its repository, for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub id: String,
    pub repository_id: String,
    pub repository_name: String,
    pub repository_url: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

/// A stored analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: String,
    pub review_id: String,
    pub total_commits: i64,
    pub total_files_changed: i64,
    pub total_lines_added: i64,
    pub total_lines_deleted: i64,
    /// Serialized `AnalysisResult`
    pub report_data: String,
    pub created_at: DateTime<Utc>,
}

/// Database service backed by a SQLite pool
pub struct DatabaseService {
    pool: SqlitePool,
}

impl DatabaseService {
    /// Connect to the database and ensure the schema exists
    pub async fn new(database_url: &str) -> WebResult<Self> {
        info!(database_url, "Connecting to database");

        let pool = if database_url.contains(":memory:") {
            // In-memory SQLite gives every connection its own database;
            // keep the pool at a single connection so the schema survives.
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect(database_url)
                .await
                .map_err(|e| WebError::Database(format!("Failed to connect to database: {e}")))?
        } else if let Some(db_path) = database_url.strip_prefix("sqlite:") {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        WebError::Database(format!("Failed to create database directory: {e}"))
                    })?;
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(db_path)
                .create_if_missing(true);

            SqlitePool::connect_with(options)
                .await
                .map_err(|e| WebError::Database(format!("Failed to connect to database: {e}")))?
        } else {
            SqlitePool::connect(database_url)
                .await
                .map_err(|e| WebError::Database(format!("Failed to connect to database: {e}")))?
        };

        Self::create_tables(&pool).await?;
        debug!("Database schema ready");

        Ok(Self { pool })
    }

    async fn create_tables(pool: &SqlitePool) -> WebResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS repositories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to create repositories table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                repository_id TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                FOREIGN KEY (repository_id) REFERENCES repositories (id)
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to create reviews table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS review_reports (
                id TEXT PRIMARY KEY,
                review_id TEXT NOT NULL,
                total_commits INTEGER NOT NULL DEFAULT 0,
                total_files_changed INTEGER NOT NULL DEFAULT 0,
                total_lines_added INTEGER NOT NULL DEFAULT 0,
                total_lines_deleted INTEGER NOT NULL DEFAULT 0,
                report_data TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (review_id) REFERENCES reviews (id)
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to create review_reports table: {e}")))?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Repositories
    // ------------------------------------------------------------------

    pub async fn create_repository(
        &self,
        name: &str,
        url: &str,
        description: Option<&str>,
    ) -> WebResult<RepositoryRecord> {
        let now = Utc::now();
        let record = RepositoryRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            url: url.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO repositories (id, name, url, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.url)
        .bind(&record.description)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let message = e.to_string();
            if message.contains("UNIQUE constraint failed") {
                WebError::Conflict("repository URL is already registered".to_string())
            } else {
                WebError::Database(format!("Failed to save repository: {message}"))
            }
        })?;

        Ok(record)
    }

    pub async fn list_repositories(&self) -> WebResult<Vec<RepositoryRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, url, description, created_at, updated_at \
             FROM repositories ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to list repositories: {e}")))?;

        Ok(rows.iter().map(repository_from_row).collect())
    }

    pub async fn get_repository(&self, id: &str) -> WebResult<Option<RepositoryRecord>> {
        let row = sqlx::query(
            "SELECT id, name, url, description, created_at, updated_at \
             FROM repositories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to get repository: {e}")))?;

        Ok(row.as_ref().map(repository_from_row))
    }

    /// Delete a repository and everything hanging off it.
    ///
    /// Returns false when no repository had that id.
    pub async fn delete_repository(&self, id: &str) -> WebResult<bool> {
        sqlx::query(
            "DELETE FROM review_reports WHERE review_id IN \
             (SELECT id FROM reviews WHERE repository_id = ?)",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to delete reports: {e}")))?;

        sqlx::query("DELETE FROM reviews WHERE repository_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WebError::Database(format!("Failed to delete reviews: {e}")))?;

        let result = sqlx::query("DELETE FROM repositories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WebError::Database(format!("Failed to delete repository: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------

    pub async fn create_review(
        &self,
        repository_id: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> WebResult<ReviewRecord> {
        let record = ReviewRecord {
            id: Uuid::new_v4().to_string(),
            repository_id: repository_id.to_string(),
            start_date,
            end_date,
            status: ReviewStatus::Pending,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO reviews (id, repository_id, start_date, end_date, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.repository_id)
        .bind(record.start_date.to_rfc3339())
        .bind(record.end_date.to_rfc3339())
        .bind(record.status.as_str())
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to save review: {e}")))?;

        Ok(record)
    }

    pub async fn get_review(&self, id: &str) -> WebResult<Option<ReviewRecord>> {
        let row = sqlx::query(
            "SELECT id, repository_id, start_date, end_date, status, created_at \
             FROM reviews WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to get review: {e}")))?;

        Ok(row.as_ref().map(review_from_row))
    }

    pub async fn list_reviews(&self) -> WebResult<Vec<ReviewSummary>> {
        let rows = sqlx::query(
            "SELECT r.id, r.repository_id, r.start_date, r.end_date, r.status, r.created_at, \
                    repo.name AS repository_name, repo.url AS repository_url \
             FROM reviews r \
             JOIN repositories repo ON r.repository_id = repo.id \
             ORDER BY r.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to list reviews: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| ReviewSummary {
                id: text_column(row, "id"),
                repository_id: text_column(row, "repository_id"),
                repository_name: text_column(row, "repository_name"),
                repository_url: text_column(row, "repository_url"),
                start_date: timestamp_column(row, "start_date"),
                end_date: timestamp_column(row, "end_date"),
                status: status_column(row),
                created_at: timestamp_column(row, "created_at"),
            })
            .collect())
    }

    pub async fn set_review_status(&self, id: &str, status: ReviewStatus) -> WebResult<()> {
        let result = sqlx::query("UPDATE reviews SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WebError::Database(format!("Failed to update review status: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(WebError::NotFound("review".to_string()));
        }

        debug!(review_id = id, status = %status, "Review status updated");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    pub async fn insert_report(
        &self,
        review_id: &str,
        result: &AnalysisResult,
    ) -> WebResult<ReportRecord> {
        let record = ReportRecord {
            id: Uuid::new_v4().to_string(),
            review_id: review_id.to_string(),
            total_commits: result.summary.total_commits as i64,
            total_files_changed: result.summary.total_files_changed as i64,
            total_lines_added: result.summary.total_lines_added as i64,
            total_lines_deleted: result.summary.total_lines_deleted as i64,
            report_data: serde_json::to_string(result)?,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO review_reports \
             (id, review_id, total_commits, total_files_changed, total_lines_added, \
              total_lines_deleted, report_data, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.review_id)
        .bind(record.total_commits)
        .bind(record.total_files_changed)
        .bind(record.total_lines_added)
        .bind(record.total_lines_deleted)
        .bind(&record.report_data)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to save report: {e}")))?;

        Ok(record)
    }

    /// Fetch the most recent report for a review
    pub async fn get_report(&self, review_id: &str) -> WebResult<Option<ReportRecord>> {
        let row = sqlx::query(
            "SELECT id, review_id, total_commits, total_files_changed, total_lines_added, \
                    total_lines_deleted, report_data, created_at \
             FROM review_reports WHERE review_id = ? \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to get report: {e}")))?;

        Ok(row.as_ref().map(|row| ReportRecord {
            id: text_column(row, "id"),
            review_id: text_column(row, "review_id"),
            total_commits: row.try_get("total_commits").unwrap_or_default(),
            total_files_changed: row.try_get("total_files_changed").unwrap_or_default(),
            total_lines_added: row.try_get("total_lines_added").unwrap_or_default(),
            total_lines_deleted: row.try_get("total_lines_deleted").unwrap_or_default(),
            report_data: text_column(row, "report_data"),
            created_at: timestamp_column(row, "created_at"),
        }))
    }
}

fn repository_from_row(row: &SqliteRow) -> RepositoryRecord {
    RepositoryRecord {
        id: text_column(row, "id"),
        name: text_column(row, "name"),
        url: text_column(row, "url"),
        description: row.try_get("description").unwrap_or(None),
        created_at: timestamp_column(row, "created_at"),
        updated_at: timestamp_column(row, "updated_at"),
    }
}

fn review_from_row(row: &SqliteRow) -> ReviewRecord {
    ReviewRecord {
        id: text_column(row, "id"),
        repository_id: text_column(row, "repository_id"),
        start_date: timestamp_column(row, "start_date"),
        end_date: timestamp_column(row, "end_date"),
        status: status_column(row),
        created_at: timestamp_column(row, "created_at"),
    }
}

fn text_column(row: &SqliteRow, column: &str) -> String {
    row.try_get(column).unwrap_or_default()
}

fn timestamp_column(row: &SqliteRow, column: &str) -> DateTime<Utc> {
    let value: String = row.try_get(column).unwrap_or_default();
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn status_column(row: &SqliteRow) -> ReviewStatus {
    let value: String = row.try_get("status").unwrap_or_default();
    value.parse().unwrap_or(ReviewStatus::Pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use revlens_core::{AnalysisSummary, CommitRecord, FileChangeRecord, FileChangeStatus};

    async fn database() -> DatabaseService {
        DatabaseService::new("sqlite::memory:").await.unwrap()
    }

    fn sample_result() -> AnalysisResult {
        let commit = CommitRecord {
            hash: "0123abcd".to_string(),
            author: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            date: Utc.with_ymd_and_hms(2024, 2, 10, 8, 0, 0).unwrap(),
            message: "Tighten validation".to_string(),
            files_changed: 1,
            lines_added: 4,
            lines_deleted: 1,
        };
        let change = FileChangeRecord {
            file_path: "src/main.rs".to_string(),
            status: FileChangeStatus::Modified,
            lines_added: 4,
            lines_deleted: 1,
        };
        AnalysisResult {
            commits: vec![commit],
            file_changes: vec![change],
            summary: AnalysisSummary {
                total_commits: 1,
                total_files_changed: 1,
                total_lines_added: 4,
                total_lines_deleted: 1,
                contributors: vec!["Alice".to_string()],
            },
        }
    }

    #[tokio::test]
    async fn repository_crud_round_trip() {
        let db = database().await;

        let created = db
            .create_repository(
                "widgets",
                "https://github.com/acme/widgets.git",
                Some("sample"),
            )
            .await
            .unwrap();

        let listed = db.list_repositories().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].url, created.url);

        let fetched = db.get_repository(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "widgets");
        assert_eq!(fetched.description.as_deref(), Some("sample"));

        assert!(db.delete_repository(&created.id).await.unwrap());
        assert!(db.get_repository(&created.id).await.unwrap().is_none());
        assert!(!db.delete_repository(&created.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_repository_url_is_a_conflict() {
        let db = database().await;
        let url = "https://github.com/acme/widgets.git";

        db.create_repository("first", url, None).await.unwrap();
        let err = db.create_repository("second", url, None).await.unwrap_err();
        assert!(matches!(err, WebError::Conflict(_)));
    }

    #[tokio::test]
    async fn review_lifecycle_is_persisted() {
        let db = database().await;
        let repo = db
            .create_repository("widgets", "https://github.com/acme/widgets.git", None)
            .await
            .unwrap();

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let review = db.create_review(&repo.id, start, end).await.unwrap();
        assert_eq!(review.status, ReviewStatus::Pending);

        db.set_review_status(&review.id, ReviewStatus::Processing)
            .await
            .unwrap();
        db.set_review_status(&review.id, ReviewStatus::Completed)
            .await
            .unwrap();

        let fetched = db.get_review(&review.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ReviewStatus::Completed);
        assert_eq!(fetched.start_date, start);
        assert_eq!(fetched.end_date, end);

        let listed = db.list_reviews().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].repository_name, "widgets");
        assert_eq!(listed[0].status, ReviewStatus::Completed);
    }

    #[tokio::test]
    async fn updating_an_unknown_review_is_not_found() {
        let db = database().await;
        let err = db
            .set_review_status("missing", ReviewStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, WebError::NotFound(_)));
    }

    #[tokio::test]
    async fn report_round_trips_with_summary_counters() {
        let db = database().await;
        let repo = db
            .create_repository("widgets", "https://github.com/acme/widgets.git", None)
            .await
            .unwrap();
        let review = db
            .create_review(
                &repo.id,
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            )
            .await
            .unwrap();

        let result = sample_result();
        let stored = db.insert_report(&review.id, &result).await.unwrap();
        assert_eq!(stored.total_commits, 1);
        assert_eq!(stored.total_lines_added, 4);

        let fetched = db.get_report(&review.id).await.unwrap().unwrap();
        let decoded: AnalysisResult = serde_json::from_str(&fetched.report_data).unwrap();
        assert_eq!(decoded.summary, result.summary);
        assert_eq!(decoded.commits.len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_repository_cascades() {
        let db = database().await;
        let repo = db
            .create_repository("widgets", "https://github.com/acme/widgets.git", None)
            .await
            .unwrap();
        let review = db
            .create_review(
                &repo.id,
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            )
            .await
            .unwrap();
        db.insert_report(&review.id, &sample_result()).await.unwrap();

        assert!(db.delete_repository(&repo.id).await.unwrap());
        assert!(db.get_review(&review.id).await.unwrap().is_none());
        assert!(db.get_report(&review.id).await.unwrap().is_none());
    }
}
