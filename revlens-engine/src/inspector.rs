//! Per-commit change inspection

use revlens_core::{CommitMeta, CommitRecord, FileChangeRecord, RevlensResult, VcsBackend};
use std::path::Path;

/// Length of the abbreviated commit id carried in reports
const SHORT_HASH_LEN: usize = 8;

/// Computes diff statistics for individual commits
pub struct ChangeInspector<'a> {
    backend: &'a dyn VcsBackend,
}

impl<'a> ChangeInspector<'a> {
    pub fn new(backend: &'a dyn VcsBackend) -> Self {
        Self { backend }
    }

    /// Diff one commit against its first parent and return the per-commit
    /// record plus one record per changed file. The commit totals are summed
    /// from the file records, so the two views agree by construction.
    pub fn inspect(
        &self,
        repo_path: &Path,
        commit: &CommitMeta,
    ) -> RevlensResult<(CommitRecord, Vec<FileChangeRecord>)> {
        let file_changes = self.backend.diff_against_parent(repo_path, &commit.id)?;

        let lines_added = file_changes.iter().map(|f| f.lines_added).sum();
        let lines_deleted = file_changes.iter().map(|f| f.lines_deleted).sum();

        let record = CommitRecord {
            hash: short_hash(&commit.id),
            author: commit.author_name.clone(),
            email: commit.author_email.clone(),
            date: commit.author_date,
            message: commit.message.clone(),
            files_changed: file_changes.len(),
            lines_added,
            lines_deleted,
        };

        Ok((record, file_changes))
    }
}

fn short_hash(id: &str) -> String {
    id.get(..SHORT_HASH_LEN).unwrap_or(id).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use revlens_core::FileChangeStatus;

    /// Backend that replays a canned diff for any commit
    struct CannedDiffBackend {
        changes: Vec<FileChangeRecord>,
    }

    impl VcsBackend for CannedDiffBackend {
        fn clone_with_branch(&self, _: &str, _: &str, _: &Path) -> RevlensResult<()> {
            unreachable!("inspector tests never clone")
        }

        fn walk_from_head(&self, _: &Path, _: usize) -> RevlensResult<Vec<CommitMeta>> {
            unreachable!("inspector tests never walk")
        }

        fn diff_against_parent(&self, _: &Path, _: &str) -> RevlensResult<Vec<FileChangeRecord>> {
            Ok(self.changes.clone())
        }
    }

    fn meta() -> CommitMeta {
        CommitMeta {
            id: "0123456789abcdef0123456789abcdef01234567".to_string(),
            author_name: "Alice".to_string(),
            author_email: "alice@example.com".to_string(),
            author_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            message: "Refactor parser".to_string(),
        }
    }

    #[test]
    fn commit_totals_are_summed_from_file_records() {
        let backend = CannedDiffBackend {
            changes: vec![
                FileChangeRecord {
                    file_path: "src/parser.rs".to_string(),
                    status: FileChangeStatus::Modified,
                    lines_added: 12,
                    lines_deleted: 4,
                },
                FileChangeRecord {
                    file_path: "src/lexer.rs".to_string(),
                    status: FileChangeStatus::Added,
                    lines_added: 30,
                    lines_deleted: 0,
                },
                // Binary file: counted, but contributes no line statistics.
                FileChangeRecord {
                    file_path: "assets/logo.png".to_string(),
                    status: FileChangeStatus::Added,
                    lines_added: 0,
                    lines_deleted: 0,
                },
            ],
        };

        let (record, files) = ChangeInspector::new(&backend)
            .inspect(Path::new("unused"), &meta())
            .unwrap();

        assert_eq!(record.files_changed, 3);
        assert_eq!(record.lines_added, 42);
        assert_eq!(record.lines_deleted, 4);
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn record_carries_short_hash_and_author_metadata() {
        let backend = CannedDiffBackend { changes: vec![] };

        let (record, files) = ChangeInspector::new(&backend)
            .inspect(Path::new("unused"), &meta())
            .unwrap();

        assert_eq!(record.hash, "01234567");
        assert_eq!(record.hash.len(), SHORT_HASH_LEN);
        assert_eq!(record.author, "Alice");
        assert_eq!(record.email, "alice@example.com");
        assert_eq!(record.message, "Refactor parser");
        assert_eq!(record.files_changed, 0);
        assert!(files.is_empty());
    }
}
