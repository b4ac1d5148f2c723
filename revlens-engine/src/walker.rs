//! Commit range traversal

use chrono::{DateTime, Utc};
use revlens_core::{CommitMeta, RevlensResult, VcsBackend};
use std::path::Path;
use tracing::debug;

/// Hard ceiling on commits visited per analysis.
///
/// Bounds memory and runtime on pathological histories. Applied before the
/// date filter, so histories deeper than this are truncated.
pub const COMMIT_CEILING: usize = 1000;

/// Walks history from the repository head and filters by author date
pub struct CommitRangeWalker<'a> {
    backend: &'a dyn VcsBackend,
}

impl<'a> CommitRangeWalker<'a> {
    pub fn new(backend: &'a dyn VcsBackend) -> Self {
        Self { backend }
    }

    /// Return the commits whose author date falls within `[start, end]`,
    /// inclusive on both ends, most recent first.
    pub fn walk(
        &self,
        repo_path: &Path,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RevlensResult<Vec<CommitMeta>> {
        let visited = self.backend.walk_from_head(repo_path, COMMIT_CEILING)?;
        let visited_count = visited.len();

        let selected: Vec<CommitMeta> = visited
            .into_iter()
            .filter(|commit| commit.author_date >= start && commit.author_date <= end)
            .collect();

        debug!(
            visited = visited_count,
            selected = selected.len(),
            "Commit range filtered"
        );
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use revlens_core::FileChangeRecord;

    /// Backend that fabricates a linear history, newest first
    struct FixedHistoryBackend {
        commit_count: usize,
    }

    impl FixedHistoryBackend {
        fn commit_at(index: usize) -> CommitMeta {
            CommitMeta {
                id: format!("{index:040x}"),
                author_name: "Alice".to_string(),
                author_email: "alice@example.com".to_string(),
                // One commit per day, counting backwards from the head.
                author_date: Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
                    - chrono::Duration::days(index as i64),
                message: format!("commit {index}"),
            }
        }
    }

    impl VcsBackend for FixedHistoryBackend {
        fn clone_with_branch(&self, _: &str, _: &str, _: &Path) -> RevlensResult<()> {
            unreachable!("walker tests never clone")
        }

        fn walk_from_head(&self, _: &Path, limit: usize) -> RevlensResult<Vec<CommitMeta>> {
            Ok((0..self.commit_count.min(limit))
                .map(Self::commit_at)
                .collect())
        }

        fn diff_against_parent(&self, _: &Path, _: &str) -> RevlensResult<Vec<FileChangeRecord>> {
            unreachable!("walker tests never diff")
        }
    }

    #[test]
    fn filters_by_author_date_inclusively() {
        let backend = FixedHistoryBackend { commit_count: 10 };
        let walker = CommitRangeWalker::new(&backend);

        // Exactly the instants of commits 2 and 5: both endpoints included.
        let start = FixedHistoryBackend::commit_at(5).author_date;
        let end = FixedHistoryBackend::commit_at(2).author_date;

        let commits = walker.walk(Path::new("unused"), start, end).unwrap();
        assert_eq!(commits.len(), 4);
        assert_eq!(commits.first().unwrap().author_date, end);
        assert_eq!(commits.last().unwrap().author_date, start);
    }

    #[test]
    fn empty_range_returns_no_commits() {
        let backend = FixedHistoryBackend { commit_count: 5 };
        let walker = CommitRangeWalker::new(&backend);

        let start = Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(1999, 12, 31, 0, 0, 0).unwrap();

        let commits = walker.walk(Path::new("unused"), start, end).unwrap();
        assert!(commits.is_empty());
    }

    #[test]
    fn traversal_is_capped_at_the_ceiling() {
        // A history deeper than the ceiling is truncated, not an error.
        let backend = FixedHistoryBackend {
            commit_count: COMMIT_CEILING + 500,
        };
        let walker = CommitRangeWalker::new(&backend);

        let start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let commits = walker.walk(Path::new("unused"), start, end).unwrap();
        assert_eq!(commits.len(), COMMIT_CEILING);
    }

    #[test]
    fn preserves_most_recent_first_order() {
        let backend = FixedHistoryBackend { commit_count: 6 };
        let walker = CommitRangeWalker::new(&backend);

        let start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let commits = walker.walk(Path::new("unused"), start, end).unwrap();
        for window in commits.windows(2) {
            assert!(window[0].author_date >= window[1].author_date);
        }
    }
}
