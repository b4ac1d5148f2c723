//! Summary aggregation
//!
//! A pure fold over the per-commit and per-file records; no I/O.

use revlens_core::{AnalysisSummary, CommitRecord, FileChangeRecord};
use std::collections::HashSet;

/// Fold per-commit and per-file records into one summary.
///
/// Line totals come from the per-commit records; the distinct-file count
/// comes from the file records. Contributors keep first-seen order.
pub fn aggregate(commits: &[CommitRecord], file_changes: &[FileChangeRecord]) -> AnalysisSummary {
    let mut seen_paths = HashSet::new();
    let total_files_changed = file_changes
        .iter()
        .filter(|change| seen_paths.insert(change.file_path.as_str()))
        .count();

    let total_lines_added = commits.iter().map(|c| c.lines_added).sum();
    let total_lines_deleted = commits.iter().map(|c| c.lines_deleted).sum();

    let mut seen_authors = HashSet::new();
    let mut contributors = Vec::new();
    for commit in commits {
        if seen_authors.insert(commit.author.as_str()) {
            contributors.push(commit.author.clone());
        }
    }

    AnalysisSummary {
        total_commits: commits.len(),
        total_files_changed,
        total_lines_added,
        total_lines_deleted,
        contributors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use revlens_core::FileChangeStatus;

    fn commit(author: &str, lines_added: usize, lines_deleted: usize) -> CommitRecord {
        CommitRecord {
            hash: "aaaaaaaa".to_string(),
            author: author.to_string(),
            email: format!("{}@example.com", author.to_lowercase()),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            message: "change".to_string(),
            files_changed: 1,
            lines_added,
            lines_deleted,
        }
    }

    fn change(path: &str, lines_added: usize, lines_deleted: usize) -> FileChangeRecord {
        FileChangeRecord {
            file_path: path.to_string(),
            status: FileChangeStatus::Modified,
            lines_added,
            lines_deleted,
        }
    }

    #[test]
    fn files_touched_in_many_commits_count_once() {
        let commits = vec![commit("Alice", 5, 1), commit("Bob", 3, 2)];
        let file_changes = vec![
            change("src/main.rs", 5, 1),
            change("src/main.rs", 2, 1),
            change("README.md", 1, 1),
        ];

        let summary = aggregate(&commits, &file_changes);
        // Distinct paths, never the naive per-commit sum.
        assert_eq!(summary.total_files_changed, 2);
    }

    #[test]
    fn line_totals_come_from_commit_records() {
        let commits = vec![commit("Alice", 10, 3), commit("Alice", 7, 2)];
        // File records deliberately disagree; the commit view wins.
        let file_changes = vec![change("a.rs", 1, 1)];

        let summary = aggregate(&commits, &file_changes);
        assert_eq!(summary.total_lines_added, 17);
        assert_eq!(summary.total_lines_deleted, 5);
    }

    #[test]
    fn contributors_are_distinct_in_first_seen_order() {
        let commits = vec![
            commit("Carol", 1, 0),
            commit("Alice", 1, 0),
            commit("Carol", 1, 0),
            commit("Bob", 1, 0),
        ];

        let summary = aggregate(&commits, &[]);
        assert_eq!(summary.contributors, vec!["Carol", "Alice", "Bob"]);
    }

    #[test]
    fn author_names_are_not_case_folded() {
        let commits = vec![commit("alice", 1, 0), commit("Alice", 1, 0)];

        let summary = aggregate(&commits, &[]);
        assert_eq!(summary.contributors.len(), 2);
    }

    #[test]
    fn empty_input_produces_zeroed_summary() {
        let summary = aggregate(&[], &[]);
        assert_eq!(summary.total_commits, 0);
        assert_eq!(summary.total_files_changed, 0);
        assert_eq!(summary.total_lines_added, 0);
        assert_eq!(summary.total_lines_deleted, 0);
        assert!(summary.contributors.is_empty());
    }
}
