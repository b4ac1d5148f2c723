//! Fixture repositories for engine integration tests
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::fs;
use std::path::Path;

pub const ALICE: (&str, &str) = ("Alice", "alice@example.com");
pub const BOB: (&str, &str) = ("Bob", "bob@example.com");

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// Initialize an empty repository whose HEAD points at `initial_branch`
pub fn init_repo(path: &Path, initial_branch: &str) -> Repository {
    let mut options = RepositoryInitOptions::new();
    options.initial_head(initial_branch);
    Repository::init_opts(path, &options).expect("init fixture repository")
}

/// Write `content` to `rel_path` and commit it
pub fn commit_file(
    repo: &Repository,
    rel_path: &str,
    content: &str,
    message: &str,
    author: (&str, &str),
    date: DateTime<Utc>,
) -> Oid {
    let workdir = repo.workdir().expect("fixture repo has a workdir");
    let file_path = workdir.join(rel_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(rel_path)).unwrap();
    index.write().unwrap();

    create_commit(repo, message, author, date)
}

/// Write raw bytes to `rel_path` and commit it
pub fn commit_binary_file(
    repo: &Repository,
    rel_path: &str,
    content: &[u8],
    message: &str,
    author: (&str, &str),
    date: DateTime<Utc>,
) -> Oid {
    let workdir = repo.workdir().expect("fixture repo has a workdir");
    fs::write(workdir.join(rel_path), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(rel_path)).unwrap();
    index.write().unwrap();

    create_commit(repo, message, author, date)
}

/// Delete `rel_path` and commit the removal
pub fn commit_removal(
    repo: &Repository,
    rel_path: &str,
    message: &str,
    author: (&str, &str),
    date: DateTime<Utc>,
) -> Oid {
    let workdir = repo.workdir().expect("fixture repo has a workdir");
    fs::remove_file(workdir.join(rel_path)).unwrap();

    let mut index = repo.index().unwrap();
    index.remove_path(Path::new(rel_path)).unwrap();
    index.write().unwrap();

    create_commit(repo, message, author, date)
}

/// Move `from` to `to` without touching content and commit the rename
pub fn commit_rename(
    repo: &Repository,
    from: &str,
    to: &str,
    message: &str,
    author: (&str, &str),
    date: DateTime<Utc>,
) -> Oid {
    let workdir = repo.workdir().expect("fixture repo has a workdir");
    fs::rename(workdir.join(from), workdir.join(to)).unwrap();

    let mut index = repo.index().unwrap();
    index.remove_path(Path::new(from)).unwrap();
    index.add_path(Path::new(to)).unwrap();
    index.write().unwrap();

    create_commit(repo, message, author, date)
}

fn create_commit(
    repo: &Repository,
    message: &str,
    author: (&str, &str),
    date: DateTime<Utc>,
) -> Oid {
    let mut index = repo.index().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let signature =
        Signature::new(author.0, author.1, &Time::new(date.timestamp(), 0)).unwrap();

    let parent = repo
        .head()
        .ok()
        .and_then(|head| head.target())
        .map(|oid| repo.find_commit(oid).unwrap());
    let parents: Vec<&Commit> = parent.iter().collect();

    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )
    .unwrap()
}
