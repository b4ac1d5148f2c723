//! Revlens Engine - Repository analysis engine
//!
//! Materializes a remote repository in a scratch workspace, walks the commit
//! history reachable from the default branch, computes per-commit and
//! per-file change statistics for a date range, and folds them into a
//! summary report.

pub mod aggregator;
pub mod fetcher;
pub mod git;
pub mod inspector;
pub mod orchestrator;
pub mod walker;
pub mod workspace;

pub use aggregator::*;
pub use fetcher::*;
pub use git::*;
pub use inspector::*;
pub use orchestrator::*;
pub use walker::*;
pub use workspace::*;
