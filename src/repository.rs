//! # Upstream Repository Access
//!
//! This module provides `UpstreamRepository`, the handle history discovery
//! uses to ask questions of the local upstream clone. The questions go
//! through the `GitOperations` trait so discovery can be tested against a
//! scripted history instead of a real repository.
//!
//! `DefaultGitOperations` answers them with the system `git` (see
//! [`crate::git`]). Last-modified dates are memoized per repository because
//! sorting asks for the same file's date repeatedly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::cache::QueryCache;
use crate::error::Result;

/// Trait for the git history queries discovery needs - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Every file name appearing in commits that touch `path`.
    fn names_touching(&self, repo: &Path, path: &str) -> Result<BTreeSet<String>>;

    /// Every name `path` had across its history, following renames.
    fn names_following(&self, repo: &Path, path: &str) -> Result<BTreeSet<String>>;

    /// Committer date of the last commit touching `path`, empty if none.
    fn last_modified(&self, repo: &Path, path: &str) -> Result<String>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn names_touching(&self, repo: &Path, path: &str) -> Result<BTreeSet<String>> {
        crate::git::log_names(repo, path)
    }

    fn names_following(&self, repo: &Path, path: &str) -> Result<BTreeSet<String>> {
        crate::git::log_follow_names(repo, path)
    }

    fn last_modified(&self, repo: &Path, path: &str) -> Result<String> {
        crate::git::last_modified(repo, path)
    }
}

/// A local checkout of the upstream monorepo.
pub struct UpstreamRepository {
    path: PathBuf,
    git_ops: Box<dyn GitOperations>,
    dates: QueryCache<String, String>,
}

impl UpstreamRepository {
    /// Open the checkout at `path` using the system `git`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_operations(path, Box::new(DefaultGitOperations))
    }

    /// Open the checkout at `path` with a custom `GitOperations`.
    pub fn with_operations(path: impl Into<PathBuf>, git_ops: Box<dyn GitOperations>) -> Self {
        Self {
            path: path.into(),
            git_ops,
            dates: QueryCache::new(),
        }
    }

    /// Root of the checkout.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn names_touching(&self, path: &str) -> Result<BTreeSet<String>> {
        self.git_ops.names_touching(&self.path, path)
    }

    pub fn names_following(&self, path: &str) -> Result<BTreeSet<String>> {
        self.git_ops.names_following(&self.path, path)
    }

    /// Last-modified date of `path`, asked of git at most once.
    pub fn last_modified(&self, path: &str) -> Result<String> {
        self.dates.get_or_compute(path.to_string(), || {
            self.git_ops.last_modified(&self.path, path)
        })
    }
}
