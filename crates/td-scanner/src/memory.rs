//! In-memory implementation of every collaborator trait.
//!
//! [`MemorySource`] serves trees, blobs, budget, freshness, and metadata
//! from maps populated up front. It backs the scanner's own tests and lets
//! embedders run the pipeline against pre-fetched data.
//!
//! # Examples
//!
//! ```
//! use td_core::{RepoRef, TreeEntry};
//! use td_scanner::{ContentSource, MemorySource};
//!
//! let repo = RepoRef::new("octocat", "hello");
//! let source = MemorySource::new()
//!     .with_tree(&repo, "master", vec![TreeEntry::blob("main.rb", "b1")])
//!     .with_blob("b1", "puts 1 # TODO\n");
//!
//! assert_eq!(source.fetch(&"b1".into()).unwrap(), b"puts 1 # TODO\n");
//! assert_eq!(source.fetch_count(), 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use td_core::{
    ContentId, FxHashMap, FxHashSet, Freshness, RepoRef, RepositoryInfo, RepositorySnapshot,
    TreeEntry,
};

use crate::error::SourceError;
use crate::source::{ContentSource, FreshnessSource, InfoSource, RateBudgetSource, TreeSource};

/// Collaborator backed by in-memory maps.
///
/// Unknown repositories report not-found from every repository-level query.
/// A repository with a tree but no explicit freshness reports
/// [`Freshness::Modified`].
#[derive(Debug, Default)]
pub struct MemorySource {
    trees: FxHashMap<(RepoRef, String), RepositorySnapshot>,
    blobs: FxHashMap<ContentId, Vec<u8>>,
    failing: FxHashSet<ContentId>,
    freshness: FxHashMap<RepoRef, Freshness>,
    infos: FxHashMap<RepoRef, RepositoryInfo>,
    remaining_calls: u64,
    fetches: AtomicU64,
}

impl MemorySource {
    /// Creates an empty source with a zero call budget.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the tree of `repo` at `git_ref`.
    #[must_use]
    pub fn with_tree(mut self, repo: &RepoRef, git_ref: &str, entries: Vec<TreeEntry>) -> Self {
        self.trees
            .insert((repo.clone(), git_ref.to_owned()), RepositorySnapshot::new(entries));
        self
    }

    /// Registers blob content.
    #[must_use]
    pub fn with_blob(mut self, id: impl Into<ContentId>, content: impl Into<Vec<u8>>) -> Self {
        self.blobs.insert(id.into(), content.into());
        self
    }

    /// Makes fetches of `id` fail with a transient error.
    #[must_use]
    pub fn with_failing_blob(mut self, id: impl Into<ContentId>) -> Self {
        self.failing.insert(id.into());
        self
    }

    /// Sets the freshness answer for `repo`.
    #[must_use]
    pub fn with_freshness(mut self, repo: &RepoRef, freshness: Freshness) -> Self {
        self.freshness.insert(repo.clone(), freshness);
        self
    }

    /// Registers metadata for `repo`.
    #[must_use]
    pub fn with_info(mut self, repo: &RepoRef, info: RepositoryInfo) -> Self {
        self.infos.insert(repo.clone(), info);
        self
    }

    /// Sets the remaining call budget.
    #[must_use]
    pub const fn with_remaining_calls(mut self, remaining: u64) -> Self {
        self.remaining_calls = remaining;
        self
    }

    /// Number of `fetch` calls served so far, failed ones included.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    fn knows(&self, repo: &RepoRef) -> bool {
        self.infos.contains_key(repo) || self.trees.keys().any(|(r, _)| r == repo)
    }
}

impl TreeSource for MemorySource {
    fn snapshot(&self, repo: &RepoRef, git_ref: &str) -> Result<RepositorySnapshot, SourceError> {
        self.trees
            .get(&(repo.clone(), git_ref.to_owned()))
            .cloned()
            .ok_or_else(|| SourceError::not_found(format!("tree {repo}@{git_ref}")))
    }
}

impl ContentSource for MemorySource {
    fn fetch(&self, id: &ContentId) -> Result<Vec<u8>, SourceError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if self.failing.contains(id) {
            return Err(SourceError::transient(format!("blob {id} unavailable")));
        }
        self.blobs
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::not_found(format!("blob {id}")))
    }
}

impl RateBudgetSource for MemorySource {
    fn remaining_calls(&self) -> Result<u64, SourceError> {
        Ok(self.remaining_calls)
    }
}

impl FreshnessSource for MemorySource {
    fn check_modified_since(
        &self,
        repo: &RepoRef,
        _since: DateTime<Utc>,
    ) -> Result<Freshness, SourceError> {
        if let Some(freshness) = self.freshness.get(repo) {
            return Ok(*freshness);
        }
        Ok(if self.knows(repo) {
            Freshness::Modified
        } else {
            Freshness::NotFound
        })
    }
}

impl InfoSource for MemorySource {
    fn info(&self, repo: &RepoRef) -> Result<RepositoryInfo, SourceError> {
        if let Some(info) = self.infos.get(repo) {
            return Ok(info.clone());
        }
        if self.knows(repo) {
            return Ok(RepositoryInfo::default());
        }
        Err(SourceError::not_found(format!("repository {repo}")))
    }
}
