//! Collaborator contracts consumed by the scanner.
//!
//! The scanner never talks to a network or a disk itself. Everything it
//! needs from the outside world comes through these traits:
//!
//! - [`TreeSource`] - recursive tree listing for a repository ref
//! - [`ContentSource`] - raw bytes for a content identifier
//! - [`RateBudgetSource`] - remaining remote calls
//! - [`FreshnessSource`] - conditional "modified since" queries
//! - [`InfoSource`] - repository metadata
//!
//! [`RemoteSource`] bundles all five for the coordinator. Implementations
//! must be `Send + Sync`; the walker shares a content source across its
//! worker threads.

use chrono::{DateTime, Utc};
use td_core::{ContentId, Freshness, RepoRef, RepositoryInfo, RepositorySnapshot};

use crate::error::SourceError;

/// Lists a repository's tree at a ref.
pub trait TreeSource: Send + Sync {
    /// Returns the recursive tree listing of `repo` at `git_ref`.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`] if the repository or ref does not exist.
    fn snapshot(&self, repo: &RepoRef, git_ref: &str) -> Result<RepositorySnapshot, SourceError>;
}

/// Fetches file contents by content identifier.
pub trait ContentSource: Send + Sync {
    /// Returns the raw bytes behind `id`.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`], or a transient/timeout failure.
    fn fetch(&self, id: &ContentId) -> Result<Vec<u8>, SourceError>;
}

/// Reports how many remote calls remain in the current budget window.
pub trait RateBudgetSource: Send + Sync {
    /// Returns the number of remaining permitted calls.
    fn remaining_calls(&self) -> Result<u64, SourceError>;
}

/// Answers conditional "has this repository changed" queries.
pub trait FreshnessSource: Send + Sync {
    /// Checks whether `repo` changed after `since`.
    ///
    /// A vanished repository is reported as [`Freshness::NotFound`], not as
    /// an error.
    fn check_modified_since(
        &self,
        repo: &RepoRef,
        since: DateTime<Utc>,
    ) -> Result<Freshness, SourceError>;
}

/// Fetches repository metadata.
pub trait InfoSource: Send + Sync {
    /// Returns metadata for `repo`.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`] if the repository does not exist.
    fn info(&self, repo: &RepoRef) -> Result<RepositoryInfo, SourceError>;
}

/// Everything the [`ScanCoordinator`](crate::ScanCoordinator) needs.
pub trait RemoteSource:
    TreeSource + ContentSource + RateBudgetSource + FreshnessSource + InfoSource
{
}

impl<T> RemoteSource for T where
    T: TreeSource + ContentSource + RateBudgetSource + FreshnessSource + InfoSource
{
}
