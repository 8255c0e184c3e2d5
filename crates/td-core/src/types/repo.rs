//! Repository identity, metadata, and freshness.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An `owner/name` repository reference.
///
/// # Examples
///
/// ```
/// use td_core::RepoRef;
///
/// let repo: RepoRef = "rust-lang/cargo".parse().unwrap();
/// assert_eq!(repo.owner, "rust-lang");
/// assert_eq!(repo.name, "cargo");
/// assert_eq!(repo.to_string(), "rust-lang/cargo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// Owning user or organization.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoRef {
    /// Creates a repository reference.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Error returned when a string is not of the form `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid repository '{0}': expected owner/name")]
pub struct ParseRepoRefError(String);

impl FromStr for RepoRef {
    type Err = ParseRepoRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('/');
        match trimmed.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(ParseRepoRefError(s.to_owned())),
        }
    }
}

/// Repository metadata refreshed after each successful scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    /// When the repository was created on the host.
    pub created_at: Option<DateTime<Utc>>,
    /// When the repository was last updated on the host.
    pub updated_at: Option<DateTime<Utc>>,
    /// Project homepage.
    pub homepage: Option<String>,
    /// Short description.
    pub description: Option<String>,
    /// Primary language as reported by the host.
    pub language: Option<String>,
    /// Fork count.
    pub forks: u64,
    /// Star (watcher) count.
    pub stars: u64,
    /// Open issue count.
    pub open_issues: u64,
}

/// Outcome of a conditional "modified since" query.
///
/// `NotModified` is the normal "no work to do" signal, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// The repository changed after the given timestamp.
    Modified,
    /// The repository is unchanged since the given timestamp.
    NotModified,
    /// The repository no longer exists.
    NotFound,
}
