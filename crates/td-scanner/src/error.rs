//! Error types for the td-scanner crate.
//!
//! - [`SourceError`] is what collaborators (tree, content, budget, freshness,
//!   and info sources) report.
//! - [`ScanError`] is what the walker and coordinator surface to callers.
//!
//! # Error Recovery Strategy
//!
//! - **Fetch errors** ([`ScanError::Fetch`]): per-file, recorded in the
//!   report, the walk continues
//! - **Not found** ([`ScanError::NotFound`]): fatal for the target, never retried
//! - **Source errors** ([`ScanError::Source`]): fatal for the target
//! - **Config errors** ([`ScanError::Config`]): fatal
//!
//! Budget exhaustion, `NotModified`, and classification skips are not errors.

use camino::Utf8PathBuf;
use td_core::ContentId;

/// Failure reported by an external collaborator.
///
/// # Examples
///
/// ```
/// use td_scanner::SourceError;
///
/// let err = SourceError::not_found("repos/octocat/missing");
/// assert!(err.is_not_found());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The repository, ref, or object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A request failed in a way that may succeed later.
    #[error("transient failure: {0}")]
    Transient(String),

    /// A request exceeded its time bound.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl SourceError {
    /// Creates a new [`SourceError::NotFound`] error.
    #[inline]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates a new [`SourceError::Transient`] error.
    #[inline]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// Returns `true` for [`SourceError::NotFound`].
    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors surfaced by scanning operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanError {
    /// The target repository or ref does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Fetching one file's content failed.
    ///
    /// Recorded per file; the rest of the walk is unaffected.
    #[error("failed to fetch {path} ({content_id}): {source}")]
    Fetch {
        /// Path of the file whose content could not be fetched.
        path: Utf8PathBuf,
        /// Content identifier that was requested.
        content_id: ContentId,
        /// The collaborator's failure.
        #[source]
        source: SourceError,
    },

    /// A collaborator failed while serving a repository-level request.
    #[error("{context}: {source}")]
    Source {
        /// What was being requested.
        context: String,
        /// The collaborator's failure.
        #[source]
        source: SourceError,
    },

    /// Invalid scanner configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScanError {
    /// Creates a new [`ScanError::Fetch`] error.
    #[inline]
    pub fn fetch(
        path: impl Into<Utf8PathBuf>,
        content_id: ContentId,
        source: SourceError,
    ) -> Self {
        Self::Fetch {
            path: path.into(),
            content_id,
            source,
        }
    }

    /// Wraps a repository-level collaborator failure.
    ///
    /// A not-found failure becomes [`ScanError::NotFound`] so callers can
    /// tell a vanished target apart from an unhealthy source.
    pub fn from_source(context: impl Into<String>, source: SourceError) -> Self {
        let context = context.into();
        match source {
            SourceError::NotFound(_) => Self::NotFound(context),
            source => Self::Source { context, source },
        }
    }

    /// Creates a new [`ScanError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` if this error is recoverable (scanning can continue).
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// Returns `true` if this error is fatal for the target.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns `true` if the target does not exist.
    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Fetch { path, .. } => Some(path),
            Self::NotFound(_) | Self::Source { .. } | Self::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_fetch() {
        let err = ScanError::fetch(
            "src/app.js",
            ContentId::new("ab12"),
            SourceError::Timeout("blob ab12".to_owned()),
        );
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
        assert_eq!(err.path().map(|p| p.as_str()), Some("src/app.js"));
        assert!(err.to_string().contains("src/app.js"));
        assert!(err.to_string().contains("ab12"));
    }

    #[test]
    fn test_from_source_maps_not_found() {
        let err = ScanError::from_source(
            "tree for octocat/gone@master",
            SourceError::not_found("404"),
        );
        assert!(err.is_not_found());
        assert!(err.is_fatal());
        assert!(err.path().is_none());
    }

    #[test]
    fn test_from_source_keeps_other_failures() {
        let err = ScanError::from_source("rate limit", SourceError::transient("502"));
        assert!(matches!(err, ScanError::Source { .. }));
        assert_eq!(err.to_string(), "rate limit: transient failure: 502");
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::config("workers must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration: workers must be positive"
        );
    }
}
