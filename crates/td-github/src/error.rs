//! Error types for the td-github crate.

use td_scanner::SourceError;

/// Errors raised while talking to the GitHub REST API.
///
/// Converted into [`SourceError`] at the collaborator boundary:
///
/// - `404` becomes [`SourceError::NotFound`]
/// - request timeouts become [`SourceError::Timeout`]
/// - malformed bodies become [`SourceError::Decode`]
/// - everything else becomes [`SourceError::Transient`]
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// The request could not be sent or the response could not be read.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// The requested URL.
        url: String,
        /// The underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with an unexpected status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body did not match the expected shape.
    #[error("malformed response from {url}: {source}")]
    Decode {
        /// The requested URL.
        url: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be configured.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// A configured header value was not valid.
    #[error("invalid {header} header value")]
    InvalidHeader {
        /// Name of the offending header.
        header: &'static str,
    },
}

impl GithubError {
    /// Creates a new [`GithubError::Transport`] error.
    #[inline]
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a new [`GithubError::Status`] error.
    #[inline]
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Returns `true` if the API reported the resource missing.
    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Returns `true` if the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

impl From<GithubError> for SourceError {
    fn from(err: GithubError) -> Self {
        if err.is_not_found() {
            return match err {
                GithubError::Status { url, .. } => Self::NotFound(url),
                other => Self::NotFound(other.to_string()),
            };
        }
        if err.is_timeout() {
            return Self::Timeout(err.to_string());
        }
        match err {
            GithubError::Decode { .. } => Self::Decode(err.to_string()),
            _ => Self::Transient(err.to_string()),
        }
    }
}
