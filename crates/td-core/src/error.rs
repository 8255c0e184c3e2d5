//! Error types for the td-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration-related
//! errors that can occur across the workspace.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use td_core::ConfigError;
///
/// let error = ConfigError::InvalidOption {
///     option: "scan.workers".to_owned(),
///     reason: "must be at least 1".to_owned(),
/// };
/// assert!(error.to_string().contains("scan.workers"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::invalid_option("github.timeout_ms", "must be positive");
        let msg = error.to_string();
        assert!(msg.contains("github.timeout_ms"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_io_display_includes_path() {
        let error = ConfigError::Io {
            path: Utf8PathBuf::from("/etc/todo-scan.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(error.to_string().contains("/etc/todo-scan.json"));
    }
}
