//! Configuration structures for todo-scan.
//!
//! - [`ScanConfig`] - Which ref to scan, worker pool size, extension rule
//! - [`GithubConfig`] - REST endpoint, credentials, request timeout
//! - [`Config`] - Root configuration combining both
//!
//! All configuration types implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a config file only needs the fields it overrides.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a file's language token is extracted from its path.
///
/// # Examples
///
/// ```
/// use td_core::ExtensionRule;
///
/// assert_eq!(ExtensionRule::default(), ExtensionRule::FirstDot);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionRule {
    /// Word characters after the first `.` anywhere in the path.
    ///
    /// A dot in a directory name wins over the file's own extension
    /// (`v1.2/main.rs` yields `2`).
    #[default]
    FirstDot,

    /// Word characters after the last `.` of the final path segment.
    FileNameLastDot,
}

/// Configuration for the scanner.
///
/// # Examples
///
/// ```
/// use td_core::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert_eq!(config.git_ref, "master");
/// assert!(config.workers.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Branch, tag, or commit whose tree is scanned.
    pub git_ref: String,

    /// Number of fetch-and-scan workers.
    /// `None` means use all available CPU cores.
    pub workers: Option<usize>,

    /// Extension extraction rule used by the file classifier.
    pub extension_rule: ExtensionRule,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            git_ref: "master".to_owned(),
            workers: None,
            extension_rule: ExtensionRule::FirstDot,
        }
    }
}

/// Configuration for the GitHub REST adapter.
///
/// # Examples
///
/// ```
/// use td_core::GithubConfig;
///
/// let config = GithubConfig::default();
/// assert_eq!(config.api_base, "https://api.github.com");
/// assert_eq!(config.timeout_ms, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub api_base: String,

    /// Personal access token sent as a bearer token, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// `User-Agent` header value (GitHub rejects requests without one).
    pub user_agent: String,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_owned(),
            token: None,
            user_agent: concat!("todo-scan/", env!("CARGO_PKG_VERSION")).to_owned(),
            timeout_ms: 10_000,
        }
    }
}

/// Root configuration for todo-scan.
///
/// # Examples
///
/// ```
/// use td_core::Config;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scanner configuration.
    pub scan: ScanConfig,

    /// GitHub adapter configuration.
    pub github: GithubConfig,
}

impl Config {
    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it is not valid JSON, and
    /// [`ConfigError::InvalidOption`] if validation fails.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_std_path()).map_err(|source| {
            ConfigError::Io {
                path: path.to_owned(),
                source,
            }
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option values that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] naming the first bad option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.git_ref.trim().is_empty() {
            return Err(ConfigError::invalid_option("scan.git_ref", "must not be empty"));
        }
        if self.scan.workers == Some(0) {
            return Err(ConfigError::invalid_option("scan.workers", "must be at least 1"));
        }
        if self.github.timeout_ms == 0 {
            return Err(ConfigError::invalid_option("github.timeout_ms", "must be positive"));
        }
        if self.github.api_base.ends_with('/') {
            return Err(ConfigError::invalid_option(
                "github.api_base",
                "must not end with '/'",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scan_config_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.git_ref, "master");
        assert_eq!(config.workers, None);
        assert_eq!(config.extension_rule, ExtensionRule::FirstDot);
    }

    #[test]
    fn test_github_config_defaults() {
        let config = GithubConfig::default();
        assert_eq!(config.api_base, "https://api.github.com");
        assert!(config.token.is_none());
        assert!(config.user_agent.starts_with("todo-scan/"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"scan": {"git_ref": "main", "extension_rule": "file_name_last_dot"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.scan.git_ref, "main");
        assert_eq!(config.scan.extension_rule, ExtensionRule::FileNameLastDot);
        assert_eq!(config.github.timeout_ms, 10_000);
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::default();
        config.scan.workers = Some(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scan.workers"));
    }

    #[test]
    fn test_validate_rejects_trailing_slash() {
        let mut config = Config::default();
        config.github.api_base = "https://ghe.example.com/api/v3/".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"github": {{"timeout_ms": 2500}}}}"#).unwrap();
        let path = Utf8Path::from_path(file.path()).unwrap();

        let config = Config::from_file(path).unwrap();
        assert_eq!(config.github.timeout_ms, 2500);
        assert_eq!(config.scan.git_ref, "master");
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file(Utf8Path::new("/nonexistent/todo-scan.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
