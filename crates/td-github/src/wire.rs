//! Response bodies of the GitHub v3 endpoints the adapter calls.
//!
//! Only the fields the scanner reads are modelled; serde ignores the rest.

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use td_core::{ContentId, EntryType, RepositoryInfo, RepositorySnapshot, TreeEntry};

use crate::error::GithubError;

/// `GET repos/{owner}/{name}/git/trees/{ref}?recursive=1`
#[derive(Debug, Deserialize)]
pub(crate) struct TreeResponse {
    pub tree: Vec<TreeItem>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeItem {
    pub path: Utf8PathBuf,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub sha: ContentId,
}

impl TreeResponse {
    pub fn into_snapshot(self) -> RepositorySnapshot {
        self.tree
            .into_iter()
            .map(|item| TreeEntry::new(item.path, item.entry_type, item.sha))
            .collect()
    }
}

/// `GET rate_limit`
#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitResponse {
    pub rate: Rate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Rate {
    pub remaining: u64,
}

/// `GET repos/{owner}/{name}`
#[derive(Debug, Deserialize)]
pub(crate) struct RepoResponse {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub homepage: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub forks: u64,
    #[serde(default)]
    pub watchers: u64,
    #[serde(default)]
    pub open_issues: u64,
}

impl From<RepoResponse> for RepositoryInfo {
    fn from(repo: RepoResponse) -> Self {
        Self {
            created_at: repo.created_at,
            updated_at: repo.updated_at,
            // An empty homepage is how the API says "none".
            homepage: repo.homepage.filter(|h| !h.is_empty()),
            description: repo.description,
            language: repo.language,
            forks: repo.forks,
            stars: repo.watchers,
            open_issues: repo.open_issues,
        }
    }
}

/// Decodes a JSON body, tagging failures with the request URL.
pub(crate) fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, GithubError> {
    serde_json::from_slice(body).map_err(|source| GithubError::Decode {
        url: url.to_owned(),
        source,
    })
}

/// Formats a timestamp as an RFC 7231 HTTP date.
pub(crate) fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decode_tree() {
        let body = br#"{
            "sha": "root",
            "tree": [
                {"path": "lib", "mode": "040000", "type": "tree", "sha": "t1"},
                {"path": "lib/a.rb", "mode": "100644", "type": "blob", "sha": "b1", "size": 12},
                {"path": "vendor/x", "mode": "160000", "type": "commit", "sha": "c1"}
            ],
            "truncated": false
        }"#;
        let tree: TreeResponse = decode("u", body).unwrap();
        assert!(!tree.truncated);

        let snapshot = tree.into_snapshot();
        let types: Vec<_> = snapshot.entries().iter().map(|e| e.entry_type).collect();
        assert_eq!(types, [EntryType::Tree, EntryType::Blob, EntryType::Other]);
        assert_eq!(snapshot.entries()[1].path.as_str(), "lib/a.rb");
        assert_eq!(snapshot.entries()[1].content_id.as_str(), "b1");
    }

    #[test]
    fn test_decode_rate_limit() {
        let body = br#"{"resources": {}, "rate": {"limit": 5000, "remaining": 4321, "reset": 1}}"#;
        let rate: RateLimitResponse = decode("u", body).unwrap();
        assert_eq!(rate.rate.remaining, 4321);
    }

    #[test]
    fn test_decode_repo_info() {
        let body = br#"{
            "full_name": "octocat/hello",
            "created_at": "2011-01-26T19:01:12Z",
            "updated_at": "2011-01-26T19:14:43Z",
            "homepage": "",
            "description": "My first repo",
            "language": null,
            "forks": 9,
            "watchers": 80,
            "stargazers_count": 80,
            "open_issues": 0
        }"#;
        let repo: RepoResponse = decode("u", body).unwrap();
        let info = RepositoryInfo::from(repo);
        assert_eq!(info.stars, 80);
        assert_eq!(info.forks, 9);
        assert_eq!(info.homepage, None);
        assert_eq!(info.description.as_deref(), Some("My first repo"));
        assert_eq!(
            info.created_at,
            Some(Utc.with_ymd_and_hms(2011, 1, 26, 19, 1, 12).unwrap())
        );
    }

    #[test]
    fn test_decode_error_carries_url() {
        let err = decode::<RateLimitResponse>("https://api.github.com/rate_limit", b"{}").unwrap_err();
        assert!(matches!(err, GithubError::Decode { ref url, .. } if url.ends_with("rate_limit")));
    }

    #[test]
    fn test_http_date() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(http_date(at), "Tue, 05 Mar 2024 07:08:09 GMT");
    }
}
