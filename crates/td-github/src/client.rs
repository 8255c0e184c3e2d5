//! Blocking GitHub REST client.
//!
//! [`GithubClient`] implements every collaborator trait of `td-scanner`
//! against the v3 API:
//!
//! | trait               | endpoint                                        |
//! |---------------------|-------------------------------------------------|
//! | `TreeSource`        | `repos/{owner}/{name}/git/trees/{ref}?recursive=1` |
//! | `ContentSource`     | `repos/{owner}/{name}/git/blobs/{sha}` (raw)    |
//! | `RateBudgetSource`  | `rate_limit`                                    |
//! | `FreshnessSource`   | `repos/{owner}/{name}` with `If-Modified-Since` |
//! | `InfoSource`        | `repos/{owner}/{name}`                          |
//!
//! A blob id alone is not addressable on GitHub, so a client is created for
//! one repository and resolves every content fetch against it. Tree,
//! freshness, and info queries use the repository they are given.
//!
//! The client is blocking. It must not be created, used, or dropped inside
//! an async runtime.

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, IF_MODIFIED_SINCE};
use td_core::{ContentId, Freshness, GithubConfig, RepoRef, RepositoryInfo, RepositorySnapshot};
use td_scanner::{
    ContentSource, FreshnessSource, InfoSource, RateBudgetSource, SourceError, TreeSource,
};
use tracing::{debug, trace, warn};

use crate::error::GithubError;
use crate::wire::{self, RateLimitResponse, RepoResponse, TreeResponse};

/// Default media type for JSON endpoints.
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Media type that makes the blobs endpoint return raw bytes.
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// REST API version pinned on every request.
const API_VERSION: &str = "2022-11-28";

/// Response header carrying the remaining call budget.
const RATE_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// GitHub REST adapter scoped to one repository.
#[derive(Debug)]
pub struct GithubClient {
    http: Client,
    api_base: String,
    repo: RepoRef,
    last_remaining: Mutex<Option<u64>>,
}

impl GithubClient {
    /// Creates a client for `repo`.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::InvalidHeader`] if the token cannot be sent as
    /// a header, or [`GithubError::Build`] if the HTTP client cannot be
    /// configured.
    pub fn new(config: &GithubConfig, repo: RepoRef) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| GithubError::InvalidHeader {
                    header: "Authorization",
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(GithubError::Build)?;

        debug!(
            api_base = %config.api_base,
            %repo,
            authenticated = config.token.is_some(),
            "GitHub client ready"
        );

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            repo,
            last_remaining: Mutex::new(None),
        })
    }

    /// The repository content fetches resolve against.
    pub const fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// The remaining budget reported by the most recent response, if any.
    ///
    /// Unlike [`RateBudgetSource::remaining_calls`] this makes no request.
    pub fn last_known_remaining(&self) -> Option<u64> {
        *self.last_remaining.lock()
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.api_base, path)
    }

    fn send(&self, url: &str, request: RequestBuilder) -> Result<Response, GithubError> {
        trace!(url, "GET");
        let response = request
            .send()
            .map_err(|e| GithubError::transport(url, e))?;
        if let Some(remaining) = remaining_from_headers(response.headers()) {
            *self.last_remaining.lock() = Some(remaining);
        }
        Ok(response)
    }

    fn get_body(&self, url: &str, accept: Option<&'static str>) -> Result<Vec<u8>, GithubError> {
        let mut request = self.http.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        let response = self.send(url, request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::status(url, status.as_u16()));
        }
        let body = response
            .bytes()
            .map_err(|e| GithubError::transport(url, e))?;
        Ok(body.to_vec())
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, GithubError> {
        let body = self.get_body(url, None)?;
        wire::decode(url, &body)
    }

    fn get_tree(&self, repo: &RepoRef, git_ref: &str) -> Result<RepositorySnapshot, GithubError> {
        let url = self.url(&format!(
            "repos/{}/{}/git/trees/{git_ref}?recursive=1",
            repo.owner, repo.name
        ));
        let tree: TreeResponse = self.get_json(&url)?;
        if tree.truncated {
            warn!(%repo, git_ref, "Tree listing truncated by the API, scan will be partial");
        }
        Ok(tree.into_snapshot())
    }

    fn get_blob(&self, id: &ContentId) -> Result<Vec<u8>, GithubError> {
        let url = self.url(&format!(
            "repos/{}/{}/git/blobs/{id}",
            self.repo.owner, self.repo.name
        ));
        self.get_body(&url, Some(RAW_MEDIA_TYPE))
    }

    fn get_freshness(&self, repo: &RepoRef, since: DateTime<Utc>) -> Result<Freshness, GithubError> {
        let url = self.url(&format!("repos/{}/{}", repo.owner, repo.name));
        let request = self.http.get(&url).header(IF_MODIFIED_SINCE, wire::http_date(since));
        let status = self.send(&url, request)?.status();
        freshness_from_status(status).ok_or_else(|| GithubError::status(&url, status.as_u16()))
    }
}

impl TreeSource for GithubClient {
    fn snapshot(&self, repo: &RepoRef, git_ref: &str) -> Result<RepositorySnapshot, SourceError> {
        Ok(self.get_tree(repo, git_ref)?)
    }
}

impl ContentSource for GithubClient {
    fn fetch(&self, id: &ContentId) -> Result<Vec<u8>, SourceError> {
        Ok(self.get_blob(id)?)
    }
}

impl RateBudgetSource for GithubClient {
    fn remaining_calls(&self) -> Result<u64, SourceError> {
        let url = self.url("rate_limit");
        let rate: RateLimitResponse = self.get_json(&url)?;
        Ok(rate.rate.remaining)
    }
}

impl FreshnessSource for GithubClient {
    fn check_modified_since(
        &self,
        repo: &RepoRef,
        since: DateTime<Utc>,
    ) -> Result<Freshness, SourceError> {
        Ok(self.get_freshness(repo, since)?)
    }
}

impl InfoSource for GithubClient {
    fn info(&self, repo: &RepoRef) -> Result<RepositoryInfo, SourceError> {
        let url = self.url(&format!("repos/{}/{}", repo.owner, repo.name));
        let response: RepoResponse = self.get_json(&url)?;
        Ok(response.into())
    }
}

/// Joins the API base and an endpoint path.
fn endpoint(api_base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Maps a conditional repository request's status to freshness.
fn freshness_from_status(status: StatusCode) -> Option<Freshness> {
    match status {
        StatusCode::NOT_MODIFIED => Some(Freshness::NotModified),
        StatusCode::NOT_FOUND => Some(Freshness::NotFound),
        s if s.is_success() => Some(Freshness::Modified),
        _ => None,
    }
}

fn remaining_from_headers(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RATE_REMAINING_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
