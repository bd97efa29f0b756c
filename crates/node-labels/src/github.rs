//! # GitHub Label Repository
//!
//! Reads the labels that exist on a repository, the files changed by a pull
//! request, and adds labels to pull requests through the GitHub REST API.
//!
//! List endpoints are paginated 100 items per page; the client follows the
//! `Link: <...>; rel="next"` header until GitHub stops sending one. Failures
//! are returned to the caller, never swallowed into an empty result.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::{Config, DEFAULT_API_URL};

const PER_PAGE: u32 = 100;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid repository '{0}', expected owner/repo")]
    InvalidRepository(String),
}

/// Store of record for a repository's labels and pull requests.
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Names of every label defined on `owner/repo`.
    async fn fetch_existing_labels(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<BTreeSet<String>, GitHubError>;

    /// Paths changed by a pull request, in the order GitHub lists them.
    async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<String>, GitHubError>;

    /// Name of the branch a pull request targets.
    async fn pull_request_base(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<String, GitHubError>;

    /// Add labels to a pull request.
    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<(), GitHubError>;
}

#[derive(Debug, Deserialize)]
struct GitHubLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestFile {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    base: BranchRef,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

/// GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http_client: HttpClient,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Client for api.github.com.
    pub fn new(token: Option<String>) -> Result<Self, GitHubError> {
        Self::with_base_url(DEFAULT_API_URL, token)
    }

    /// Client for a specific API endpoint (GitHub Enterprise, test servers).
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, GitHubError> {
        let http_client = HttpClient::builder()
            .user_agent(concat!("node-labels/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GitHubError> {
        Self::with_base_url(config.api_url.clone(), config.github_token.clone())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self
            .http_client
            .request(method, url)
            .header(header::ACCEPT, "application/vnd.github+json");

        match &self.token {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// GET every page of a list endpoint, starting at `url`.
    async fn get_all_pages<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>, GitHubError> {
        let mut items = Vec::new();
        let mut next = Some(url);
        let mut pages = 0_u32;

        while let Some(url) = next {
            let response = check_status(self.request(Method::GET, &url).send().await?).await?;

            next = response
                .headers()
                .get(header::LINK)
                .and_then(|h| h.to_str().ok())
                .and_then(parse_next_link);

            let page: Vec<T> = response.json().await?;
            pages += 1;
            debug!(page = pages, items = page.len(), "Fetched page");
            items.extend(page);
        }

        Ok(items)
    }
}

#[async_trait]
impl LabelRepository for GitHubClient {
    #[instrument(skip(self))]
    async fn fetch_existing_labels(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<BTreeSet<String>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/labels?per_page={}",
            self.base_url, owner, repo, PER_PAGE
        );

        let labels: Vec<GitHubLabel> = self.get_all_pages(url).await?;
        let names: BTreeSet<String> = labels.into_iter().map(|label| label.name).collect();

        info!(count = names.len(), "Fetched existing labels");
        Ok(names)
    }

    #[instrument(skip(self))]
    async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<String>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/files?per_page={}",
            self.base_url, owner, repo, number, PER_PAGE
        );

        let files: Vec<PullRequestFile> = self.get_all_pages(url).await?;
        debug!(count = files.len(), "Fetched pull request files");
        Ok(files.into_iter().map(|f| f.filename).collect())
    }

    #[instrument(skip(self))]
    async fn pull_request_base(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<String, GitHubError> {
        let url = format!("{}/repos/{}/{}/pulls/{}", self.base_url, owner, repo, number);

        let response = check_status(self.request(Method::GET, &url).send().await?).await?;
        let pr: PullRequest = response.json().await?;
        Ok(pr.base.name)
    }

    #[instrument(skip(self, labels), fields(count = labels.len()))]
    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<(), GitHubError> {
        if labels.is_empty() {
            return Ok(());
        }

        let url = format!(
            "{}/repos/{}/{}/issues/{}/labels",
            self.base_url, owner, repo, number
        );

        let body = serde_json::json!({ "labels": labels });
        check_status(self.request(Method::POST, &url).json(&body).send().await?).await?;

        info!(pr = number, count = labels.len(), "Added labels");
        Ok(())
    }
}

/// Turn a non-success response into [`GitHubError::Api`].
async fn check_status(response: Response) -> Result<Response, GitHubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GitHubErrorBody>(&body)
        .map_or(body, |error| error.message);

    Err(GitHubError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Extract the `rel="next"` target from a `Link` header.
#[must_use]
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });

        if !is_next {
            return None;
        }

        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// Split `owner/repo`.
pub fn parse_repo(repo: &str) -> Result<(&str, &str), GitHubError> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(GitHubError::InvalidRepository(repo.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_next_link() {
        let header = r#"<https://api.github.com/repositories/1/labels?page=2>; rel="next", <https://api.github.com/repositories/1/labels?page=5>; rel="last""#;
        assert_eq!(
            parse_next_link(header).as_deref(),
            Some("https://api.github.com/repositories/1/labels?page=2")
        );
    }

    #[test]
    fn test_parse_next_link_last_page() {
        let header = r#"<https://api.github.com/repositories/1/labels?page=1>; rel="prev", <https://api.github.com/repositories/1/labels?page=1>; rel="first""#;
        assert!(parse_next_link(header).is_none());
        assert!(parse_next_link("").is_none());
    }

    #[test]
    fn test_parse_repo() {
        assert_eq!(parse_repo("nodejs/node").unwrap(), ("nodejs", "node"));
        assert!(parse_repo("nodejs").is_err());
        assert!(parse_repo("/node").is_err());
        assert!(parse_repo("nodejs/node/extra").is_err());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = GitHubClient::with_base_url("http://localhost:1234/", None).unwrap();
        assert_eq!(client.base_url, "http://localhost:1234");
    }
}
