use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::export::IssueSource;
use crate::github::paginator::{Paginator, PER_PAGE};
use crate::github::rate_limit::RateLimitStatus;
use crate::models::{Issue, IssueState, Label, RepoId};

pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::build(
            &config.github_token,
            &config.api_url,
            Client::builder().timeout(config.request_timeout),
        )
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        Self::build(token, base_url, Client::builder())
    }

    fn build(token: &str, base_url: &str, builder: reqwest::ClientBuilder) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::Config("GitHub token is empty".to_string()));
        }

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", token.trim()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("gh2csv/", env!("CARGO_PKG_VERSION"))),
        );

        let client = builder.default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Pages of issues for `repo`, oldest first.
    pub fn issue_pages(&self, repo: &RepoId, state: IssueState) -> Paginator<'_, Issue> {
        let url = format!(
            "{}/repos/{}/{}/issues?state={}&direction=asc&per_page={}",
            self.base_url, repo.owner, repo.name, state, PER_PAGE
        );
        Paginator::new(&self.client, url, format!("repository {}", repo))
    }

    pub fn label_pages(&self, repo: &RepoId) -> Paginator<'_, Label> {
        let url = format!(
            "{}/repos/{}/{}/labels?per_page={}",
            self.base_url, repo.owner, repo.name, PER_PAGE
        );
        Paginator::new(&self.client, url, format!("labels of repository {}", repo))
    }
}

#[async_trait]
impl IssueSource for GitHubClient {
    async fn fetch_issues(&self, repo: &RepoId, state: IssueState) -> Result<Vec<Issue>> {
        tracing::info!("Fetching {} issues for: {}", state, repo);
        self.issue_pages(repo, state).fetch_all().await
    }

    async fn fetch_labels(&self, repo: &RepoId) -> Result<Vec<Label>> {
        tracing::info!("Fetching labels for: {}", repo);
        self.label_pages(repo).fetch_all().await
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Turns a non-success response into the matching error category.
pub(crate) async fn ensure_success(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let rate_limit = RateLimitStatus::from_headers(response.headers());
    let reset_at = rate_limit.reset_hint(response.headers());
    let has_retry_after = response.headers().contains_key(header::RETRY_AFTER);

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);
    let code = status.as_u16();

    tracing::debug!("Request for {} failed: {} - {}", context, status, message);

    let err = match status {
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            status: code,
            reset_at,
            message,
        },
        StatusCode::FORBIDDEN if rate_limit.is_exhausted() || has_retry_after => {
            Error::RateLimited {
                status: code,
                reset_at,
                message,
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication {
            status: code,
            message,
        },
        StatusCode::NOT_FOUND => Error::NotFound {
            status: code,
            message: format!("{} ({})", context, message),
        },
        _ => Error::GitHubApi {
            status: code,
            message: format!("failed to fetch {}: {}", context, message),
        },
    };

    Err(err)
}
