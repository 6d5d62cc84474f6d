use anyhow::{anyhow, bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Response;
use std::env;
use tracing::{debug, warn};

use crate::config::Config;
use crate::policy::{ProtectionRequest, Repo, RepoSettings};

/// Environment variable holding the bearer credential.
///
/// The token needs full repo rights to update settings and protections.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub REST client wrapper with authentication management
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    account: String,
}

impl GitHubClient {
    /// Create a client for the configured account.
    ///
    /// Every request carries the bearer credential, the GitHub media type,
    /// and the pinned API version.
    pub fn new(config: &Config, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| anyhow!("{TOKEN_ENV} contains characters not valid in a header"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("repoconform/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_url: config.github.api_url.trim_end_matches('/').to_string(),
            account: config.github.account.clone(),
        })
    }

    /// Get the configured account name
    pub fn account(&self) -> &str {
        &self.account
    }

    /// List all repositories for the account, archived ones included.
    ///
    /// Failures here are fatal to the caller: without the repository set
    /// there is no further work to do.
    pub async fn list_repositories(&self) -> Result<Vec<Repo>> {
        debug!("Fetching repositories for account: {}", self.account);

        let mut repositories = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "{}/users/{}/repos?per_page=100&page={}",
                self.api_url, self.account, page
            );
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Failed to fetch repositories page {}", page))?;

            if !response.status().is_success() {
                return Err(api_error("Listing repositories", response).await);
            }

            let items: Vec<Repo> = response
                .json()
                .await
                .with_context(|| format!("Failed to decode repositories page {}", page))?;
            if items.is_empty() {
                break;
            }

            repositories.extend(items);

            // GitHub caps user repo listings well below this
            if page >= 255 {
                warn!("Reached maximum pagination limit (255 pages)");
                break;
            }
            page += 1;
        }

        debug!("Found {} repositories", repositories.len());
        Ok(repositories)
    }

    /// Apply the desired settings to one repository.
    ///
    /// A partial update, safe to repeat: applying the same settings twice
    /// leaves the repository unchanged.
    pub async fn update_repository_settings(
        &self,
        repo: &str,
        settings: &RepoSettings,
    ) -> Result<()> {
        let url = format!("{}/repos/{}/{}", self.api_url, self.account, repo);
        let response = self
            .http
            .patch(&url)
            .json(settings)
            .send()
            .await
            .with_context(|| format!("Failed to send settings update for '{repo}'"))?;

        if !response.status().is_success() {
            return Err(api_error(&format!("Updating settings for '{repo}'"), response).await);
        }

        debug!("Updated settings for repository: {}", repo);
        Ok(())
    }

    /// Check whether a workflow file has any run history in a repository.
    ///
    /// The response status is the signal: 2xx means runs exist, anything
    /// else (typically 404 for a missing workflow file) means none. Only
    /// transport failures surface as errors.
    pub async fn workflow_has_runs(&self, repo: &str, workflow_file: &str) -> Result<bool> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/runs",
            self.api_url, self.account, repo, workflow_file
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to query workflow runs for '{repo}'"))?;

        let status = response.status();
        if status.is_success() {
            debug!("Workflow {} has runs in {}", workflow_file, repo);
            Ok(true)
        } else {
            debug!(
                "Workflow {} has no runs in {} ({})",
                workflow_file, repo, status
            );
            Ok(false)
        }
    }

    /// Replace the branch protection rules for one repository branch.
    pub async fn update_branch_protection(
        &self,
        repo: &str,
        branch: &str,
        protection: &ProtectionRequest,
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/branches/{}/protection",
            self.api_url, self.account, repo, branch
        );
        let response = self
            .http
            .put(&url)
            .json(protection)
            .send()
            .await
            .with_context(|| format!("Failed to send branch protection for '{repo}':{branch}"))?;

        if !response.status().is_success() {
            return Err(api_error(
                &format!("Updating branch protection for '{repo}':{branch}"),
                response,
            )
            .await);
        }

        debug!("Updated branch protection for {}:{}", repo, branch);
        Ok(())
    }
}

/// Build the fatal error for a non-2xx response, keeping the status code
/// and raw body so the operator can diagnose without re-running.
async fn api_error(operation: &str, response: Response) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    anyhow!("{operation} failed ({}): {body}", status.as_u16())
}

/// Read the bearer credential from the environment.
///
/// Called before any API work so a missing token fails the run up front.
pub fn token_from_env() -> Result<String> {
    let token = env::var(TOKEN_ENV)
        .map_err(|_| anyhow!("{TOKEN_ENV} environment variable not set"))?;

    if token.is_empty() {
        bail!("{TOKEN_ENV} is empty");
    }

    if !token.starts_with("ghp_") && !token.starts_with("gho_") && !token.starts_with("ghs_") {
        warn!("{TOKEN_ENV} doesn't look like a valid GitHub token (should start with ghp_, gho_, or ghs_)");
    }

    Ok(token)
}
