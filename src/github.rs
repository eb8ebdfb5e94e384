use anyhow::{Context, Result};
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;

use crate::error::ReleaseError;
use crate::registry::{NewRelease, PublishedRelease, ReleaseRegistry};

/// Fetch the GitHub token from the environment.
pub fn token() -> Result<String> {
    match std::env::var("GITHUB_TOKEN") {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => Err(anyhow::anyhow!("missing GITHUB_TOKEN for GitHub API")),
    }
}

/// Build an authenticated Octocrab client from `GITHUB_TOKEN`, honouring
/// `GITHUB_API_URL` for GitHub Enterprise runners.
pub fn client() -> Result<Octocrab> {
    let token = token()?;
    let api_url = std::env::var("GITHUB_API_URL")
        .ok()
        .filter(|url| !url.is_empty());
    client_for(token, api_url.as_deref())
}

/// Octocrab retries 5xx, 429 and connection errors by default; every
/// registry call here is made exactly once.
pub fn client_for(token: String, api_url: Option<&str>) -> Result<Octocrab> {
    let mut builder = Octocrab::builder();
    builder.add_retry_config(RetryConfig::None);
    let mut builder = builder.personal_token(token);
    if let Some(api_url) = api_url {
        builder = builder
            .base_uri(api_url)
            .with_context(|| format!("invalid GITHUB_API_URL {}", api_url))?;
    }
    builder.build().context("failed to build GitHub client")
}

/// GitHub Releases of a single repository.
pub struct GitHubRegistry {
    gh: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubRegistry {
    pub fn new(gh: Octocrab, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        GitHubRegistry {
            gh,
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl ReleaseRegistry for GitHubRegistry {
    async fn latest_release_tag(&self) -> crate::error::Result<Option<String>> {
        let page = self
            .gh
            .repos(self.owner.clone(), self.repo.clone())
            .releases()
            .list()
            .per_page(1)
            .send()
            .await
            .map_err(|err| ReleaseError::registry("list releases", err))?;
        let tag = page.items.first().map(|r| r.tag_name.clone());
        tracing::debug!(
            "github: latest release of {}/{} is {:?}",
            self.owner,
            self.repo,
            tag
        );
        Ok(tag)
    }

    async fn create_release(&self, release: &NewRelease) -> crate::error::Result<PublishedRelease> {
        let created = self
            .gh
            .repos(self.owner.clone(), self.repo.clone())
            .releases()
            .create(&release.tag_name)
            .name(&release.name)
            .target_commitish(&release.target_commitish)
            .body(&release.body)
            .draft(release.draft)
            .prerelease(release.prerelease)
            .send()
            .await
            .map_err(|err| ReleaseError::registry("create release", err))?;
        Ok(PublishedRelease {
            id: created.id.0,
            tag_name: created.tag_name,
            html_url: created.html_url.to_string(),
        })
    }
}
