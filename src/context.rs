use std::path::Path;
use std::sync::LazyLock;

use git2::Repository;
use regex::Regex;

use crate::error::{ReleaseError, Result};

/// Repository identity and the commit that triggered the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub owner: String,
    pub repo: String,
    pub sha: String,
}

/// Resolve the event context. Values from the runner environment win; local
/// runs fall back to the `origin` remote and `HEAD` of the workspace repo.
pub async fn resolve(
    repository: Option<&str>,
    sha: Option<&str>,
    workspace: &Path,
) -> Result<EventContext> {
    let (owner, repo) = match repository {
        Some(slug) => parse_slug(slug)?,
        None => infer_remote(workspace).await?,
    };
    let sha = match sha {
        Some(sha) => sha.to_string(),
        None => head_sha(workspace).await?,
    };
    tracing::debug!("context: repo={}/{} sha={}", owner, repo, sha);
    Ok(EventContext { owner, repo, sha })
}

/// Split `owner/name` as found in `GITHUB_REPOSITORY`.
pub fn parse_slug(slug: &str) -> Result<(String, String)> {
    match slug.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ReleaseError::Configuration(format!(
            "repository must be `owner/name`, got `{}`",
            slug
        ))),
    }
}

static SSH_REMOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@github\.com:(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?$")
        .expect("valid ssh remote pattern")
});

static HTTPS_REMOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://github\.com/(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$")
        .expect("valid https remote pattern")
});

/// Parse GitHub owner/repo from an SSH or HTTPS remote URL.
pub fn parse_github_remote(url: &str) -> Option<(String, String)> {
    let caps = SSH_REMOTE_RE
        .captures(url)
        .or_else(|| HTTPS_REMOTE_RE.captures(url))?;
    Some((caps["owner"].to_string(), caps["repo"].to_string()))
}

async fn infer_remote(root: &Path) -> Result<(String, String)> {
    let root = root.to_path_buf();
    blocking(move || {
        let repo = open(&root)?;
        let remotes = repo.remotes().map_err(git_error)?;
        let name = remotes
            .iter()
            .flatten()
            .find(|r| *r == "origin")
            .or_else(|| remotes.iter().flatten().next())
            .map(str::to_string)
            .ok_or_else(|| missing("no git remotes found and GITHUB_REPOSITORY is unset"))?;
        let remote = repo.find_remote(&name).map_err(git_error)?;
        let url = remote
            .url()
            .ok_or_else(|| missing("git remote has no URL"))?
            .to_string();
        parse_github_remote(&url).ok_or_else(|| {
            ReleaseError::Configuration(format!(
                "unsupported remote URL (expected GitHub): {}",
                url
            ))
        })
    })
    .await
}

async fn head_sha(root: &Path) -> Result<String> {
    let root = root.to_path_buf();
    blocking(move || {
        let repo = open(&root)?;
        let head = repo
            .head()
            .map_err(git_error)?
            .peel_to_commit()
            .map_err(git_error)?;
        Ok(head.id().to_string())
    })
    .await
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ReleaseError::Configuration(format!("context task join error: {}", e)))?
}

fn open(root: &Path) -> Result<Repository> {
    Repository::discover(root).map_err(|err| {
        ReleaseError::Configuration(format!(
            "event context not provided and {} is not a git repository: {}",
            root.display(),
            err.message()
        ))
    })
}

fn git_error(err: git2::Error) -> ReleaseError {
    ReleaseError::Configuration(format!("failed to read git repository: {}", err.message()))
}

fn missing(msg: &str) -> ReleaseError {
    ReleaseError::Configuration(msg.to_string())
}
