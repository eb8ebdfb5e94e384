mod normalize;
mod parser;

use std::path::Path;

use thiserror::Error;

use crate::error::{ReleaseError, Result};

pub use parser::{Changelog, parse};

#[derive(Debug, Error)]
pub enum ChangelogError {
    #[error("failed to read staged changelog")]
    Read(#[source] std::io::Error),
    #[error("changelog is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("changelog must start with a top-level heading, found `{line}`")]
    MissingTitle { line: String },
    #[error("changelog contains no version entries")]
    NoVersions,
    #[error("newest changelog entry `{heading}` has no version identifier")]
    UnversionedEntry { heading: String },
}

/// The newest release described by the changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub version: String,
    pub body: String,
    pub heading: String,
    pub date: Option<String>,
}

impl TryFrom<Changelog> for VersionEntry {
    type Error = ChangelogError;

    fn try_from(changelog: Changelog) -> Result<Self, Self::Error> {
        let newest = changelog
            .versions
            .into_iter()
            .next()
            .ok_or(ChangelogError::NoVersions)?;
        let Some(version) = newest.version.filter(|v| !v.is_empty()) else {
            return Err(ChangelogError::UnversionedEntry {
                heading: newest.title,
            });
        };
        Ok(VersionEntry {
            version,
            body: newest.body,
            heading: newest.title,
            date: newest.date,
        })
    }
}

/// Read and parse the changelog at `path` as it currently is on disk.
pub async fn parse_file(path: &Path) -> Result<Changelog, ChangelogError> {
    let bytes = tokio::fs::read(path).await.map_err(ChangelogError::Read)?;
    let text = String::from_utf8(bytes)?;
    let changelog = parse(&text)?;
    tracing::debug!(
        "changelog: parsed title={:?} description_len={} versions={}",
        changelog.title,
        changelog.description.len(),
        changelog.versions.len()
    );
    Ok(changelog)
}

/// Extract the newest version entry without leaving the changelog modified.
///
/// The file is staged with a synthetic top-level heading for the duration of
/// the parse and restored afterwards whatever the parse outcome. A failed
/// restore is reported ahead of any parse error.
pub async fn extract_latest(path: &Path) -> Result<VersionEntry> {
    let original = normalize::stage(path).await?;
    let parsed = parse_file(path).await;
    normalize::restore(path, &original).await?;

    let entry = parsed
        .and_then(VersionEntry::try_from)
        .map_err(|source| ReleaseError::Extraction {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(
        "changelog: latest version={} heading={:?} date={:?} body_len={}",
        entry.version,
        entry.heading,
        entry.date,
        entry.body.len()
    );
    Ok(entry)
}
