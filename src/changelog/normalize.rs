use std::path::Path;

use crate::error::{ReleaseError, Result};

/// Prepended while the changelog is parsed so that version-first documents
/// still open with a top-level heading.
pub const SYNTHETIC_HEADING: &str = "# Changelog (staged)\n\n";

/// Rewrite the changelog with [`SYNTHETIC_HEADING`] in front and return the
/// original bytes. Must be paired with [`restore`].
pub async fn stage(path: &Path) -> Result<Vec<u8>> {
    let original = tokio::fs::read(path)
        .await
        .map_err(|err| ReleaseError::file_access("read", path, err))?;

    let mut staged = Vec::with_capacity(SYNTHETIC_HEADING.len() + original.len());
    staged.extend_from_slice(SYNTHETIC_HEADING.as_bytes());
    staged.extend_from_slice(&original);
    if let Err(err) = tokio::fs::write(path, &staged).await {
        // A failed write may have truncated the file already.
        if let Err(restore_err) = restore(path, &original).await {
            tracing::error!(
                "changelog: restore after failed stage of {} failed: {:#}",
                path.display(),
                restore_err
            );
        }
        return Err(ReleaseError::file_access("stage", path, err));
    }

    tracing::debug!(
        "changelog: staged path={} bytes={}",
        path.display(),
        original.len()
    );
    Ok(original)
}

/// Put the exact original bytes back, truncating the staged content.
pub async fn restore(path: &Path, original: &[u8]) -> Result<()> {
    tokio::fs::write(path, original)
        .await
        .map_err(|err| ReleaseError::file_access("restore", path, err))?;
    tracing::debug!("changelog: restored path={}", path.display());
    Ok(())
}
