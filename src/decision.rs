use crate::error::Result;
use crate::registry::ReleaseRegistry;

/// Baseline used when the repository has never been released.
pub const INITIAL_VERSION: &str = "0.0.0";

/// Only string equality is tested; the newest changelog entry is trusted to
/// be the intended release.
pub fn should_release(latest: &str, previous: &str) -> bool {
    latest != previous
}

/// Version part of a release tag, e.g. `v1.2.0` -> `1.2.0`.
pub fn version_from_tag(tag: &str) -> &str {
    tag.trim_start_matches(|c: char| !c.is_ascii_digit())
}

/// Explicit input wins; otherwise ask the registry for its newest release.
pub async fn resolve_previous_version<R: ReleaseRegistry>(
    explicit: Option<&str>,
    registry: &R,
) -> Result<String> {
    if let Some(version) = explicit {
        tracing::debug!("decision: previous version supplied as {}", version);
        return Ok(version.to_string());
    }

    let previous = match registry.latest_release_tag().await? {
        Some(tag) => version_from_tag(&tag).to_string(),
        None => INITIAL_VERSION.to_string(),
    };
    tracing::info!("decision: previous version from registry is {}", previous);
    Ok(previous)
}
