//! Pre-command, release creation, post-command.
//!
//! Each step runs only if the previous one succeeded. A failing pre-release
//! command means no release exists; a failing post-release command fails the
//! run but leaves the already created release in place. Nothing is retried.

use crate::command::{CommandLine, CommandRunner};
use crate::error::Result;
use crate::registry::{NewRelease, PublishedRelease, ReleaseRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    pub version: String,
    pub body: String,
    pub is_draft: bool,
    pub pre_release_command: Option<CommandLine>,
    pub post_release_command: Option<CommandLine>,
}

impl ReleaseRequest {
    pub fn to_new_release(&self, target_commitish: &str) -> NewRelease {
        NewRelease::for_version(&self.version, &self.body, target_commitish, self.is_draft)
    }
}

pub struct Orchestrator<'a, R, C> {
    registry: &'a R,
    runner: &'a C,
    target_commitish: String,
}

impl<'a, R: ReleaseRegistry, C: CommandRunner> Orchestrator<'a, R, C> {
    pub fn new(registry: &'a R, runner: &'a C, target_commitish: impl Into<String>) -> Self {
        Orchestrator {
            registry,
            runner,
            target_commitish: target_commitish.into(),
        }
    }

    pub async fn release(&self, request: ReleaseRequest) -> Result<PublishedRelease> {
        if let Some(command) = &request.pre_release_command {
            self.runner.run("pre-release", command).await?;
        }

        let new_release = request.to_new_release(&self.target_commitish);
        tracing::info!(
            "release: creating tag={} target={} draft={} prerelease={}",
            new_release.tag_name,
            new_release.target_commitish,
            new_release.draft,
            new_release.prerelease
        );
        let published = self.registry.create_release(&new_release).await?;
        tracing::info!(
            "release: created id={} url={}",
            published.id,
            published.html_url
        );

        if let Some(command) = &request.post_release_command {
            self.runner.run("post-release", command).await?;
        }

        Ok(published)
    }
}
