use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;

use crate::command::CommandLine;
use crate::error::{ReleaseError, Result};

pub const CONFIG_FILE: &str = ".changelog-release.toml";
pub const DEFAULT_CHANGELOG: &str = "CHANGELOG.md";

/// Action inputs. Each one is readable from the `INPUT_*` variable the
/// Actions runner exports for it.
#[derive(Args, Debug, Default, Clone)]
pub struct Inputs {
    /// Version to compare against; defaults to the latest GitHub release
    #[arg(long, env = "INPUT_PREVIOUS-VERSION")]
    pub previous_version: Option<String>,

    /// Path to the changelog, relative to the workspace
    #[arg(long, env = "INPUT_CHANGELOG-FILE")]
    pub changelog_file: Option<String>,

    /// Create the release as a draft ("true", case-insensitive)
    #[arg(long, env = "INPUT_IS-DRAFT")]
    pub is_draft: Option<String>,

    /// Command run before the release is created
    #[arg(long, env = "INPUT_PRE-RELEASE-COMMAND")]
    pub pre_release_command: Option<String>,

    /// Command run after the release is created
    #[arg(long, env = "INPUT_POST-RELEASE-COMMAND")]
    pub post_release_command: Option<String>,
}

/// Repository-level defaults read from [`CONFIG_FILE`].
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub changelog_file: Option<String>,
    pub is_draft: Option<bool>,
    pub pre_release_command: Option<String>,
    pub post_release_command: Option<String>,
}

pub async fn load_file_config(workspace: &Path) -> Result<FileConfig> {
    let path = workspace.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = tokio::fs::read_to_string(&path).await.map_err(|err| {
        ReleaseError::Configuration(format!("failed to read {}: {}", path.display(), err))
    })?;
    toml::from_str(&content).map_err(|err| {
        ReleaseError::Configuration(format!("failed to parse {}: {}", path.display(), err))
    })
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub previous_version: Option<String>,
    pub changelog_path: PathBuf,
    pub is_draft: bool,
    pub pre_release_command: Option<CommandLine>,
    pub post_release_command: Option<CommandLine>,
}

impl Settings {
    /// Inputs win over the file, the file over built-in defaults. Blank
    /// values count as unset.
    pub fn resolve(inputs: Inputs, file: FileConfig, workspace: &Path) -> Self {
        let changelog = non_blank(inputs.changelog_file)
            .or_else(|| non_blank(file.changelog_file))
            .unwrap_or_else(|| DEFAULT_CHANGELOG.to_string());
        let is_draft = match non_blank(inputs.is_draft) {
            Some(raw) => is_true(&raw),
            None => file.is_draft.unwrap_or(false),
        };
        Settings {
            previous_version: non_blank(inputs.previous_version),
            changelog_path: workspace.join(changelog),
            is_draft,
            pre_release_command: non_blank(inputs.pre_release_command)
                .or_else(|| non_blank(file.pre_release_command))
                .as_deref()
                .and_then(CommandLine::parse),
            post_release_command: non_blank(inputs.post_release_command)
                .or_else(|| non_blank(file.post_release_command))
                .as_deref()
                .and_then(CommandLine::parse),
        }
    }
}

/// Only a case-insensitive `true` enables a flag; anything else is false.
pub fn is_true(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
