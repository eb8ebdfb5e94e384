use std::path::PathBuf;

use thiserror::Error;

use crate::changelog::ChangelogError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can stop a release run.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("failed to {action} changelog {}", path.display())]
    FileAccess {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract latest version from {}", path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: ChangelogError,
    },

    #[error("{stage} command `{command}` failed: {reason}")]
    CommandExecution {
        stage: &'static str,
        command: String,
        reason: String,
    },

    #[error("release registry failed to {operation}")]
    Registry {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl ReleaseError {
    pub fn file_access(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        ReleaseError::FileAccess {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn registry(operation: &'static str, source: impl Into<BoxError>) -> Self {
        ReleaseError::Registry {
            operation,
            source: source.into(),
        }
    }
}

pub type Result<T, E = ReleaseError> = std::result::Result<T, E>;
