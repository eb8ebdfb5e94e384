use tokio::process::Command;

use crate::error::{ReleaseError, Result};

/// A caller-supplied command split into program and arguments.
///
/// Splitting is on whitespace only. There is no quoting and no shell, so
/// `echo "a b"` runs `echo` with the two arguments `"a` and `b"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut tokens = raw.split_whitespace().map(str::to_string);
        let program = tokens.next()?;
        Some(CommandLine {
            program,
            args: tokens.collect(),
        })
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs external commands to completion.
pub trait CommandRunner {
    /// `stage` names the step (`pre-release`, `post-release`) for errors.
    async fn run(&self, stage: &'static str, command: &CommandLine) -> Result<()>;
}

/// Spawns real processes with inherited stdio.
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, stage: &'static str, command: &CommandLine) -> Result<()> {
        tracing::info!("command: running {} command `{}`", stage, command);
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .await
            .map_err(|err| ReleaseError::CommandExecution {
                stage,
                command: command.to_string(),
                reason: format!("failed to spawn: {}", err),
            })?;
        if !status.success() {
            return Err(ReleaseError::CommandExecution {
                stage,
                command: command.to_string(),
                reason: format!("exited with {}", status),
            });
        }
        Ok(())
    }
}
