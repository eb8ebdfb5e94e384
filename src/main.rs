mod actions;
mod changelog;
mod command;
mod config;
mod context;
mod decision;
mod error;
mod github;
mod orchestrator;
mod registry;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::command::ProcessRunner;
use crate::config::{Inputs, Settings};
use crate::context::EventContext;
use crate::github::GitHubRegistry;
use crate::orchestrator::{Orchestrator, ReleaseRequest};

#[derive(Parser, Debug)]
#[command(
    name = "changelog-release",
    version,
    about = "Publish a GitHub release from the newest CHANGELOG entry",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    inputs: Inputs,

    /// Repository as owner/name; inferred from the origin remote when unset
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Commit the release tag points at; defaults to HEAD
    #[arg(long, env = "GITHUB_SHA")]
    sha: Option<String>,

    /// Workspace the changelog path is relative to
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    /// Extract and decide, but create nothing and run no commands
    #[arg(long = "dry-run", default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            actions::error(&format!("{:#}", err));
            eprintln!("Error: {:?}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let default = if std::env::var("RUNNER_DEBUG").as_deref() == Ok("1") {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let file = config::load_file_config(&cli.workspace).await?;
    let settings = Settings::resolve(cli.inputs.clone(), file, &cli.workspace);
    tracing::debug!("config: {:?}", settings);

    let entry = changelog::extract_latest(&settings.changelog_path).await?;

    // An explicit previous version is decided on before any context or
    // credentials are needed.
    let (previous, connected) = match settings.previous_version.clone() {
        Some(previous) => (previous, None),
        None => {
            let (ctx, registry) = connect(&cli).await?;
            let previous = decision::resolve_previous_version(None, &registry).await?;
            (previous, Some((ctx, registry)))
        }
    };

    if !decision::should_release(&entry.version, &previous) {
        actions::warning(&format!(
            "No new version found. Latest version in changelog ({}) is the same as the previous version ({}).",
            entry.version, previous
        ));
        return Ok(());
    }

    let request = ReleaseRequest {
        version: entry.version,
        body: entry.body,
        is_draft: settings.is_draft,
        pre_release_command: settings.pre_release_command,
        post_release_command: settings.post_release_command,
    };

    if cli.dry_run {
        let ctx = match connected {
            Some((ctx, _)) => ctx,
            None => event_context(&cli).await?,
        };
        print_plan(&request, &ctx, &previous);
        return Ok(());
    }

    let (ctx, registry) = match connected {
        Some(connected) => connected,
        None => connect(&cli).await?,
    };
    let orchestrator = Orchestrator::new(&registry, &ProcessRunner, ctx.sha.clone());
    let published = orchestrator.release(request).await?;
    println!(
        "release: created (tag={} url={})",
        published.tag_name, published.html_url
    );
    Ok(())
}

async fn event_context(cli: &Cli) -> Result<EventContext> {
    context::resolve(cli.repository.as_deref(), cli.sha.as_deref(), &cli.workspace)
        .await
        .context("failed to determine repository and commit")
}

async fn connect(cli: &Cli) -> Result<(EventContext, GitHubRegistry)> {
    let ctx = event_context(cli).await?;
    let gh = github::client()?;
    let registry = GitHubRegistry::new(gh, ctx.owner.clone(), ctx.repo.clone());
    Ok((ctx, registry))
}

fn print_plan(request: &ReleaseRequest, ctx: &EventContext, previous: &str) {
    let release = request.to_new_release(&ctx.sha);
    let none = || String::from("<none>");
    println!("release: dry-run (repo={}/{} previous={})", ctx.owner, ctx.repo, previous);
    println!("name: {}", release.name);
    println!("tag: {}", release.tag_name);
    println!("target: {}", release.target_commitish);
    println!("draft: {}", release.draft);
    println!("prerelease: {}", release.prerelease);
    println!(
        "pre-release command: {}",
        request
            .pre_release_command
            .as_ref()
            .map_or_else(none, |c| c.to_string())
    );
    println!(
        "post-release command: {}",
        request
            .post_release_command
            .as_ref()
            .map_or_else(none, |c| c.to_string())
    );
    println!("---\n{}", release.body);
}
