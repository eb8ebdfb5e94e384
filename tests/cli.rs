use std::fs;
use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use tempfile::TempDir;

const CHANGELOG: &str = "## 1.2.0

Added feature Y

## 1.1.0

Fixed bug X
";

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn release_cmd(root: &Path) -> Result<Command> {
    let mut cmd = Command::cargo_bin("changelog-release")?;
    cmd.current_dir(root);
    for var in [
        "GITHUB_TOKEN",
        "GITHUB_API_URL",
        "GITHUB_ACTIONS",
        "RUNNER_DEBUG",
        "RUST_LOG",
        "INPUT_PREVIOUS-VERSION",
        "INPUT_CHANGELOG-FILE",
        "INPUT_IS-DRAFT",
        "INPUT_PRE-RELEASE-COMMAND",
        "INPUT_POST-RELEASE-COMMAND",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("GITHUB_REPOSITORY", "acme/widget");
    cmd.env("GITHUB_SHA", "3f2a9c1");
    cmd.env("GITHUB_WORKSPACE", root);
    Ok(cmd)
}

#[test]
fn dry_run_prints_release_plan() -> Result<()> {
    let td = TempDir::new()?;
    let root = td.path();
    write_file(&root.join("CHANGELOG.md"), CHANGELOG)?;

    let output = release_cmd(root)?
        .args(["--dry-run", "--previous-version", "1.1.0"])
        .output()?;
    assert!(
        output.status.success(),
        "status: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout)?;
    insta::assert_snapshot!(stdout, @r###"release: dry-run (repo=acme/widget previous=1.1.0)
name: v1.2.0
tag: v1.2.0
target: 3f2a9c1
draft: false
prerelease: false
pre-release command: <none>
post-release command: <none>
---
Added feature Y
"###);

    assert_eq!(fs::read_to_string(root.join("CHANGELOG.md"))?, CHANGELOG);
    Ok(())
}

#[test]
fn dry_run_reads_inputs_and_config_file() -> Result<()> {
    let td = TempDir::new()?;
    let root = td.path();
    write_file(
        &root.join("docs/CHANGES.md"),
        "# Changes\n\n## [2.0.0-beta.1] - 2024-06-01\n\n- Rewrite\n",
    )?;
    write_file(
        &root.join(".changelog-release.toml"),
        "changelog_file = \"docs/CHANGES.md\"\npre_release_command = \"make   dist\"\n",
    )?;

    let output = release_cmd(root)?
        .env("INPUT_IS-DRAFT", "TRUE")
        .env("INPUT_PREVIOUS-VERSION", "1.9.0")
        .env("INPUT_POST-RELEASE-COMMAND", "./scripts/announce.sh v2")
        .arg("--dry-run")
        .output()?;
    assert!(
        output.status.success(),
        "status: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout)?;
    insta::assert_snapshot!(stdout, @r###"release: dry-run (repo=acme/widget previous=1.9.0)
name: v2.0.0-beta.1
tag: v2.0.0-beta.1
target: 3f2a9c1
draft: true
prerelease: true
pre-release command: make dist
post-release command: ./scripts/announce.sh v2
---
- Rewrite
"###);
    Ok(())
}

#[test]
fn same_version_is_a_successful_no_op() -> Result<()> {
    let td = TempDir::new()?;
    let root = td.path();
    write_file(&root.join("CHANGELOG.md"), "## 1.1.0\n\nFixed bug X\n")?;
    let marker = root.join("pre-ran");

    let output = release_cmd(root)?
        .env("GITHUB_TOKEN", "test-token")
        .env("GITHUB_ACTIONS", "true")
        .args(["--previous-version", "1.1.0"])
        .arg("--pre-release-command")
        .arg(format!("touch {}", marker.display()))
        .output()?;
    assert!(
        output.status.success(),
        "status: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(
        stdout,
        "::warning::No new version found. Latest version in changelog (1.1.0) is the same as the previous version (1.1.0).\n"
    );
    assert!(!marker.exists());
    Ok(())
}

#[test]
fn same_version_needs_no_token_or_repository() -> Result<()> {
    let td = TempDir::new()?;
    let root = td.path();
    write_file(&root.join("CHANGELOG.md"), "## 1.1.0\n\nFixed bug X\n")?;

    let output = release_cmd(root)?
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("GITHUB_SHA")
        .args(["--previous-version", "1.1.0"])
        .output()?;
    assert!(
        output.status.success(),
        "status: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No new version found."), "stderr: {}", stderr);
    assert!(!stderr.contains("GITHUB_TOKEN"), "stderr: {}", stderr);
    Ok(())
}

#[test]
fn dry_run_with_previous_version_needs_no_token() -> Result<()> {
    let td = TempDir::new()?;
    let root = td.path();
    write_file(&root.join("CHANGELOG.md"), CHANGELOG)?;

    let output = release_cmd(root)?
        .args(["--dry-run", "--previous-version", "1.1.0"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("release: dry-run (repo=acme/widget previous=1.1.0)"));
    Ok(())
}

#[test]
fn piped_logs_carry_no_ansi_escapes() -> Result<()> {
    let td = TempDir::new()?;
    let root = td.path();
    write_file(&root.join("CHANGELOG.md"), CHANGELOG)?;

    let output = release_cmd(root)?
        .args(["--dry-run", "--previous-version", "1.1.0"])
        .output()?;
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("changelog: latest version=1.2.0"), "stderr: {}", stderr);
    assert!(!stderr.contains('\x1b'), "stderr: {:?}", stderr);
    Ok(())
}

#[test]
fn failing_pre_release_command_aborts() -> Result<()> {
    let td = TempDir::new()?;
    let root = td.path();
    write_file(&root.join("CHANGELOG.md"), CHANGELOG)?;
    let marker = root.join("post-ran");

    let output = release_cmd(root)?
        .env("GITHUB_TOKEN", "test-token")
        .args(["--previous-version", "1.1.0"])
        .args(["--pre-release-command", "false"])
        .arg("--post-release-command")
        .arg(format!("touch {}", marker.display()))
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("pre-release command `false` failed"),
        "stderr: {}",
        stderr
    );
    assert!(!marker.exists());
    assert_eq!(fs::read_to_string(root.join("CHANGELOG.md"))?, CHANGELOG);
    Ok(())
}

#[test]
fn missing_changelog_fails() -> Result<()> {
    let td = TempDir::new()?;
    let root = td.path();

    let output = release_cmd(root)?
        .args(["--dry-run", "--previous-version", "1.0.0"])
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read changelog"), "stderr: {}", stderr);
    Ok(())
}

#[test]
fn changelog_without_versions_fails_and_is_restored() -> Result<()> {
    let td = TempDir::new()?;
    let root = td.path();
    let content = "# Changelog\n\nNothing released yet.\n";
    write_file(&root.join("CHANGELOG.md"), content)?;

    let output = release_cmd(root)?
        .args(["--dry-run", "--previous-version", "1.0.0"])
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("changelog contains no version entries"),
        "stderr: {}",
        stderr
    );
    assert_eq!(fs::read_to_string(root.join("CHANGELOG.md"))?, content);
    Ok(())
}
