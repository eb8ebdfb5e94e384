//! Keep-a-Changelog style grammar.
//!
//! A document is a top-level `# Title`, an optional free-text description,
//! and a sequence of `## <version heading>` blocks, newest first. The first
//! non-blank line must be the top-level heading; documents that open
//! directly with a version heading are rejected, which is why extraction
//! stages the file through [`super::normalize`] first.

use std::sync::LazyLock;

use regex::Regex;

use super::ChangelogError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[?v?([\w.-]+\.[\w.-]+[a-zA-Z0-9])\]?").expect("valid version pattern")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid date pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelog {
    pub title: String,
    pub description: String,
    pub versions: Vec<VersionBlock>,
}

/// One `##` section of the changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBlock {
    /// Heading text without the leading `##`.
    pub title: String,
    /// Version identifier found in the heading, `None` for sections such as
    /// `## Unreleased`.
    pub version: Option<String>,
    pub date: Option<String>,
    pub body: String,
}

impl VersionBlock {
    fn open(heading: &str) -> Self {
        let version = VERSION_RE
            .captures(heading)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let date = DATE_RE.find(heading).map(|m| m.as_str().to_string());
        VersionBlock {
            title: heading.to_string(),
            version,
            date,
            body: String::new(),
        }
    }
}

pub fn parse(input: &str) -> Result<Changelog, ChangelogError> {
    let mut lines = input.lines().skip_while(|l| l.trim().is_empty());

    let first = lines.next().unwrap_or_default();
    let title = match heading(first) {
        Some((1, text)) => text.to_string(),
        _ => {
            return Err(ChangelogError::MissingTitle {
                line: first.to_string(),
            });
        }
    };

    let mut description: Vec<&str> = Vec::new();
    let mut versions = Vec::new();
    let mut current: Option<(VersionBlock, Vec<&str>)> = None;
    let mut fence: Option<char> = None;

    for line in lines {
        if let Some(marker) = fence {
            if is_fence(line) == Some(marker) {
                fence = None;
            }
            push_line(&mut current, &mut description, line);
            continue;
        }
        if let Some(marker) = is_fence(line) {
            fence = Some(marker);
            push_line(&mut current, &mut description, line);
            continue;
        }

        match heading(line) {
            // Extra top-level headings are document structure, never content.
            Some((1, _)) => {}
            Some((2, text)) => {
                if let Some((block, body)) = current.take() {
                    versions.push(finish(block, &body));
                }
                current = Some((VersionBlock::open(text), Vec::new()));
            }
            _ => push_line(&mut current, &mut description, line),
        }
    }
    if let Some((block, body)) = current.take() {
        versions.push(finish(block, &body));
    }

    Ok(Changelog {
        title,
        description: join_trimmed(&description),
        versions,
    })
}

fn push_line<'a>(
    current: &mut Option<(VersionBlock, Vec<&'a str>)>,
    description: &mut Vec<&'a str>,
    line: &'a str,
) {
    match current {
        Some((_, body)) => body.push(line),
        None => description.push(line),
    }
}

fn finish(mut block: VersionBlock, body: &[&str]) -> VersionBlock {
    block.body = join_trimmed(body);
    block
}

/// Join lines, dropping blank lines at either end only.
fn join_trimmed(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

/// ATX heading level and text, if `line` is one.
fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level == 0 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((level, rest.trim()))
}

fn is_fence(line: &str) -> Option<char> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some('`')
    } else if trimmed.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}
