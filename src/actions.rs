//! GitHub Actions workflow commands.
//!
//! Annotations are written to stdout only when running under Actions, so
//! local runs keep a clean stdout. Logging goes through `tracing` either way.

pub fn in_actions() -> bool {
    std::env::var("GITHUB_ACTIONS")
        .map(|v| v == "true")
        .unwrap_or(false)
}

pub fn warning(message: &str) {
    tracing::warn!("{}", message);
    if in_actions() {
        println!("{}", annotation("warning", message));
    }
}

pub fn error(message: &str) {
    if in_actions() {
        println!("{}", annotation("error", message));
    }
}

/// Format a workflow command, escaping the message as the runner expects.
pub fn annotation(level: &str, message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::{}::{}", level, escaped)
}
