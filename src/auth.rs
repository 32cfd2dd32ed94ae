//! Token resolution.
//!
//! Authentication is attempted in this order:
//!
//! 1. explicit token in the configuration
//! 2. `GITHUB_TOKEN`, then `GH_TOKEN` environment variables
//! 3. the GitHub CLI (`gh auth token`), when `use_cli_auth` is set
//! 4. an interactive stdin prompt, when `prompt_if_missing` is set
//!
//! Resolution is best-effort: a failing source falls through to the next.
//! If nothing yields a token the tool still constructs; operations then fail
//! with authentication errors until a token is configured.

use std::time::Duration;

use tokio::process::Command;

use crate::config::GitHubConfig;

/// How long to wait for `gh auth token` before giving up on CLI auth.
const CLI_AUTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves a token from the configured sources, or `None` if every source
/// comes up empty.
pub async fn resolve_token(config: &GitHubConfig) -> Option<String> {
    if let Some(token) = config.token.as_deref() {
        let token = token.trim();
        if !token.is_empty() {
            tracing::debug!("using token from configuration");
            return Some(token.to_string());
        }
    }

    if let Some(token) = token_from_env(|name| std::env::var(name).ok()) {
        tracing::debug!("using token from environment");
        return Some(token);
    }

    if config.use_cli_auth {
        if let Some(token) = token_from_cli().await {
            tracing::debug!("using token from GitHub CLI");
            return Some(token);
        }
    }

    if config.prompt_if_missing {
        if let Some(token) = prompt_for_token().await {
            return Some(token);
        }
    }

    None
}

/// Reads a token from `GITHUB_TOKEN` or `GH_TOKEN` via the supplied lookup.
///
/// The lookup is injected so the precedence logic is testable without
/// touching process-global environment state.
fn token_from_env(get: impl Fn(&str) -> Option<String>) -> Option<String> {
    for name in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Some(value) = get(name) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Asks the GitHub CLI for its stored token.
async fn token_from_cli() -> Option<String> {
    let output = tokio::time::timeout(
        CLI_AUTH_TIMEOUT,
        Command::new("gh").args(["auth", "token"]).output(),
    )
    .await;

    match output {
        Ok(Ok(output)) if output.status.success() => {
            let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if token.is_empty() { None } else { Some(token) }
        }
        Ok(Ok(output)) => {
            tracing::debug!(status = %output.status, "gh auth token returned non-zero status");
            None
        }
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "GitHub CLI not available");
            None
        }
        Err(_) => {
            tracing::warn!("GitHub CLI command timed out");
            None
        }
    }
}

/// Prompts for a token on stdin. Returns `None` on EOF or an empty line.
async fn prompt_for_token() -> Option<String> {
    let line = tokio::task::spawn_blocking(|| {
        use std::io::{BufRead, Write};
        eprint!("GitHub token (leave empty to skip): ");
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).ok()?;
        Some(line)
    })
    .await
    .ok()
    .flatten()?;

    let token = line.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
