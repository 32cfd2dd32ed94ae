//! Tool configuration.
//!
//! The configuration is loaded once (typically from the host's settings JSON)
//! and passed into the tool at construction time. It is never mutated
//! afterwards.

use serde::Deserialize;

/// The public GitHub API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Settings consumed at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token or GitHub App token. When absent, other
    /// authentication sources are tried in order (environment, `gh` CLI,
    /// interactive prompt).
    pub token: Option<String>,

    /// Fall back to `gh auth token` when no token is configured.
    pub use_cli_auth: bool,

    /// Prompt on stdin as a last resort when no other source yields a token.
    pub prompt_if_missing: bool,

    /// API base URL; override for GitHub Enterprise. Does not affect
    /// repository identifier canonicalization.
    pub base_url: String,

    /// Repository allow-list, in any accepted reference format.
    /// Empty means unrestricted.
    pub repositories: Vec<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            token: None,
            use_cli_auth: true,
            prompt_if_missing: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            repositories: Vec::new(),
        }
    }
}

impl GitHubConfig {
    /// True when pointed at the public GitHub endpoint rather than an
    /// enterprise installation.
    pub fn is_public_github(&self) -> bool {
        self.base_url == DEFAULT_BASE_URL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GitHubConfig::default();
        assert_eq!(config.token, None);
        assert!(config.use_cli_auth);
        assert!(config.prompt_if_missing);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.repositories.is_empty());
        assert!(config.is_public_github());
    }

    #[test]
    fn deserialize_partial_settings() {
        let config: GitHubConfig = serde_json::from_str(
            r#"{"token": "ghp_x", "repositories": ["octocat/Hello-World"]}"#,
        )
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("ghp_x"));
        assert!(config.use_cli_auth);
        assert_eq!(config.repositories, vec!["octocat/Hello-World"]);
    }

    #[test]
    fn deserialize_enterprise_base_url() {
        let config: GitHubConfig =
            serde_json::from_str(r#"{"base_url": "https://github.example.com/api/v3"}"#).unwrap();
        assert!(!config.is_public_github());
    }
}
