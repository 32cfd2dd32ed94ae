//! Repository identifiers and the normalizer that produces them.
//!
//! A repository can be referenced in three forms:
//!
//! - HTTPS URL: `https://github.com/owner/repo` (optionally with `.git`)
//! - SSH URL: `git@github.com:owner/repo` (optionally with `.git`)
//! - Bare: `owner/repo`
//!
//! All three normalize to the same canonical `owner/name` pair. The host is
//! deliberately ignored: a GitHub Enterprise base URL changes which API
//! endpoint is called, not the identity of the repository.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error produced when a repository reference cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoParseError {
    /// The input matched none of the three accepted forms.
    #[error(
        "unrecognized repository format: '{0}' (expected 'owner/repo', an HTTPS URL, or an SSH URL)"
    )]
    Unrecognized(String),

    /// The input matched a form but the owner or name component was empty.
    #[error("repository reference '{0}' has an empty owner or name component")]
    EmptyComponent(String),
}

/// A repository identifier in canonical `owner/name` form.
///
/// Equality and hashing are case-sensitive (the components are stored as
/// given); use [`RepoId::matches`] for the case-insensitive comparison that
/// GitHub itself applies to owner and repository names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Normalizes a repository reference in any of the three accepted forms.
    ///
    /// # Examples
    ///
    /// ```
    /// use github_tool::types::RepoId;
    ///
    /// let canonical = RepoId::new("octocat", "Hello-World");
    /// assert_eq!(RepoId::parse("octocat/Hello-World").unwrap(), canonical);
    /// assert_eq!(
    ///     RepoId::parse("https://github.com/octocat/Hello-World.git").unwrap(),
    ///     canonical
    /// );
    /// assert_eq!(
    ///     RepoId::parse("git@github.com:octocat/Hello-World.git").unwrap(),
    ///     canonical
    /// );
    /// assert!(RepoId::parse("not-a-repo").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<RepoId, RepoParseError> {
        let trimmed = input.trim();

        let path = if let Some(rest) = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
        {
            // HTTPS form: host/owner/name, optional trailing slash
            let rest = rest.trim_end_matches('/');
            let mut segments = rest.split('/');
            let _host = segments
                .next()
                .ok_or_else(|| RepoParseError::Unrecognized(input.to_string()))?;
            let owner = segments.next();
            let name = segments.next();
            match (owner, name, segments.next()) {
                (Some(owner), Some(name), None) => format!("{}/{}", owner, name),
                _ => return Err(RepoParseError::Unrecognized(input.to_string())),
            }
        } else if let Some(rest) = trimmed.strip_prefix("git@") {
            // SSH form: host:owner/name
            let (_host, path) = rest
                .split_once(':')
                .ok_or_else(|| RepoParseError::Unrecognized(input.to_string()))?;
            path.to_string()
        } else if trimmed.contains("://") || trimmed.contains('@') {
            // Some other scheme or user@host form we don't support.
            return Err(RepoParseError::Unrecognized(input.to_string()));
        } else {
            trimmed.to_string()
        };

        // All three forms reduce to an owner/name pair here.
        let path = path.strip_suffix(".git").unwrap_or(&path);
        let mut segments = path.split('/');
        let (owner, name) = match (segments.next(), segments.next(), segments.next()) {
            (Some(owner), Some(name), None) => (owner.trim(), name.trim()),
            _ => return Err(RepoParseError::Unrecognized(input.to_string())),
        };

        if owner.is_empty() || name.is_empty() {
            return Err(RepoParseError::EmptyComponent(input.to_string()));
        }

        Ok(RepoId::new(owner, name))
    }

    /// Case-insensitive comparison, matching GitHub's treatment of owner and
    /// repository names.
    pub fn matches(&self, other: &RepoId) -> bool {
        self.owner.eq_ignore_ascii_case(&other.owner) && self.name.eq_ignore_ascii_case(&other.name)
    }

    /// Lowercased `(owner, name)` pair, used to order and deduplicate
    /// identifiers deterministically.
    pub fn sort_key(&self) -> (String, String) {
        (
            self.owner.to_ascii_lowercase(),
            self.name.to_ascii_lowercase(),
        )
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_https_url() {
        assert_eq!(
            RepoId::parse("https://github.com/owner/repo").unwrap(),
            RepoId::new("owner", "repo")
        );
        assert_eq!(
            RepoId::parse("https://github.com/owner/repo.git").unwrap(),
            RepoId::new("owner", "repo")
        );
        assert_eq!(
            RepoId::parse("https://github.com/owner/repo/").unwrap(),
            RepoId::new("owner", "repo")
        );
    }

    #[test]
    fn parse_enterprise_host_is_ignored() {
        assert_eq!(
            RepoId::parse("https://github.company.com/owner/repo").unwrap(),
            RepoId::new("owner", "repo")
        );
    }

    #[test]
    fn parse_ssh_url() {
        assert_eq!(
            RepoId::parse("git@github.com:owner/repo.git").unwrap(),
            RepoId::new("owner", "repo")
        );
        assert_eq!(
            RepoId::parse("git@github.com:owner/repo").unwrap(),
            RepoId::new("owner", "repo")
        );
    }

    #[test]
    fn parse_bare_form() {
        assert_eq!(
            RepoId::parse("owner/repo").unwrap(),
            RepoId::new("owner", "repo")
        );
        assert_eq!(
            RepoId::parse("  owner/repo  ").unwrap(),
            RepoId::new("owner", "repo")
        );
    }

    #[test]
    fn parse_rejects_invalid_input() {
        assert!(RepoId::parse("invalid").is_err());
        assert!(RepoId::parse("").is_err());
        assert!(RepoId::parse("   ").is_err());
        assert!(RepoId::parse("owner/repo/extra").is_err());
        assert!(RepoId::parse("https://github.com/owner").is_err());
        assert!(RepoId::parse("https://github.com/owner/repo/extra").is_err());
        assert!(RepoId::parse("ssh://git@github.com/owner/repo").is_err());
        assert!(RepoId::parse("user@host/owner/repo").is_err());
    }

    #[test]
    fn parse_rejects_empty_components() {
        assert_eq!(
            RepoId::parse("owner/"),
            Err(RepoParseError::EmptyComponent("owner/".to_string()))
        );
        assert_eq!(
            RepoId::parse("/repo"),
            Err(RepoParseError::EmptyComponent("/repo".to_string()))
        );
        assert_eq!(
            RepoId::parse("git@github.com:owner/.git"),
            Err(RepoParseError::EmptyComponent(
                "git@github.com:owner/.git".to_string()
            ))
        );
    }

    #[test]
    fn matches_is_case_insensitive() {
        let a = RepoId::new("Octocat", "Hello-World");
        let b = RepoId::new("octocat", "hello-world");
        assert!(a.matches(&b));
        assert!(b.matches(&a));
        assert!(!a.matches(&RepoId::new("octocat", "other")));
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(
            format!("{}", RepoId::new("octocat", "Hello-World")),
            "octocat/Hello-World"
        );
    }

    proptest! {
        /// All three input forms representing the same repository normalize to
        /// an identical canonical identifier.
        #[test]
        fn format_invariance(
            owner in "[a-zA-Z][a-zA-Z0-9-]{0,38}",
            name in "[a-zA-Z][a-zA-Z0-9_.-]{0,60}",
        ) {
            prop_assume!(!name.ends_with(".git"));
            let bare = RepoId::parse(&format!("{}/{}", owner, name)).unwrap();
            let https = RepoId::parse(&format!("https://github.com/{}/{}", owner, name)).unwrap();
            let https_git =
                RepoId::parse(&format!("https://github.com/{}/{}.git", owner, name)).unwrap();
            let ssh = RepoId::parse(&format!("git@github.com:{}/{}.git", owner, name)).unwrap();
            prop_assert_eq!(&bare, &https);
            prop_assert_eq!(&bare, &https_git);
            prop_assert_eq!(&bare, &ssh);
        }

        /// Parsing never panics on arbitrary input.
        #[test]
        fn parse_total(input in ".{0,100}") {
            let _ = RepoId::parse(&input);
        }

        /// Round trip: the display form of a parsed bare identifier parses back
        /// to the same value.
        #[test]
        fn display_roundtrip(
            owner in "[a-zA-Z][a-zA-Z0-9-]{0,38}",
            name in "[a-zA-Z][a-zA-Z0-9_-]{0,60}",
        ) {
            let id = RepoId::new(&owner, &name);
            prop_assert_eq!(RepoId::parse(&format!("{}", id)).unwrap(), id);
        }
    }
}
