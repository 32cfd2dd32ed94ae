//! Repository access policy.
//!
//! Sessions may be restricted to an allow-list of repositories. The policy is
//! built once from configuration and is immutable afterwards, so concurrent
//! dispatches read it without locking.
//!
//! An empty allow-list means unrestricted access: every syntactically valid
//! repository is permitted, and there is no bounded set to fan out across.

use thiserror::Error;

use crate::types::{RepoId, RepoParseError};

/// Error produced when an allow-list entry cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid allow-list entry '{entry}': {source}")]
pub struct PolicyError {
    pub entry: String,
    #[source]
    pub source: RepoParseError,
}

/// The configured repository allow-list.
#[derive(Debug, Clone, Default)]
pub struct RepoPolicy {
    /// Allowed repositories, deduplicated and sorted by canonical name.
    /// Empty means unrestricted.
    allowed: Vec<RepoId>,
}

impl RepoPolicy {
    /// A policy that permits every repository.
    pub fn unrestricted() -> Self {
        RepoPolicy::default()
    }

    /// Builds a policy from configured entries, each in any of the accepted
    /// reference formats. Entries are normalized, deduplicated
    /// (case-insensitively, across formats), and sorted by canonical name so
    /// fan-out order is deterministic.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self, PolicyError> {
        let mut allowed: Vec<RepoId> = Vec::with_capacity(entries.len());
        for entry in entries {
            let repo = RepoId::parse(entry.as_ref()).map_err(|source| PolicyError {
                entry: entry.as_ref().to_string(),
                source,
            })?;
            if !allowed.iter().any(|existing| existing.matches(&repo)) {
                allowed.push(repo);
            }
        }
        allowed.sort_by_key(|repo| repo.sort_key());
        Ok(RepoPolicy { allowed })
    }

    /// True when no allow-list is configured: every repository is permitted
    /// and there is no bounded set to iterate.
    pub fn is_unrestricted(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Whether the given repository may be operated on.
    pub fn is_allowed(&self, repo: &RepoId) -> bool {
        self.is_unrestricted() || self.allowed.iter().any(|allowed| allowed.matches(repo))
    }

    /// The allowed repositories, sorted by canonical name. Empty when the
    /// policy is unrestricted; callers needing "all repositories" must require
    /// an explicit target in that case.
    pub fn allowed(&self) -> &[RepoId] {
        &self.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_allows_everything() {
        let policy = RepoPolicy::unrestricted();
        assert!(policy.is_unrestricted());
        assert!(policy.is_allowed(&RepoId::new("microsoft", "vscode")));
        assert!(policy.is_allowed(&RepoId::new("any", "repo")));
        assert!(policy.allowed().is_empty());
    }

    #[test]
    fn empty_entry_list_is_unrestricted() {
        let policy = RepoPolicy::from_entries::<&str>(&[]).unwrap();
        assert!(policy.is_unrestricted());
    }

    #[test]
    fn bounded_policy_membership() {
        let policy =
            RepoPolicy::from_entries(&["microsoft/vscode", "python/cpython"]).unwrap();
        assert!(!policy.is_unrestricted());
        assert!(policy.is_allowed(&RepoId::new("microsoft", "vscode")));
        assert!(policy.is_allowed(&RepoId::new("python", "cpython")));
        assert!(!policy.is_allowed(&RepoId::new("facebook", "react")));
    }

    #[test]
    fn membership_is_case_insensitive() {
        let policy = RepoPolicy::from_entries(&["octocat/Hello-World"]).unwrap();
        assert!(policy.is_allowed(&RepoId::new("octocat", "hello-world")));
        assert!(policy.is_allowed(&RepoId::new("Octocat", "HELLO-WORLD")));
    }

    #[test]
    fn entries_accept_all_reference_formats() {
        let policy = RepoPolicy::from_entries(&[
            "https://github.com/microsoft/vscode",
            "git@github.com:python/cpython.git",
            "facebook/react",
        ])
        .unwrap();
        assert_eq!(policy.allowed().len(), 3);
        assert!(policy.is_allowed(&RepoId::new("microsoft", "vscode")));
        assert!(policy.is_allowed(&RepoId::new("python", "cpython")));
        assert!(policy.is_allowed(&RepoId::new("facebook", "react")));
    }

    #[test]
    fn duplicates_across_formats_are_collapsed() {
        let policy = RepoPolicy::from_entries(&[
            "https://github.com/microsoft/vscode",
            "git@github.com:microsoft/vscode.git",
            "Microsoft/VSCode",
        ])
        .unwrap();
        assert_eq!(policy.allowed().len(), 1);
    }

    #[test]
    fn allowed_is_sorted_by_canonical_name() {
        let policy =
            RepoPolicy::from_entries(&["zebra/repo", "apple/repo", "Microsoft/vscode"]).unwrap();
        let names: Vec<String> = policy.allowed().iter().map(|r| r.to_string()).collect();
        assert_eq!(names, vec!["apple/repo", "Microsoft/vscode", "zebra/repo"]);
    }

    #[test]
    fn invalid_entry_is_rejected() {
        let err = RepoPolicy::from_entries(&["not-a-repo"]).unwrap_err();
        assert_eq!(err.entry, "not-a-repo");
    }
}
