//! GitHub API execution layer.
//!
//! This module turns typed operations into octocrab calls:
//!
//! - [`GitHubClient`] wraps the octocrab instance and resolved authentication
//! - [`GitHubApi`] is the seam the dispatcher calls through (mockable in tests)
//! - [`GitHubApiError`] classifies failures at the API boundary
//! - one submodule per operation category holds the handlers
//!
//! Handlers return plain JSON values shaped for the result envelope; the
//! dispatcher owns repository tagging and error-code mapping.

mod actions;
mod api;
mod branches;
mod client;
mod commits;
mod error;
mod issues;
mod pulls;
mod releases;
mod repos;

pub use api::GitHubApi;
pub use client::GitHubClient;
pub use error::{Failure, GitHubApiError, classify};

/// Builds a query string from optional parameters, percent-encoding values.
/// Returns an empty string when no parameter is present.
pub(crate) fn query_string(pairs: &[(&str, Option<String>)]) -> String {
    let parts: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&"))
    }
}

/// Clamps a caller-supplied result limit into the 1..=100 range GitHub
/// accepts for a single page.
pub(crate) fn per_page(limit: u32) -> u32 {
    limit.clamp(1, 100)
}

/// Extracts one field from each element of a JSON array (e.g. label names or
/// assignee logins). Missing fields become `null`; a non-array input becomes
/// an empty array.
pub(crate) fn pluck(list: &serde_json::Value, key: &str) -> serde_json::Value {
    serde_json::Value::Array(
        list.as_array()
            .into_iter()
            .flatten()
            .map(|item| item[key].clone())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_skips_absent_values() {
        let q = query_string(&[
            ("state", Some("open".to_string())),
            ("assignee", None),
            ("per_page", Some("30".to_string())),
        ]);
        assert_eq!(q, "?state=open&per_page=30");
    }

    #[test]
    fn query_string_empty_when_nothing_present() {
        assert_eq!(query_string(&[("state", None)]), "");
        assert_eq!(query_string(&[]), "");
    }

    #[test]
    fn query_string_encodes_values() {
        let q = query_string(&[("branch", Some("feature/a b".to_string()))]);
        assert_eq!(q, "?branch=feature%2Fa%20b");
    }

    #[test]
    fn per_page_clamps() {
        assert_eq!(per_page(0), 1);
        assert_eq!(per_page(30), 30);
        assert_eq!(per_page(100), 100);
        assert_eq!(per_page(5000), 100);
    }

    #[test]
    fn pluck_extracts_fields() {
        let labels = serde_json::json!([{"name": "bug"}, {"name": "help wanted"}]);
        assert_eq!(pluck(&labels, "name"), serde_json::json!(["bug", "help wanted"]));
        assert_eq!(pluck(&serde_json::json!(null), "name"), serde_json::json!([]));
    }
}
