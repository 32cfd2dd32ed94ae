//! GitHub API error types.
//!
//! This module classifies failures from the octocrab client into the small
//! set of failure classes the dispatcher cares about. Classification happens
//! once, at the API boundary; the dispatcher then maps a class (plus the
//! operation's resource context, for not-found) onto the wire error taxonomy.
//!
//! No retries happen here: rate limits and transient network failures are
//! surfaced to the caller, whose framework owns the retry policy.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The class of a GitHub API failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Missing or rejected credentials (401, or no token configured).
    Authentication,

    /// The addressed resource does not exist or is not visible (404).
    /// Which wire code this becomes depends on the operation's resource.
    NotFound,

    /// Primary or secondary rate limit (429, or 403 with rate-limit markers).
    RateLimit {
        /// When the limit resets, if the API said.
        reset: Option<DateTime<Utc>>,
    },

    /// The credentials are valid but lack access (403, non-rate-limit).
    Permission,

    /// The API rejected the request as malformed (422).
    Validation,

    /// Anything else: 5xx, network failures, decode errors.
    Unexpected,
}

/// A classified GitHub API error.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The failure class.
    pub failure: Failure,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates an authentication error with no underlying octocrab source.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self {
            failure: Failure::Authentication,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a validation error with no underlying octocrab source.
    ///
    /// Used for parameter problems only detectable inside a handler (e.g.
    /// `get_release` called with neither `release_id` nor `tag_name`).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            failure: Failure::Validation,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unexpected error with no underlying octocrab source.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            failure: Failure::Unexpected,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Classifies an octocrab error by HTTP status and message content.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = extract_status_code(&err);
        let message = match &err {
            octocrab::Error::GitHub { source, .. } => source.message.clone(),
            other => other.to_string(),
        };

        let failure = classify(status_code, &message);

        Self {
            failure,
            status_code,
            message,
            source: Some(err),
        }
    }
}

/// Maps a status code and message to a failure class.
///
/// This is a pure function extracted for testability.
pub fn classify(status_code: Option<u16>, message: &str) -> Failure {
    match status_code {
        Some(401) => Failure::Authentication,
        Some(429) => Failure::RateLimit { reset: None },
        Some(403) if is_rate_limit_message(message) => Failure::RateLimit { reset: None },
        Some(403) => Failure::Permission,
        Some(404) => Failure::NotFound,
        Some(422) => Failure::Validation,
        Some(_) => Failure::Unexpected,
        None => {
            if is_rate_limit_message(message) {
                Failure::RateLimit { reset: None }
            } else if is_auth_message(message) {
                Failure::Authentication
            } else {
                Failure::Unexpected
            }
        }
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// `octocrab::Error::GitHub` carries the status directly. Other variants
/// (transport failures, decode errors) don't expose one; for those we fall
/// back to scanning the rendered message for well-established markers, and
/// return `None` when nothing matches — which classifies conservatively as
/// unexpected.
fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = err {
        return Some(source.status_code.as_u16());
    }

    let err_str = err.to_string();
    let err_lower = err_str.to_lowercase();

    if err_str.contains("401") || err_lower.contains("bad credentials") {
        return Some(401);
    }
    if err_str.contains("404") && err_lower.contains("not found") {
        return Some(404);
    }
    if err_str.contains("403") {
        return Some(403);
    }
    if err_str.contains("422") {
        return Some(422);
    }
    if err_str.contains("429") {
        return Some(429);
    }

    None
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_message(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates rejected credentials.
fn is_auth_message(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("bad credentials") || message_lower.contains("requires authentication")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classify_by_status_code() {
        assert_eq!(classify(Some(401), "Bad credentials"), Failure::Authentication);
        assert_eq!(classify(Some(404), "Not Found"), Failure::NotFound);
        assert_eq!(
            classify(Some(429), "too many requests"),
            Failure::RateLimit { reset: None }
        );
        assert_eq!(classify(Some(422), "Validation Failed"), Failure::Validation);
        assert_eq!(classify(Some(500), "Server Error"), Failure::Unexpected);
        assert_eq!(classify(Some(502), "Bad Gateway"), Failure::Unexpected);
    }

    #[test]
    fn forbidden_splits_on_rate_limit_markers() {
        assert_eq!(
            classify(Some(403), "API rate limit exceeded for user"),
            Failure::RateLimit { reset: None }
        );
        assert_eq!(
            classify(Some(403), "You have exceeded a secondary rate limit"),
            Failure::RateLimit { reset: None }
        );
        assert_eq!(
            classify(Some(403), "Resource not accessible by integration"),
            Failure::Permission
        );
    }

    #[test]
    fn statusless_errors_classified_by_message() {
        assert_eq!(
            classify(None, "Bad credentials"),
            Failure::Authentication
        );
        assert_eq!(
            classify(None, "abuse detection mechanism triggered"),
            Failure::RateLimit { reset: None }
        );
        assert_eq!(classify(None, "connection timed out"), Failure::Unexpected);
    }

    #[test]
    fn rate_limit_detection() {
        assert!(is_rate_limit_message("API rate limit exceeded"));
        assert!(is_rate_limit_message("secondary rate limit"));
        assert!(is_rate_limit_message("abuse detection mechanism"));
        assert!(!is_rate_limit_message("Permission denied"));
    }

    #[test]
    fn display_includes_status() {
        let err = GitHubApiError {
            failure: Failure::NotFound,
            status_code: Some(404),
            message: "Not Found".to_string(),
            source: None,
        };
        assert_eq!(format!("{}", err), "GitHub API error (HTTP 404): Not Found");

        let err = GitHubApiError::authentication("no token configured");
        assert_eq!(format!("{}", err), "GitHub API error: no token configured");
    }

    proptest! {
        /// 403 with a rate-limit marker anywhere in the message is always a
        /// rate limit, never a permission error.
        #[test]
        fn prop_403_rate_limit_marker(prefix in ".*", suffix in ".*") {
            let message = format!("{}rate limit{}", prefix, suffix);
            prop_assert_eq!(
                classify(Some(403), &message),
                Failure::RateLimit { reset: None }
            );
        }

        /// 403 without any rate-limit marker is a permission error.
        #[test]
        fn prop_403_permission(
            message in "[a-zA-Z ]{0,80}"
                .prop_filter("must not contain rate-limit markers", |s| {
                    !is_rate_limit_message(s)
                })
        ) {
            prop_assert_eq!(classify(Some(403), &message), Failure::Permission);
        }

        /// Classification is total over arbitrary statuses and messages.
        #[test]
        fn prop_classify_total(status in proptest::option::of(100u16..600), message in ".*") {
            let _ = classify(status, &message);
        }
    }
}
