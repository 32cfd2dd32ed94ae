//! The uniform result envelope returned by every operation.
//!
//! Every dispatch produces a [`ToolResult`]: either `success = true` with an
//! `output` payload, or `success = false` with an `error` carrying a code from
//! the fixed [`ErrorKind`] taxonomy. No other shape ever crosses the tool
//! boundary, and no error is ever raised across it.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// The fixed taxonomy of error codes surfaced in error envelopes.
///
/// Serializes to the wire code (e.g. `VALIDATION_ERROR`) consumed by the
/// agent framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "AUTHENTICATION_ERROR")]
    Authentication,
    #[serde(rename = "REPOSITORY_NOT_FOUND")]
    RepositoryNotFound,
    #[serde(rename = "ISSUE_NOT_FOUND")]
    IssueNotFound,
    #[serde(rename = "PULL_REQUEST_NOT_FOUND")]
    PullRequestNotFound,
    #[serde(rename = "BRANCH_NOT_FOUND")]
    BranchNotFound,
    #[serde(rename = "COMMIT_NOT_FOUND")]
    CommitNotFound,
    #[serde(rename = "FILE_NOT_FOUND")]
    FileNotFound,
    #[serde(rename = "RELEASE_NOT_FOUND")]
    ReleaseNotFound,
    #[serde(rename = "WORKFLOW_NOT_FOUND")]
    WorkflowNotFound,
    #[serde(rename = "WORKFLOW_RUN_NOT_FOUND")]
    WorkflowRunNotFound,
    #[serde(rename = "RATE_LIMIT_EXCEEDED")]
    RateLimitExceeded,
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied,
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    #[serde(rename = "UNEXPECTED_ERROR")]
    Unexpected,
}

impl ErrorKind {
    /// Returns the wire code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Authentication => "AUTHENTICATION_ERROR",
            ErrorKind::RepositoryNotFound => "REPOSITORY_NOT_FOUND",
            ErrorKind::IssueNotFound => "ISSUE_NOT_FOUND",
            ErrorKind::PullRequestNotFound => "PULL_REQUEST_NOT_FOUND",
            ErrorKind::BranchNotFound => "BRANCH_NOT_FOUND",
            ErrorKind::CommitNotFound => "COMMIT_NOT_FOUND",
            ErrorKind::FileNotFound => "FILE_NOT_FOUND",
            ErrorKind::ReleaseNotFound => "RELEASE_NOT_FOUND",
            ErrorKind::WorkflowNotFound => "WORKFLOW_NOT_FOUND",
            ErrorKind::WorkflowRunNotFound => "WORKFLOW_RUN_NOT_FOUND",
            ErrorKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Unexpected => "UNEXPECTED_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The error half of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolError {
    pub code: ErrorKind,
    pub message: String,
    pub details: Map<String, Value>,
}

impl ToolError {
    pub fn new(code: ErrorKind, message: impl Into<String>) -> Self {
        ToolError {
            code,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// Adds a detail entry, discarding `Value::Null` to keep envelopes tidy.
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        if !value.is_null() {
            self.details.insert(key.to_string(), value);
        }
        self
    }
}

/// The uniform success/error wrapper returned by every operation.
///
/// Exactly one of `output` and `error` is present, matching `success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResult {
    /// Builds a success envelope.
    pub fn ok(output: Value) -> Self {
        ToolResult {
            success: true,
            output: Some(output),
            error: None,
        }
    }

    /// Builds an error envelope with no details.
    pub fn fail(code: ErrorKind, message: impl Into<String>) -> Self {
        Self::from_error(ToolError::new(code, message))
    }

    /// Builds an error envelope from a fully-formed [`ToolError`].
    pub fn from_error(error: ToolError) -> Self {
        ToolResult {
            success: false,
            output: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_shape() {
        let result = ToolResult::ok(json!({"count": 1}));
        assert!(result.success);
        assert!(result.output.is_some());
        assert!(result.error.is_none());

        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized["success"], json!(true));
        assert_eq!(serialized["output"]["count"], json!(1));
        assert!(serialized.get("error").is_none());
    }

    #[test]
    fn error_envelope_shape() {
        let result = ToolResult::fail(ErrorKind::Validation, "bad input");
        assert!(!result.success);
        assert!(result.output.is_none());

        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized["error"]["code"], json!("VALIDATION_ERROR"));
        assert_eq!(serialized["error"]["message"], json!("bad input"));
        assert!(serialized.get("output").is_none());
    }

    #[test]
    fn error_details_carried_through() {
        let error = ToolError::new(ErrorKind::RateLimitExceeded, "slow down")
            .with_detail("reset", json!("2024-01-01T00:00:00Z"))
            .with_detail("ignored", Value::Null);
        let serialized = serde_json::to_value(ToolResult::from_error(error)).unwrap();
        assert_eq!(
            serialized["error"]["details"]["reset"],
            json!("2024-01-01T00:00:00Z")
        );
        assert!(serialized["error"]["details"].get("ignored").is_none());
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorKind::Authentication.code(), "AUTHENTICATION_ERROR");
        assert_eq!(ErrorKind::RepositoryNotFound.code(), "REPOSITORY_NOT_FOUND");
        assert_eq!(ErrorKind::IssueNotFound.code(), "ISSUE_NOT_FOUND");
        assert_eq!(ErrorKind::RateLimitExceeded.code(), "RATE_LIMIT_EXCEEDED");
        assert_eq!(ErrorKind::PermissionDenied.code(), "PERMISSION_DENIED");
        assert_eq!(ErrorKind::Validation.code(), "VALIDATION_ERROR");
        assert_eq!(ErrorKind::Unexpected.code(), "UNEXPECTED_ERROR");
    }

    #[test]
    fn serialized_code_matches_code_fn() {
        for kind in [
            ErrorKind::Authentication,
            ErrorKind::RepositoryNotFound,
            ErrorKind::IssueNotFound,
            ErrorKind::PullRequestNotFound,
            ErrorKind::BranchNotFound,
            ErrorKind::CommitNotFound,
            ErrorKind::FileNotFound,
            ErrorKind::ReleaseNotFound,
            ErrorKind::WorkflowNotFound,
            ErrorKind::WorkflowRunNotFound,
            ErrorKind::RateLimitExceeded,
            ErrorKind::PermissionDenied,
            ErrorKind::Validation,
            ErrorKind::Unexpected,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.code()));
        }
    }

    #[test]
    fn envelope_construction_is_idempotent() {
        let a = serde_json::to_string(&ToolResult::ok(json!({"issues": [], "count": 0}))).unwrap();
        let b = serde_json::to_string(&ToolResult::ok(json!({"issues": [], "count": 0}))).unwrap();
        assert_eq!(a, b);

        let e1 = serde_json::to_string(&ToolResult::fail(ErrorKind::Unexpected, "boom")).unwrap();
        let e2 = serde_json::to_string(&ToolResult::fail(ErrorKind::Unexpected, "boom")).unwrap();
        assert_eq!(e1, e2);
    }
}
