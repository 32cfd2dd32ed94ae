//! The unified GitHub tool: dispatch, access control, and fan-out.
//!
//! [`GitHubTool`] is the single entry point the agent framework invokes. A
//! dispatch call goes through these stages, in order:
//!
//! 1. operation lookup in the static registry (unknown name → validation error)
//! 2. required-parameter presence check, naming every missing field
//! 3. repository resolution for repo-scoped operations: normalize an explicit
//!    `repository` parameter and check it against the allow-list, or fan out
//!    across every allowed repository when the parameter is omitted
//! 4. execution through the [`GitHubApi`] seam
//! 5. envelope construction — every failure becomes an error envelope; no
//!    error ever propagates out of `execute`
//!
//! Fan-out calls run concurrently but results are assembled in allow-list
//! order (sorted by canonical name), so identical inputs produce identical
//! output ordering. Per-repository failures become per-item errors; an
//! authentication failure aborts the whole fan-out, since it would recur
//! identically for every repository. Dropping the `execute` future aborts
//! in-flight calls without producing a partial envelope.

use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tokio::task::JoinSet;

use crate::config::GitHubConfig;
use crate::envelope::{ErrorKind, ToolError, ToolResult};
use crate::github::{Failure, GitHubApi, GitHubApiError, GitHubClient};
use crate::ops::{RepoOp, UserOp};
use crate::policy::{PolicyError, RepoPolicy};
use crate::registry::{self, Scope};
use crate::types::RepoId;

/// A single dispatch request: an operation name and its parameter payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    pub operation: String,
    #[serde(default)]
    pub parameters: Value,
}

/// Errors that can occur while constructing the tool.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The configured repository allow-list contains an unparseable entry.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Authentication verification against the API failed.
    #[error(transparent)]
    Api(#[from] GitHubApiError),
}

/// The unified GitHub tool.
///
/// Generic over the API seam so the dispatch logic is testable against a mock;
/// production code uses the default [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubTool<A = GitHubClient> {
    api: A,
    policy: RepoPolicy,
}

impl GitHubTool<GitHubClient> {
    /// Builds the tool from configuration: parses the allow-list, resolves
    /// authentication, and verifies credentials when a token was found.
    pub async fn connect(config: &GitHubConfig) -> Result<Self, SetupError> {
        let policy = RepoPolicy::from_entries(&config.repositories)?;
        let client = GitHubClient::connect(config).await?;
        Ok(GitHubTool {
            api: client,
            policy,
        })
    }
}

impl<A> GitHubTool<A>
where
    A: GitHubApi + Clone + Send + Sync + 'static,
{
    /// Assembles a tool from parts. Mostly useful for tests and frameworks
    /// that construct the client themselves.
    pub fn new(api: A, policy: RepoPolicy) -> Self {
        GitHubTool { api, policy }
    }

    /// Tool name, as registered with the agent framework.
    pub fn name(&self) -> &'static str {
        "github"
    }

    /// Tool description surfaced to the agent.
    pub fn description(&self) -> String {
        let catalog = registry::names().collect::<Vec<_>>().join(", ");
        format!(
            "Interact with GitHub repositories and resources. When a repository \
             allow-list is configured, repository-scoped operations can query across \
             ALL configured repositories automatically; otherwise supply a 'repository' \
             parameter to target a specific one. Repository references are accepted as \
             'owner/repo', HTTPS URLs, or SSH URLs. User-level operations \
             (list_repositories, create_repository) take no repository. \
             Supported operations: {}.",
            catalog
        )
    }

    /// JSON schema for tool input.
    pub fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "description": "The GitHub operation to perform",
                    "enum": registry::names().collect::<Vec<_>>(),
                },
                "parameters": {
                    "type": "object",
                    "description": "Parameters for the specific operation (schema varies by operation)",
                    "additionalProperties": true,
                },
            },
            "required": ["operation", "parameters"],
            "additionalProperties": false,
        })
    }

    /// Executes one request and returns the result envelope.
    ///
    /// Never returns an error: every failure — validation, access control, or
    /// API — is converted into an error envelope.
    pub async fn execute(&self, request: ToolRequest) -> ToolResult {
        let Some(descriptor) = registry::resolve(&request.operation) else {
            let available = registry::names().collect::<Vec<_>>().join(", ");
            return ToolResult::fail(
                ErrorKind::Validation,
                format!(
                    "Unknown operation: {}. Available operations: {}",
                    request.operation, available
                ),
            );
        };

        let parameters = match &request.parameters {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => {
                return ToolResult::fail(ErrorKind::Validation, "parameters must be an object");
            }
        };

        let missing: Vec<&str> = descriptor
            .required
            .iter()
            .copied()
            .filter(|key| parameters.get(*key).is_none_or(Value::is_null))
            .collect();
        if !missing.is_empty() {
            return ToolResult::fail(
                ErrorKind::Validation,
                format!("Missing required parameter(s): {}", missing.join(", ")),
            );
        }

        tracing::debug!(operation = descriptor.name, "dispatching GitHub operation");

        match descriptor.scope {
            Scope::User => {
                let op = match UserOp::from_request(descriptor.name, &parameters) {
                    Ok(op) => op,
                    Err(e) => return invalid_parameters(descriptor.name, &e),
                };
                match self.api.execute_user(op).await {
                    Ok(output) => ToolResult::ok(output),
                    Err(e) => {
                        ToolResult::from_error(api_error(e, ErrorKind::RepositoryNotFound, None))
                    }
                }
            }
            Scope::Repo => {
                let op = match RepoOp::from_request(descriptor.name, &parameters) {
                    Ok(op) => op,
                    Err(e) => return invalid_parameters(descriptor.name, &e),
                };
                match parameters.get("repository") {
                    Some(Value::String(raw)) => self.dispatch_single(raw, op).await,
                    // An explicit null reads as "not supplied".
                    None | Some(Value::Null) => self.fan_out(op).await,
                    Some(_) => {
                        ToolResult::fail(ErrorKind::Validation, "repository must be a string")
                    }
                }
            }
        }
    }

    /// Executes a repo-scoped operation against one explicitly named
    /// repository, after normalization and the allow-list check.
    async fn dispatch_single(&self, raw: &str, op: RepoOp) -> ToolResult {
        let repo = match RepoId::parse(raw) {
            Ok(repo) => repo,
            Err(e) => return ToolResult::fail(ErrorKind::Validation, e.to_string()),
        };

        if !self.policy.is_allowed(&repo) {
            let allowed: Vec<String> = self
                .policy
                .allowed()
                .iter()
                .map(|allowed| allowed.to_string())
                .collect();
            return ToolResult::from_error(
                ToolError::new(
                    ErrorKind::PermissionDenied,
                    format!("Access to repository '{}' is not in the allowed list", repo),
                )
                .with_detail("repository", json!(repo.to_string()))
                .with_detail("allowed_repositories", json!(allowed)),
            );
        }

        let not_found = op.not_found_kind();
        match self.api.execute_repo(&repo, op).await {
            Ok(output) => ToolResult::ok(tag_repository(output, &repo)),
            Err(e) => ToolResult::from_error(api_error(e, not_found, Some(&repo))),
        }
    }

    /// Executes a repo-scoped operation across every allowed repository.
    ///
    /// Calls are issued concurrently; the aggregated output is ordered by the
    /// allow-list (sorted by canonical name), never by completion order.
    async fn fan_out(&self, op: RepoOp) -> ToolResult {
        if self.policy.is_unrestricted() {
            return ToolResult::fail(
                ErrorKind::Validation,
                "repository parameter is required: no repository allow-list is configured \
                 to query across",
            );
        }

        let repos: Vec<RepoId> = self.policy.allowed().to_vec();
        let not_found = op.not_found_kind();

        let mut tasks = JoinSet::new();
        for (index, repo) in repos.iter().cloned().enumerate() {
            let api = self.api.clone();
            let op = op.clone();
            tasks.spawn(async move {
                let result = api.execute_repo(&repo, op).await;
                (index, repo, result)
            });
        }

        let mut slots: Vec<Option<Value>> = vec![None; repos.len()];
        while let Some(joined) = tasks.join_next().await {
            // A panicked task leaves its slot empty; it is reported as a
            // per-item error below rather than poisoning the whole call.
            let Ok((index, repo, result)) = joined else {
                continue;
            };
            match result {
                Ok(output) => {
                    slots[index] = Some(json!({
                        "repository": repo.to_string(),
                        "output": output,
                    }));
                }
                Err(e) if e.failure == Failure::Authentication => {
                    // An authentication failure recurs identically for every
                    // repository; abort the whole fan-out. Dropping the
                    // JoinSet aborts the remaining in-flight calls.
                    return ToolResult::from_error(api_error(e, not_found, None));
                }
                Err(e) => {
                    let error = api_error(e, not_found, Some(&repo));
                    slots[index] = Some(json!({
                        "repository": repo.to_string(),
                        "error": error,
                    }));
                }
            }
        }

        let results: Vec<Value> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    json!({
                        "repository": repos[index].to_string(),
                        "error": ToolError::new(
                            ErrorKind::Unexpected,
                            "operation task failed unexpectedly",
                        ),
                    })
                })
            })
            .collect();

        ToolResult::ok(json!({
            "repositories": repos.len(),
            "results": results,
        }))
    }
}

/// Envelope for a typed-parameter parse failure.
fn invalid_parameters(operation: &str, error: &serde_json::Error) -> ToolResult {
    ToolResult::fail(
        ErrorKind::Validation,
        format!("Invalid parameters for {}: {}", operation, error),
    )
}

/// Inserts the canonical repository identifier into a single-target output,
/// unless the handler already claimed the key.
fn tag_repository(output: Value, repo: &RepoId) -> Value {
    match output {
        Value::Object(mut map) => {
            if !map.contains_key("repository") {
                map.insert("repository".to_string(), json!(repo.to_string()));
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Maps a classified API error onto the wire taxonomy, using the operation's
/// resource context for not-found failures.
fn api_error(err: GitHubApiError, not_found: ErrorKind, repo: Option<&RepoId>) -> ToolError {
    let kind = match &err.failure {
        Failure::Authentication => ErrorKind::Authentication,
        Failure::NotFound => not_found,
        Failure::RateLimit { .. } => ErrorKind::RateLimitExceeded,
        Failure::Permission => ErrorKind::PermissionDenied,
        Failure::Validation => ErrorKind::Validation,
        Failure::Unexpected => ErrorKind::Unexpected,
    };

    let message = match (kind, repo) {
        (ErrorKind::RepositoryNotFound, Some(repo)) => {
            format!("Repository not found or not accessible: {}", repo)
        }
        (ErrorKind::RateLimitExceeded, _) => {
            let reset = match &err.failure {
                Failure::RateLimit { reset: Some(t) } => t.to_rfc3339(),
                _ => "unknown".to_string(),
            };
            format!("GitHub API rate limit exceeded. Resets at: {}", reset)
        }
        _ => err.message.clone(),
    };

    let mut error = ToolError::new(kind, message).with_detail(
        "status",
        err.status_code.map(|code| json!(code)).unwrap_or(Value::Null),
    );
    if let Failure::RateLimit { reset } = &err.failure {
        error = error.with_detail(
            "reset",
            json!(
                reset
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string())
            ),
        );
    }
    if let Some(repo) = repo {
        error = error.with_detail("repository", json!(repo.to_string()));
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock API seam: records every call and fails for configured
    /// repositories, without any I/O.
    #[derive(Clone, Default)]
    struct MockApi {
        calls: Arc<Mutex<Vec<String>>>,
        failures: Arc<HashMap<String, Failure>>,
    }

    impl MockApi {
        fn new() -> Self {
            MockApi::default()
        }

        fn failing(failures: &[(&str, Failure)]) -> Self {
            MockApi {
                calls: Arc::new(Mutex::new(Vec::new())),
                failures: Arc::new(
                    failures
                        .iter()
                        .map(|(repo, failure)| (repo.to_string(), failure.clone()))
                        .collect(),
                ),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GitHubApi for MockApi {
        async fn execute_repo(
            &self,
            repo: &RepoId,
            _op: RepoOp,
        ) -> Result<Value, GitHubApiError> {
            self.calls.lock().unwrap().push(repo.to_string());
            if let Some(failure) = self.failures.get(&repo.to_string()) {
                return Err(GitHubApiError {
                    failure: failure.clone(),
                    status_code: None,
                    message: "mock failure".to_string(),
                    source: None,
                });
            }
            Ok(json!({ "echo": repo.to_string() }))
        }

        async fn execute_user(&self, _op: UserOp) -> Result<Value, GitHubApiError> {
            self.calls.lock().unwrap().push("<user>".to_string());
            Ok(json!({ "ok": true }))
        }
    }

    fn tool(api: MockApi, allow: &[&str]) -> GitHubTool<MockApi> {
        GitHubTool::new(api, RepoPolicy::from_entries(allow).unwrap())
    }

    fn request(operation: &str, parameters: Value) -> ToolRequest {
        ToolRequest {
            operation: operation.to_string(),
            parameters,
        }
    }

    fn error_code(result: &ToolResult) -> ErrorKind {
        result.error.as_ref().expect("expected error envelope").code
    }

    #[tokio::test]
    async fn unknown_operation_is_validation_error_without_calls() {
        let api = MockApi::new();
        let tool = tool(api.clone(), &[]);
        let result = tool.execute(request("explode", json!({}))).await;

        assert!(!result.success);
        assert_eq!(error_code(&result), ErrorKind::Validation);
        assert!(
            result.error.as_ref().unwrap().message.contains("Unknown operation"),
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_required_parameters_are_named() {
        let api = MockApi::new();
        let tool = tool(api.clone(), &[]);
        let result = tool
            .execute(request(
                "comment_issue",
                json!({"repository": "octocat/Hello-World"}),
            ))
            .await;

        assert_eq!(error_code(&result), ErrorKind::Validation);
        let message = &result.error.as_ref().unwrap().message;
        assert!(message.contains("issue_number"), "{}", message);
        assert!(message.contains("body"), "{}", message);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn non_object_parameters_rejected() {
        let tool = tool(MockApi::new(), &[]);
        let result = tool.execute(request("list_issues", json!("nope"))).await;
        assert_eq!(error_code(&result), ErrorKind::Validation);
        assert!(
            result.error.as_ref().unwrap().message.contains("parameters must be an object"),
        );
    }

    #[tokio::test]
    async fn mistyped_parameter_is_validation_error() {
        let api = MockApi::new();
        let tool = tool(api.clone(), &[]);
        let result = tool
            .execute(request(
                "get_issue",
                json!({"repository": "a/b", "issue_number": "seven"}),
            ))
            .await;
        assert_eq!(error_code(&result), ErrorKind::Validation);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn explicit_repository_executes_once_and_tags_output() {
        let api = MockApi::new();
        let tool = tool(api.clone(), &[]);
        let result = tool
            .execute(request("list_issues", json!({"repository": "octocat/Hello-World"})))
            .await;

        assert!(result.success);
        let output = result.output.unwrap();
        assert_eq!(output["repository"], "octocat/Hello-World");
        assert_eq!(output["echo"], "octocat/Hello-World");
        assert_eq!(api.calls(), vec!["octocat/Hello-World"]);
    }

    #[tokio::test]
    async fn ssh_form_matches_allow_list_case_insensitively() {
        // Allow-list "octocat/Hello-World"; the SSH lowercase form must
        // normalize to the same canonical identifier and be admitted.
        let api = MockApi::new();
        let tool = tool(api.clone(), &["octocat/Hello-World"]);
        let result = tool
            .execute(request(
                "list_issues",
                json!({"repository": "git@github.com:octocat/hello-world.git"}),
            ))
            .await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(api.calls(), vec!["octocat/hello-world"]);
    }

    #[tokio::test]
    async fn disallowed_repository_is_permission_denied_without_calls() {
        let api = MockApi::new();
        let tool = tool(api.clone(), &["octocat/Hello-World"]);
        let result = tool
            .execute(request("get_repository", json!({"repository": "other/repo"})))
            .await;

        assert_eq!(error_code(&result), ErrorKind::PermissionDenied);
        let details = &result.error.as_ref().unwrap().details;
        assert_eq!(details["repository"], "other/repo");
        assert_eq!(details["allowed_repositories"], json!(["octocat/Hello-World"]));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_repository_format_is_validation_error() {
        let api = MockApi::new();
        let tool = tool(api.clone(), &[]);
        let result = tool
            .execute(request("list_issues", json!({"repository": "not-a-repo"})))
            .await;
        assert_eq!(error_code(&result), ErrorKind::Validation);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn omitted_repository_with_unbounded_policy_is_validation_error() {
        let api = MockApi::new();
        let tool = tool(api.clone(), &[]);
        let result = tool.execute(request("list_issues", json!({}))).await;

        assert_eq!(error_code(&result), ErrorKind::Validation);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn fan_out_calls_each_repository_in_canonical_order() {
        let api = MockApi::new();
        let tool = tool(
            api.clone(),
            &["zebra/one", "apple/two", "octocat/Hello-World"],
        );
        let result = tool.execute(request("list_issues", json!({}))).await;

        assert!(result.success);
        let output = result.output.unwrap();
        assert_eq!(output["repositories"], 3);
        let order: Vec<&str> = output["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["repository"].as_str().unwrap())
            .collect();
        assert_eq!(order, vec!["apple/two", "octocat/Hello-World", "zebra/one"]);

        let mut calls = api.calls();
        calls.sort();
        assert_eq!(calls, vec!["apple/two", "octocat/Hello-World", "zebra/one"]);
    }

    #[tokio::test]
    async fn fan_out_output_is_deterministic_across_invocations() {
        let allow = ["zebra/one", "apple/two", "middle/three"];
        let first = tool(MockApi::new(), &allow)
            .execute(request("list_issues", json!({})))
            .await;
        let second = tool(MockApi::new(), &allow)
            .execute(request("list_issues", json!({})))
            .await;
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn fan_out_tolerates_per_repository_failures() {
        let api = MockApi::failing(&[("apple/two", Failure::NotFound)]);
        let tool = tool(api.clone(), &["zebra/one", "apple/two"]);
        let result = tool.execute(request("list_issues", json!({}))).await;

        assert!(result.success);
        let results = result.output.unwrap()["results"].clone();
        // apple/two sorts first and carries a per-item error; zebra/one
        // succeeded.
        assert_eq!(results[0]["repository"], "apple/two");
        assert_eq!(results[0]["error"]["code"], "REPOSITORY_NOT_FOUND");
        assert_eq!(results[1]["repository"], "zebra/one");
        assert_eq!(results[1]["output"]["echo"], "zebra/one");
    }

    #[tokio::test]
    async fn fan_out_aborts_on_authentication_failure() {
        let api = MockApi::failing(&[("apple/two", Failure::Authentication)]);
        let tool = tool(api.clone(), &["zebra/one", "apple/two"]);
        let result = tool.execute(request("list_issues", json!({}))).await;

        assert!(!result.success);
        assert_eq!(error_code(&result), ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn user_level_operation_skips_repository_resolution() {
        // Empty allow-list + user-level op: must proceed with no repository
        // handling at all.
        let api = MockApi::new();
        let tool = tool(api.clone(), &[]);
        let result = tool
            .execute(request("create_repository", json!({"name": "foo"})))
            .await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(api.calls(), vec!["<user>"]);
    }

    #[tokio::test]
    async fn not_found_maps_to_operation_resource() {
        let api = MockApi::failing(&[("octocat/Hello-World", Failure::NotFound)]);
        let tool = tool(api.clone(), &[]);

        let result = tool
            .execute(request(
                "get_issue",
                json!({"repository": "octocat/Hello-World", "issue_number": 1}),
            ))
            .await;
        assert_eq!(error_code(&result), ErrorKind::IssueNotFound);

        let result = tool
            .execute(request(
                "get_repository",
                json!({"repository": "octocat/Hello-World"}),
            ))
            .await;
        assert_eq!(error_code(&result), ErrorKind::RepositoryNotFound);
    }

    #[tokio::test]
    async fn rate_limit_carries_reset_detail() {
        let api = MockApi::failing(&[("octocat/Hello-World", Failure::RateLimit { reset: None })]);
        let tool = tool(api.clone(), &[]);
        let result = tool
            .execute(request(
                "list_issues",
                json!({"repository": "octocat/Hello-World"}),
            ))
            .await;

        assert_eq!(error_code(&result), ErrorKind::RateLimitExceeded);
        let error = result.error.unwrap();
        assert_eq!(error.details["reset"], "unknown");
        assert!(error.message.contains("rate limit"));
    }

    #[tokio::test]
    async fn null_parameters_treated_as_empty() {
        let tool = tool(MockApi::new(), &[]);
        let result = tool
            .execute(ToolRequest {
                operation: "list_repositories".to_string(),
                parameters: Value::Null,
            })
            .await;
        assert!(result.success, "{:?}", result.error);
    }

    #[test]
    fn schema_enumerates_all_operations() {
        let tool = tool(MockApi::new(), &[]);
        let schema = tool.input_schema();
        assert_eq!(
            schema["properties"]["operation"]["enum"].as_array().unwrap().len(),
            34
        );
        assert_eq!(schema["required"], json!(["operation", "parameters"]));
        assert_eq!(tool.name(), "github");
        assert!(tool.description().contains("list_issues"));
    }
}
