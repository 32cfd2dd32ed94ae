//! The execution seam between the dispatcher and the GitHub API.
//!
//! The dispatcher talks to an implementation of [`GitHubApi`] rather than to
//! octocrab directly. This enables mock implementations for testing the
//! access-control and fan-out logic without I/O.

use std::future::Future;

use serde_json::Value;

use crate::ops::{RepoOp, UserOp};
use crate::types::RepoId;

use super::client::GitHubClient;
use super::error::GitHubApiError;
use super::{actions, branches, commits, issues, pulls, releases, repos};

/// Executes typed operations against the GitHub API.
///
/// Repo-scoped operations receive the repository the dispatcher resolved for
/// this call; the operation values themselves never carry one.
///
/// # Example (mock for testing)
///
/// ```ignore
/// #[derive(Clone)]
/// struct MockApi;
///
/// impl GitHubApi for MockApi {
///     async fn execute_repo(&self, repo: &RepoId, _op: RepoOp) -> Result<Value, GitHubApiError> {
///         Ok(serde_json::json!({"echo": repo.to_string()}))
///     }
///
///     async fn execute_user(&self, _op: UserOp) -> Result<Value, GitHubApiError> {
///         Ok(serde_json::json!({}))
///     }
/// }
/// ```
pub trait GitHubApi {
    /// Execute a repository-scoped operation against the given repository.
    fn execute_repo(
        &self,
        repo: &RepoId,
        op: RepoOp,
    ) -> impl Future<Output = Result<Value, GitHubApiError>> + Send;

    /// Execute a user-level operation.
    fn execute_user(
        &self,
        op: UserOp,
    ) -> impl Future<Output = Result<Value, GitHubApiError>> + Send;
}

impl GitHubApi for GitHubClient {
    async fn execute_repo(&self, repo: &RepoId, op: RepoOp) -> Result<Value, GitHubApiError> {
        match op {
            RepoOp::ListIssues(p) => issues::list_issues(self, repo, p).await,
            RepoOp::GetIssue(p) => issues::get_issue(self, repo, p).await,
            RepoOp::CreateIssue(p) => issues::create_issue(self, repo, p).await,
            RepoOp::UpdateIssue(p) => issues::update_issue(self, repo, p).await,
            RepoOp::CommentIssue(p) => issues::comment_issue(self, repo, p).await,
            RepoOp::ListPullRequests(p) => pulls::list_pull_requests(self, repo, p).await,
            RepoOp::GetPullRequest(p) => pulls::get_pull_request(self, repo, p).await,
            RepoOp::CreatePullRequest(p) => pulls::create_pull_request(self, repo, p).await,
            RepoOp::UpdatePullRequest(p) => pulls::update_pull_request(self, repo, p).await,
            RepoOp::MergePullRequest(p) => pulls::merge_pull_request(self, repo, p).await,
            RepoOp::ReviewPullRequest(p) => pulls::review_pull_request(self, repo, p).await,
            RepoOp::GetRepository(p) => repos::get_repository(self, repo, p).await,
            RepoOp::GetFileContent(p) => repos::get_file_content(self, repo, p).await,
            RepoOp::ListRepositoryContents(p) => {
                repos::list_repository_contents(self, repo, p).await
            }
            RepoOp::ListCommits(p) => commits::list_commits(self, repo, p).await,
            RepoOp::GetCommit(p) => commits::get_commit(self, repo, p).await,
            RepoOp::ListBranches(p) => branches::list_branches(self, repo, p).await,
            RepoOp::GetBranch(p) => branches::get_branch(self, repo, p).await,
            RepoOp::CreateBranch(p) => branches::create_branch(self, repo, p).await,
            RepoOp::CompareBranches(p) => branches::compare_branches(self, repo, p).await,
            RepoOp::ListReleases(p) => releases::list_releases(self, repo, p).await,
            RepoOp::GetRelease(p) => releases::get_release(self, repo, p).await,
            RepoOp::CreateRelease(p) => releases::create_release(self, repo, p).await,
            RepoOp::ListTags(p) => releases::list_tags(self, repo, p).await,
            RepoOp::CreateTag(p) => releases::create_tag(self, repo, p).await,
            RepoOp::ListWorkflows(p) => actions::list_workflows(self, repo, p).await,
            RepoOp::GetWorkflow(p) => actions::get_workflow(self, repo, p).await,
            RepoOp::TriggerWorkflow(p) => actions::trigger_workflow(self, repo, p).await,
            RepoOp::ListWorkflowRuns(p) => actions::list_workflow_runs(self, repo, p).await,
            RepoOp::GetWorkflowRun(p) => actions::get_workflow_run(self, repo, p).await,
            RepoOp::CancelWorkflowRun(p) => actions::cancel_workflow_run(self, repo, p).await,
            RepoOp::RerunWorkflow(p) => actions::rerun_workflow(self, repo, p).await,
        }
    }

    async fn execute_user(&self, op: UserOp) -> Result<Value, GitHubApiError> {
        match op {
            UserOp::ListRepositories(p) => repos::list_repositories(self, p).await,
            UserOp::CreateRepository(p) => repos::create_repository(self, p).await,
        }
    }
}
