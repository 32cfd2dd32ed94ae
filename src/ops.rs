//! Typed operations and their parameter payloads.
//!
//! These types describe GitHub operations as data, without executing them.
//! Operation names map onto a closed pair of enums — [`RepoOp`] for
//! repository-scoped operations and [`UserOp`] for user-level ones — so the
//! executor match is checked exhaustively at compile time instead of going
//! through runtime name lookup.
//!
//! Repository-scoped operations do NOT carry the target repository: the
//! dispatcher resolves the target (explicit parameter or allow-list fan-out)
//! and passes it to the executor alongside the operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::ErrorKind;
use crate::types::{IssueNumber, PullNumber, RunId};

fn default_limit() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

fn default_open() -> String {
    "open".to_string()
}

fn default_created() -> String {
    "created".to_string()
}

fn default_desc() -> String {
    "desc".to_string()
}

// ─── Issues ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListIssuesParams {
    #[serde(default = "default_open")]
    pub state: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub mentioned: Option<String>,
    #[serde(default = "default_created")]
    pub sort: String,
    #[serde(default = "default_desc")]
    pub direction: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetIssueParams {
    pub issue_number: IssueNumber,
    #[serde(default)]
    pub include_comments: bool,
    #[serde(default = "default_limit")]
    pub comments_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIssueParams {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub milestone: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateIssueParams {
    pub issue_number: IssueNumber,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
    #[serde(default)]
    pub milestone: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentIssueParams {
    pub issue_number: IssueNumber,
    pub body: String,
}

// ─── Pull Requests ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPullRequestsParams {
    #[serde(default = "default_open")]
    pub state: String,
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default = "default_created")]
    pub sort: String,
    #[serde(default = "default_desc")]
    pub direction: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPullRequestParams {
    pub pull_number: PullNumber,
    #[serde(default)]
    pub include_files: bool,
    #[serde(default)]
    pub include_reviews: bool,
    #[serde(default)]
    pub include_commits: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePullRequestParams {
    pub title: String,
    pub head: String,
    pub base: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub maintainer_can_modify: Option<bool>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub reviewers: Vec<String>,
    #[serde(default)]
    pub team_reviewers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePullRequestParams {
    pub pull_number: PullNumber,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub maintainer_can_modify: Option<bool>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
    #[serde(default)]
    pub add_reviewers: Vec<String>,
    #[serde(default)]
    pub remove_reviewers: Vec<String>,
}

fn default_merge_method() -> String {
    "merge".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergePullRequestParams {
    pub pull_number: PullNumber,
    #[serde(default = "default_merge_method")]
    pub merge_method: String,
    #[serde(default)]
    pub commit_title: Option<String>,
    #[serde(default)]
    pub commit_message: Option<String>,
    /// Head SHA guard: the merge fails if the pull request head has moved.
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub delete_branch: bool,
}

/// A file-anchored comment attached to a pull request review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewComment {
    pub path: String,
    pub body: String,
    #[serde(default)]
    pub position: Option<u64>,
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub side: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPullRequestParams {
    pub pull_number: PullNumber,
    /// `APPROVE`, `REQUEST_CHANGES`, or `COMMENT`.
    pub event: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub comments: Vec<ReviewComment>,
}

// ─── Repositories ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetRepositoryParams {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetFileContentParams {
    pub path: String,
    #[serde(default)]
    pub r#ref: Option<String>,
    /// Decode base64 file content into text (default true).
    #[serde(default = "default_true")]
    pub decode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRepositoryContentsParams {
    /// Directory path within the repository; empty means the root.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub r#ref: Option<String>,
    #[serde(default)]
    pub recursive: bool,
}

fn default_all() -> String {
    "all".to_string()
}

fn default_full_name() -> String {
    "full_name".to_string()
}

fn default_asc() -> String {
    "asc".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRepositoriesParams {
    /// User or organization to list; omitted means the authenticated account.
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default = "default_all")]
    pub r#type: String,
    #[serde(default = "default_full_name")]
    pub sort: String,
    #[serde(default = "default_asc")]
    pub direction: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRepositoryParams {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    /// Create under this organization instead of the authenticated account.
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub auto_init: bool,
    #[serde(default)]
    pub gitignore_template: Option<String>,
    #[serde(default)]
    pub license_template: Option<String>,
    #[serde(default)]
    pub allow_squash_merge: Option<bool>,
    #[serde(default)]
    pub allow_merge_commit: Option<bool>,
    #[serde(default)]
    pub allow_rebase_merge: Option<bool>,
    #[serde(default)]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(default)]
    pub has_issues: Option<bool>,
    #[serde(default)]
    pub has_projects: Option<bool>,
    #[serde(default)]
    pub has_wiki: Option<bool>,
}

// ─── Commits ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListCommitsParams {
    /// Branch, tag, or SHA to start listing from.
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetCommitParams {
    pub sha: String,
    #[serde(default = "default_true")]
    pub include_files: bool,
}

// ─── Branches ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListBranchesParams {
    #[serde(default)]
    pub protected: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetBranchParams {
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBranchParams {
    pub branch: String,
    /// Branch to fork from; omitted means the repository's default branch.
    #[serde(default)]
    pub from_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareBranchesParams {
    pub base: String,
    pub head: String,
    #[serde(default)]
    pub include_files: bool,
    #[serde(default)]
    pub include_commits: bool,
}

// ─── Releases & Tags ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListReleasesParams {
    #[serde(default)]
    pub include_drafts: bool,
    #[serde(default = "default_true")]
    pub include_prereleases: bool,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetReleaseParams {
    #[serde(default)]
    pub release_id: Option<u64>,
    /// Tag name, or `latest` for the latest published release. One of
    /// `release_id` and `tag_name` must be supplied.
    #[serde(default)]
    pub tag_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateReleaseParams {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub target_commitish: Option<String>,
    #[serde(default)]
    pub generate_release_notes: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListTagsParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_commit() -> String {
    "commit".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTagParams {
    pub tag: String,
    /// Providing a message creates an annotated tag object; otherwise only a
    /// lightweight tag ref is created.
    #[serde(default)]
    pub message: Option<String>,
    /// SHA to tag; omitted means the head of the default branch.
    #[serde(default)]
    pub object_sha: Option<String>,
    #[serde(default = "default_commit")]
    pub r#type: String,
    #[serde(default)]
    pub tagger_name: Option<String>,
    #[serde(default)]
    pub tagger_email: Option<String>,
}

// ─── Actions ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListWorkflowsParams {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetWorkflowParams {
    /// Numeric workflow ID or workflow file name (e.g. `ci.yml`).
    pub workflow_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerWorkflowParams {
    pub workflow_id: String,
    /// Git reference to run on; omitted means the repository's default branch.
    #[serde(default)]
    pub r#ref: Option<String>,
    #[serde(default)]
    pub inputs: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListWorkflowRunsParams {
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetWorkflowRunParams {
    pub run_id: RunId,
    #[serde(default)]
    pub include_jobs: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelWorkflowRunParams {
    pub run_id: RunId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerunWorkflowParams {
    pub run_id: RunId,
    #[serde(default)]
    pub failed_jobs_only: bool,
}

// ─── Operation enums ──────────────────────────────────────────────────────────

/// A repository-scoped operation.
///
/// The target repository is resolved by the dispatcher and passed to the
/// executor separately, so these variants never carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "parameters", rename_all = "snake_case")]
pub enum RepoOp {
    ListIssues(ListIssuesParams),
    GetIssue(GetIssueParams),
    CreateIssue(CreateIssueParams),
    UpdateIssue(UpdateIssueParams),
    CommentIssue(CommentIssueParams),
    ListPullRequests(ListPullRequestsParams),
    GetPullRequest(GetPullRequestParams),
    CreatePullRequest(CreatePullRequestParams),
    UpdatePullRequest(UpdatePullRequestParams),
    MergePullRequest(MergePullRequestParams),
    ReviewPullRequest(ReviewPullRequestParams),
    GetRepository(GetRepositoryParams),
    GetFileContent(GetFileContentParams),
    ListRepositoryContents(ListRepositoryContentsParams),
    ListCommits(ListCommitsParams),
    GetCommit(GetCommitParams),
    ListBranches(ListBranchesParams),
    GetBranch(GetBranchParams),
    CreateBranch(CreateBranchParams),
    CompareBranches(CompareBranchesParams),
    ListReleases(ListReleasesParams),
    GetRelease(GetReleaseParams),
    CreateRelease(CreateReleaseParams),
    ListTags(ListTagsParams),
    CreateTag(CreateTagParams),
    ListWorkflows(ListWorkflowsParams),
    GetWorkflow(GetWorkflowParams),
    TriggerWorkflow(TriggerWorkflowParams),
    ListWorkflowRuns(ListWorkflowRunsParams),
    GetWorkflowRun(GetWorkflowRunParams),
    CancelWorkflowRun(CancelWorkflowRunParams),
    RerunWorkflow(RerunWorkflowParams),
}

/// A user-level operation: targets the authenticated account (or an explicit
/// owner/organization parameter), never a `repository` parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "parameters", rename_all = "snake_case")]
pub enum UserOp {
    ListRepositories(ListRepositoriesParams),
    CreateRepository(CreateRepositoryParams),
}

impl RepoOp {
    /// Parses a repository-scoped operation from a request's operation name
    /// and parameter object. Unknown keys in the parameter object (including
    /// `repository`, which the dispatcher consumes) are ignored.
    pub fn from_request(
        operation: &str,
        parameters: &Map<String, Value>,
    ) -> Result<RepoOp, serde_json::Error> {
        serde_json::from_value(serde_json::json!({
            "operation": operation,
            "parameters": parameters,
        }))
    }

    /// The error kind a 404 from this operation maps to.
    ///
    /// Operations addressing a specific sub-resource map to that resource's
    /// not-found kind; list and create operations map to the repository
    /// itself, since that is what a 404 means for them.
    pub fn not_found_kind(&self) -> ErrorKind {
        match self {
            RepoOp::GetIssue(_) | RepoOp::UpdateIssue(_) | RepoOp::CommentIssue(_) => {
                ErrorKind::IssueNotFound
            }
            RepoOp::GetPullRequest(_)
            | RepoOp::UpdatePullRequest(_)
            | RepoOp::MergePullRequest(_)
            | RepoOp::ReviewPullRequest(_) => ErrorKind::PullRequestNotFound,
            RepoOp::GetFileContent(_) | RepoOp::ListRepositoryContents(_) => ErrorKind::FileNotFound,
            RepoOp::GetCommit(_) => ErrorKind::CommitNotFound,
            RepoOp::GetBranch(_) | RepoOp::CreateBranch(_) | RepoOp::CompareBranches(_) => {
                ErrorKind::BranchNotFound
            }
            RepoOp::GetRelease(_) => ErrorKind::ReleaseNotFound,
            RepoOp::GetWorkflow(_) | RepoOp::TriggerWorkflow(_) => ErrorKind::WorkflowNotFound,
            RepoOp::GetWorkflowRun(_)
            | RepoOp::CancelWorkflowRun(_)
            | RepoOp::RerunWorkflow(_) => ErrorKind::WorkflowRunNotFound,
            RepoOp::ListIssues(_)
            | RepoOp::CreateIssue(_)
            | RepoOp::ListPullRequests(_)
            | RepoOp::CreatePullRequest(_)
            | RepoOp::GetRepository(_)
            | RepoOp::ListCommits(_)
            | RepoOp::ListBranches(_)
            | RepoOp::ListReleases(_)
            | RepoOp::CreateRelease(_)
            | RepoOp::ListTags(_)
            | RepoOp::CreateTag(_)
            | RepoOp::ListWorkflows(_)
            | RepoOp::ListWorkflowRuns(_) => ErrorKind::RepositoryNotFound,
        }
    }
}

impl UserOp {
    /// Parses a user-level operation from a request's operation name and
    /// parameter object.
    pub fn from_request(
        operation: &str,
        parameters: &Map<String, Value>,
    ) -> Result<UserOp, serde_json::Error> {
        serde_json::from_value(serde_json::json!({
            "operation": operation,
            "parameters": parameters,
        }))
    }
}
