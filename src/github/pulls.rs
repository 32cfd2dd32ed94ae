//! Pull request operations.

use serde_json::{Map, Value, json};

use crate::ops::{
    CreatePullRequestParams, GetPullRequestParams, ListPullRequestsParams, MergePullRequestParams,
    ReviewPullRequestParams, UpdatePullRequestParams,
};
use crate::types::{PullNumber, RepoId};

use super::client::GitHubClient;
use super::error::GitHubApiError;
use super::{per_page, pluck, query_string};

pub(super) async fn list_pull_requests(
    client: &GitHubClient,
    repo: &RepoId,
    p: ListPullRequestsParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/pulls{}",
        repo.owner,
        repo.name,
        query_string(&[
            ("state", Some(p.state.clone())),
            ("head", p.head.clone()),
            ("base", p.base.clone()),
            ("sort", Some(p.sort.clone())),
            ("direction", Some(p.direction.clone())),
            ("per_page", Some(per_page(p.limit).to_string())),
        ]),
    );
    let items = client.get_json(&route).await?;

    let pulls: Vec<Value> = items
        .as_array()
        .into_iter()
        .flatten()
        .take(p.limit as usize)
        .map(pull_summary)
        .collect();

    Ok(json!({
        "state": p.state,
        "count": pulls.len(),
        "pull_requests": pulls,
    }))
}

pub(super) async fn get_pull_request(
    client: &GitHubClient,
    repo: &RepoId,
    p: GetPullRequestParams,
) -> Result<Value, GitHubApiError> {
    let base = format!("/repos/{}/{}/pulls/{}", repo.owner, repo.name, p.pull_number.0);
    let pull = client.get_json(&base).await?;

    let mut output = Map::new();
    output.insert("pull_request".to_string(), pull_detail(&pull));

    if p.include_files {
        let files = client.get_json(&format!("{}/files?per_page=100", base)).await?;
        let files: Vec<Value> = files
            .as_array()
            .into_iter()
            .flatten()
            .map(|file| {
                json!({
                    "filename": file["filename"],
                    "status": file["status"],
                    "additions": file["additions"],
                    "deletions": file["deletions"],
                    "changes": file["changes"],
                })
            })
            .collect();
        output.insert("files".to_string(), Value::Array(files));
    }

    if p.include_reviews {
        let reviews = client.get_json(&format!("{}/reviews?per_page=100", base)).await?;
        let reviews: Vec<Value> = reviews
            .as_array()
            .into_iter()
            .flatten()
            .map(|review| {
                json!({
                    "id": review["id"],
                    "author": review["user"]["login"],
                    "state": review["state"],
                    "body": review["body"],
                    "submitted_at": review["submitted_at"],
                })
            })
            .collect();
        output.insert("reviews".to_string(), Value::Array(reviews));
    }

    if p.include_commits {
        let commits = client.get_json(&format!("{}/commits?per_page=100", base)).await?;
        let commits: Vec<Value> = commits
            .as_array()
            .into_iter()
            .flatten()
            .map(|commit| {
                json!({
                    "sha": commit["sha"],
                    "message": commit["commit"]["message"],
                    "author": commit["commit"]["author"]["name"],
                })
            })
            .collect();
        output.insert("commits".to_string(), Value::Array(commits));
    }

    Ok(Value::Object(output))
}

pub(super) async fn create_pull_request(
    client: &GitHubClient,
    repo: &RepoId,
    p: CreatePullRequestParams,
) -> Result<Value, GitHubApiError> {
    let route = format!("/repos/{}/{}/pulls", repo.owner, repo.name);

    let mut body = Map::new();
    body.insert("title".to_string(), json!(p.title));
    body.insert("head".to_string(), json!(p.head));
    body.insert("base".to_string(), json!(p.base));
    body.insert("draft".to_string(), json!(p.draft));
    if let Some(text) = p.body {
        body.insert("body".to_string(), json!(text));
    }
    if let Some(flag) = p.maintainer_can_modify {
        body.insert("maintainer_can_modify".to_string(), json!(flag));
    }

    let pull = client.post_json(&route, &Value::Object(body)).await?;
    let number = pull["number"].as_u64().map(PullNumber).unwrap_or(PullNumber(0));

    // Decorations go through the issues/review-request endpoints after the PR
    // exists. The PR itself is already created, so failures here are logged
    // and the call still succeeds.
    if !p.labels.is_empty() || !p.assignees.is_empty() {
        apply_issue_decorations(client, repo, number, &p.labels, &p.assignees).await;
    }
    if !p.reviewers.is_empty() || !p.team_reviewers.is_empty() {
        let route = format!(
            "/repos/{}/{}/pulls/{}/requested_reviewers",
            repo.owner, repo.name, number.0
        );
        let mut request = Map::new();
        if !p.reviewers.is_empty() {
            request.insert("reviewers".to_string(), json!(p.reviewers));
        }
        if !p.team_reviewers.is_empty() {
            request.insert("team_reviewers".to_string(), json!(p.team_reviewers));
        }
        if let Err(e) = client.post_json(&route, &Value::Object(request)).await {
            tracing::warn!(pull = %number, error = %e, "failed to request reviewers");
        }
    }

    Ok(json!({
        "pull_request": {
            "number": pull["number"],
            "title": pull["title"],
            "state": pull["state"],
            "draft": pull["draft"],
            "url": pull["html_url"],
            "created_at": pull["created_at"],
        },
        "message": format!("Created pull request #{}", pull["number"]),
    }))
}

pub(super) async fn update_pull_request(
    client: &GitHubClient,
    repo: &RepoId,
    p: UpdatePullRequestParams,
) -> Result<Value, GitHubApiError> {
    let base = format!("/repos/{}/{}/pulls/{}", repo.owner, repo.name, p.pull_number.0);

    let mut body = Map::new();
    if let Some(title) = p.title {
        body.insert("title".to_string(), json!(title));
    }
    if let Some(text) = p.body {
        body.insert("body".to_string(), json!(text));
    }
    if let Some(state) = p.state {
        body.insert("state".to_string(), json!(state));
    }
    if let Some(new_base) = p.base {
        body.insert("base".to_string(), json!(new_base));
    }
    if let Some(flag) = p.maintainer_can_modify {
        body.insert("maintainer_can_modify".to_string(), json!(flag));
    }

    let has_issue_changes = p.labels.is_some() || p.assignees.is_some();
    let has_reviewer_changes = !p.add_reviewers.is_empty() || !p.remove_reviewers.is_empty();
    if body.is_empty() && !has_issue_changes && !has_reviewer_changes {
        return Err(GitHubApiError::validation(
            "update_pull_request requires at least one field to change",
        ));
    }

    let pull = if body.is_empty() {
        client.get_json(&base).await?
    } else {
        client.patch_json(&base, &Value::Object(body)).await?
    };

    // Labels and assignees live on the issue facet of the PR.
    if has_issue_changes {
        let route = format!(
            "/repos/{}/{}/issues/{}",
            repo.owner, repo.name, p.pull_number.0
        );
        let mut request = Map::new();
        if let Some(labels) = p.labels {
            request.insert("labels".to_string(), json!(labels));
        }
        if let Some(assignees) = p.assignees {
            request.insert("assignees".to_string(), json!(assignees));
        }
        client.patch_json(&route, &Value::Object(request)).await?;
    }

    if !p.add_reviewers.is_empty() {
        let route = format!("{}/requested_reviewers", base);
        client
            .post_json(&route, &json!({ "reviewers": p.add_reviewers }))
            .await?;
    }
    if !p.remove_reviewers.is_empty() {
        let route = format!("{}/requested_reviewers", base);
        client
            .delete_empty(&route, Some(&json!({ "reviewers": p.remove_reviewers })))
            .await?;
    }

    Ok(json!({
        "pull_request": pull_detail(&pull),
        "message": format!("Updated pull request #{}", p.pull_number.0),
    }))
}

pub(super) async fn merge_pull_request(
    client: &GitHubClient,
    repo: &RepoId,
    p: MergePullRequestParams,
) -> Result<Value, GitHubApiError> {
    let base = format!("/repos/{}/{}/pulls/{}", repo.owner, repo.name, p.pull_number.0);

    // The head ref is needed for branch deletion and is only available
    // before the merge, so fetch it up front when asked to delete.
    let head_ref = if p.delete_branch {
        let pull = client.get_json(&base).await?;
        pull["head"]["ref"].as_str().map(str::to_string)
    } else {
        None
    };

    let mut body = Map::new();
    body.insert("merge_method".to_string(), json!(p.merge_method));
    if let Some(title) = p.commit_title {
        body.insert("commit_title".to_string(), json!(title));
    }
    if let Some(message) = p.commit_message {
        body.insert("commit_message".to_string(), json!(message));
    }
    // SHA guard: the merge fails with 409 if the head has moved since the
    // caller last looked.
    if let Some(sha) = p.sha {
        body.insert("sha".to_string(), json!(sha));
    }

    let result = client
        .put_json(&format!("{}/merge", base), &Value::Object(body))
        .await?;

    let mut branch_deleted = false;
    if let Some(head_ref) = head_ref {
        if result["merged"].as_bool().unwrap_or(false) {
            let route = format!(
                "/repos/{}/{}/git/refs/heads/{}",
                repo.owner,
                repo.name,
                urlencoding::encode(&head_ref)
            );
            match client.delete_empty(&route, None).await {
                Ok(()) => branch_deleted = true,
                Err(e) => {
                    // The merge already landed; a failed branch delete must
                    // not turn the call into an error.
                    tracing::warn!(branch = %head_ref, error = %e, "failed to delete head branch");
                }
            }
        }
    }

    Ok(json!({
        "pull_request": {
            "number": p.pull_number.0,
            "merged": result["merged"],
            "sha": result["sha"],
            "message": result["message"],
            "branch_deleted": branch_deleted,
        },
    }))
}

pub(super) async fn review_pull_request(
    client: &GitHubClient,
    repo: &RepoId,
    p: ReviewPullRequestParams,
) -> Result<Value, GitHubApiError> {
    if !matches!(p.event.as_str(), "APPROVE" | "REQUEST_CHANGES" | "COMMENT") {
        return Err(GitHubApiError::validation(format!(
            "invalid review event '{}' (expected APPROVE, REQUEST_CHANGES, or COMMENT)",
            p.event
        )));
    }

    let route = format!(
        "/repos/{}/{}/pulls/{}/reviews",
        repo.owner, repo.name, p.pull_number.0
    );

    let mut body = Map::new();
    body.insert("event".to_string(), json!(p.event));
    if let Some(text) = p.body {
        body.insert("body".to_string(), json!(text));
    }
    if !p.comments.is_empty() {
        body.insert("comments".to_string(), json!(p.comments));
    }

    let review = client.post_json(&route, &Value::Object(body)).await?;

    Ok(json!({
        "review": {
            "id": review["id"],
            "state": review["state"],
            "submitted_at": review["submitted_at"],
        },
        "message": format!("Submitted {} review on pull request #{}", p.event, p.pull_number.0),
    }))
}

/// Applies labels/assignees to the issue facet of a freshly created PR,
/// logging instead of failing (the PR itself already exists).
async fn apply_issue_decorations(
    client: &GitHubClient,
    repo: &RepoId,
    number: PullNumber,
    labels: &[String],
    assignees: &[String],
) {
    let route = format!("/repos/{}/{}/issues/{}", repo.owner, repo.name, number.0);
    let mut request = Map::new();
    if !labels.is_empty() {
        request.insert("labels".to_string(), json!(labels));
    }
    if !assignees.is_empty() {
        request.insert("assignees".to_string(), json!(assignees));
    }
    if let Err(e) = client.patch_json(&route, &Value::Object(request)).await {
        tracing::warn!(pull = %number, error = %e, "failed to apply labels/assignees");
    }
}

fn pull_summary(item: &Value) -> Value {
    json!({
        "number": item["number"],
        "title": item["title"],
        "state": item["state"],
        "author": item["user"]["login"],
        "head": item["head"]["ref"],
        "base": item["base"]["ref"],
        "draft": item["draft"],
        "created_at": item["created_at"],
        "updated_at": item["updated_at"],
        "merged_at": item["merged_at"],
        "url": item["html_url"],
    })
}

fn pull_detail(pull: &Value) -> Value {
    json!({
        "number": pull["number"],
        "title": pull["title"],
        "state": pull["state"],
        "author": pull["user"]["login"],
        "body": pull["body"],
        "head": {"ref": pull["head"]["ref"], "sha": pull["head"]["sha"]},
        "base": {"ref": pull["base"]["ref"], "sha": pull["base"]["sha"]},
        "draft": pull["draft"],
        "merged": pull["merged"],
        "mergeable": pull["mergeable"],
        "merge_commit_sha": pull["merge_commit_sha"],
        "labels": pluck(&pull["labels"], "name"),
        "assignees": pluck(&pull["assignees"], "login"),
        "requested_reviewers": pluck(&pull["requested_reviewers"], "login"),
        "comments": pull["comments"],
        "commits": pull["commits"],
        "additions": pull["additions"],
        "deletions": pull["deletions"],
        "changed_files": pull["changed_files"],
        "created_at": pull["created_at"],
        "updated_at": pull["updated_at"],
        "merged_at": pull["merged_at"],
        "url": pull["html_url"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_summary_shape() {
        let raw = json!({
            "number": 42,
            "title": "Add feature",
            "state": "open",
            "user": {"login": "octocat"},
            "head": {"ref": "feature", "sha": "abc"},
            "base": {"ref": "main", "sha": "def"},
            "draft": false,
            "html_url": "https://github.com/octocat/Hello-World/pull/42",
        });
        let summary = pull_summary(&raw);
        assert_eq!(summary["number"], 42);
        assert_eq!(summary["head"], "feature");
        assert_eq!(summary["base"], "main");
        assert_eq!(summary["merged_at"], Value::Null);
    }

    #[test]
    fn pull_detail_includes_refs_and_counts() {
        let raw = json!({
            "number": 42,
            "head": {"ref": "feature", "sha": "abc"},
            "base": {"ref": "main", "sha": "def"},
            "additions": 10,
            "deletions": 2,
            "changed_files": 3,
        });
        let detail = pull_detail(&raw);
        assert_eq!(detail["head"]["sha"], "abc");
        assert_eq!(detail["base"]["ref"], "main");
        assert_eq!(detail["additions"], 10);
        assert_eq!(detail["labels"], json!([]));
    }
}
