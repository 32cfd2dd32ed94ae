//! Issue operations.

use serde_json::{Map, Value, json};

use crate::ops::{
    CommentIssueParams, CreateIssueParams, GetIssueParams, ListIssuesParams, UpdateIssueParams,
};
use crate::types::RepoId;

use super::client::GitHubClient;
use super::error::GitHubApiError;
use super::{per_page, pluck, query_string};

pub(super) async fn list_issues(
    client: &GitHubClient,
    repo: &RepoId,
    p: ListIssuesParams,
) -> Result<Value, GitHubApiError> {
    let labels = if p.labels.is_empty() {
        None
    } else {
        Some(p.labels.join(","))
    };
    let route = format!(
        "/repos/{}/{}/issues{}",
        repo.owner,
        repo.name,
        query_string(&[
            ("state", Some(p.state.clone())),
            ("labels", labels),
            ("assignee", p.assignee.clone()),
            ("creator", p.creator.clone()),
            ("mentioned", p.mentioned.clone()),
            ("sort", Some(p.sort.clone())),
            ("direction", Some(p.direction.clone())),
            ("per_page", Some(per_page(p.limit).to_string())),
        ]),
    );
    let items = client.get_json(&route).await?;

    // The issues endpoint also returns pull requests; filter them out.
    let issues: Vec<Value> = items
        .as_array()
        .into_iter()
        .flatten()
        .filter(|item| item.get("pull_request").is_none())
        .take(p.limit as usize)
        .map(issue_summary)
        .collect();

    Ok(json!({
        "state": p.state,
        "count": issues.len(),
        "issues": issues,
    }))
}

pub(super) async fn get_issue(
    client: &GitHubClient,
    repo: &RepoId,
    p: GetIssueParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/issues/{}",
        repo.owner, repo.name, p.issue_number.0
    );
    let issue = client.get_json(&route).await?;

    let mut output = Map::new();
    output.insert("issue".to_string(), issue_detail(&issue));

    if p.include_comments {
        let route = format!(
            "/repos/{}/{}/issues/{}/comments?per_page={}",
            repo.owner,
            repo.name,
            p.issue_number.0,
            per_page(p.comments_limit)
        );
        let comments = client.get_json(&route).await?;
        let comments: Vec<Value> = comments
            .as_array()
            .into_iter()
            .flatten()
            .take(p.comments_limit as usize)
            .map(|comment| {
                json!({
                    "id": comment["id"],
                    "author": comment["user"]["login"],
                    "body": comment["body"],
                    "created_at": comment["created_at"],
                })
            })
            .collect();
        output.insert("comments".to_string(), Value::Array(comments));
    }

    Ok(Value::Object(output))
}

pub(super) async fn create_issue(
    client: &GitHubClient,
    repo: &RepoId,
    p: CreateIssueParams,
) -> Result<Value, GitHubApiError> {
    let route = format!("/repos/{}/{}/issues", repo.owner, repo.name);

    let mut body = Map::new();
    body.insert("title".to_string(), json!(p.title));
    if let Some(text) = p.body {
        body.insert("body".to_string(), json!(text));
    }
    if !p.labels.is_empty() {
        body.insert("labels".to_string(), json!(p.labels));
    }
    if !p.assignees.is_empty() {
        body.insert("assignees".to_string(), json!(p.assignees));
    }
    if let Some(milestone) = p.milestone {
        body.insert("milestone".to_string(), json!(milestone));
    }

    let issue = client.post_json(&route, &Value::Object(body)).await?;

    Ok(json!({
        "issue": {
            "number": issue["number"],
            "title": issue["title"],
            "state": issue["state"],
            "url": issue["html_url"],
            "created_at": issue["created_at"],
        },
        "message": format!("Created issue #{}", issue["number"]),
    }))
}

pub(super) async fn update_issue(
    client: &GitHubClient,
    repo: &RepoId,
    p: UpdateIssueParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/issues/{}",
        repo.owner, repo.name, p.issue_number.0
    );

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
    // An explicitly supplied empty list clears labels/assignees.
    if let Some(labels) = p.labels {
        body.insert("labels".to_string(), json!(labels));
    }
    if let Some(assignees) = p.assignees {
        body.insert("assignees".to_string(), json!(assignees));
    }
    if let Some(milestone) = p.milestone {
        body.insert("milestone".to_string(), json!(milestone));
    }

    if body.is_empty() {
        return Err(GitHubApiError::validation(
            "update_issue requires at least one field to change",
        ));
    }

    let issue = client.patch_json(&route, &Value::Object(body)).await?;

    Ok(json!({
        "issue": issue_detail(&issue),
        "message": format!("Updated issue #{}", p.issue_number.0),
    }))
}

pub(super) async fn comment_issue(
    client: &GitHubClient,
    repo: &RepoId,
    p: CommentIssueParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/issues/{}/comments",
        repo.owner, repo.name, p.issue_number.0
    );
    let comment = client
        .post_json(&route, &json!({ "body": p.body }))
        .await?;

    Ok(json!({
        "comment": {
            "id": comment["id"],
            "url": comment["html_url"],
            "created_at": comment["created_at"],
        },
        "message": format!("Commented on issue #{}", p.issue_number.0),
    }))
}

fn issue_summary(item: &Value) -> Value {
    json!({
        "number": item["number"],
        "title": item["title"],
        "state": item["state"],
        "author": item["user"]["login"],
        "created_at": item["created_at"],
        "updated_at": item["updated_at"],
        "closed_at": item["closed_at"],
        "labels": pluck(&item["labels"], "name"),
        "assignees": pluck(&item["assignees"], "login"),
        "comments": item["comments"],
        "url": item["html_url"],
    })
}

fn issue_detail(issue: &Value) -> Value {
    json!({
        "number": issue["number"],
        "title": issue["title"],
        "state": issue["state"],
        "author": issue["user"]["login"],
        "body": issue["body"],
        "labels": pluck(&issue["labels"], "name"),
        "assignees": pluck(&issue["assignees"], "login"),
        "milestone": issue["milestone"]["title"],
        "comments": issue["comments"],
        "created_at": issue["created_at"],
        "updated_at": issue["updated_at"],
        "closed_at": issue["closed_at"],
        "url": issue["html_url"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_summary_shape() {
        let raw = json!({
            "number": 7,
            "title": "Crash on startup",
            "state": "open",
            "user": {"login": "octocat"},
            "labels": [{"name": "bug"}],
            "assignees": [{"login": "hubot"}],
            "comments": 3,
            "html_url": "https://github.com/octocat/Hello-World/issues/7",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z",
            "closed_at": null,
        });
        let summary = issue_summary(&raw);
        assert_eq!(summary["number"], 7);
        assert_eq!(summary["author"], "octocat");
        assert_eq!(summary["labels"], json!(["bug"]));
        assert_eq!(summary["assignees"], json!(["hubot"]));
        assert_eq!(summary["closed_at"], Value::Null);
    }

    #[test]
    fn issue_detail_tolerates_missing_fields() {
        let detail = issue_detail(&json!({"number": 1}));
        assert_eq!(detail["number"], 1);
        assert_eq!(detail["author"], Value::Null);
        assert_eq!(detail["labels"], json!([]));
        assert_eq!(detail["milestone"], Value::Null);
    }
}
