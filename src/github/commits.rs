//! Commit operations.

use serde_json::{Map, Value, json};

use crate::ops::{GetCommitParams, ListCommitsParams};
use crate::types::RepoId;

use super::client::GitHubClient;
use super::error::GitHubApiError;
use super::{per_page, query_string};

pub(super) async fn list_commits(
    client: &GitHubClient,
    repo: &RepoId,
    p: ListCommitsParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/commits{}",
        repo.owner,
        repo.name,
        query_string(&[
            ("sha", p.sha.clone()),
            ("path", p.path.clone()),
            ("author", p.author.clone()),
            ("since", p.since.map(|t| t.to_rfc3339())),
            ("until", p.until.map(|t| t.to_rfc3339())),
            ("per_page", Some(per_page(p.limit).to_string())),
        ]),
    );
    let items = client.get_json(&route).await?;

    let commits: Vec<Value> = items
        .as_array()
        .into_iter()
        .flatten()
        .take(p.limit as usize)
        .map(|item| {
            json!({
                "sha": item["sha"],
                "message": item["commit"]["message"],
                "author": {
                    "name": item["commit"]["author"]["name"],
                    "login": item["author"]["login"],
                    "date": item["commit"]["author"]["date"],
                },
                "url": item["html_url"],
            })
        })
        .collect();

    Ok(json!({
        "count": commits.len(),
        "commits": commits,
    }))
}

pub(super) async fn get_commit(
    client: &GitHubClient,
    repo: &RepoId,
    p: GetCommitParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/commits/{}",
        repo.owner,
        repo.name,
        urlencoding::encode(&p.sha)
    );
    let data = client.get_json(&route).await?;

    let mut commit = Map::new();
    commit.insert("sha".to_string(), data["sha"].clone());
    commit.insert("message".to_string(), data["commit"]["message"].clone());
    commit.insert(
        "author".to_string(),
        json!({
            "name": data["commit"]["author"]["name"],
            "email": data["commit"]["author"]["email"],
            "login": data["author"]["login"],
            "date": data["commit"]["author"]["date"],
        }),
    );
    commit.insert(
        "committer".to_string(),
        json!({
            "name": data["commit"]["committer"]["name"],
            "date": data["commit"]["committer"]["date"],
        }),
    );
    commit.insert(
        "stats".to_string(),
        json!({
            "additions": data["stats"]["additions"],
            "deletions": data["stats"]["deletions"],
            "total": data["stats"]["total"],
        }),
    );
    commit.insert(
        "parents".to_string(),
        super::pluck(&data["parents"], "sha"),
    );
    commit.insert("url".to_string(), data["html_url"].clone());

    if p.include_files {
        let files: Vec<Value> = data["files"]
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
        commit.insert("files".to_string(), Value::Array(files));
    }

    Ok(json!({ "commit": Value::Object(commit) }))
}
