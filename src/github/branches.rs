//! Branch operations.

use serde_json::{Value, json};

use crate::ops::{
    CompareBranchesParams, CreateBranchParams, GetBranchParams, ListBranchesParams,
};
use crate::types::RepoId;

use super::client::GitHubClient;
use super::error::GitHubApiError;
use super::{per_page, query_string};

pub(super) async fn list_branches(
    client: &GitHubClient,
    repo: &RepoId,
    p: ListBranchesParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/branches{}",
        repo.owner,
        repo.name,
        query_string(&[
            ("protected", p.protected.map(|flag| flag.to_string())),
            ("per_page", Some(per_page(p.limit).to_string())),
        ]),
    );
    let items = client.get_json(&route).await?;

    let branches: Vec<Value> = items
        .as_array()
        .into_iter()
        .flatten()
        .take(p.limit as usize)
        .map(|branch| {
            json!({
                "name": branch["name"],
                "protected": branch["protected"],
                "sha": branch["commit"]["sha"],
            })
        })
        .collect();

    Ok(json!({
        "count": branches.len(),
        "branches": branches,
    }))
}

pub(super) async fn get_branch(
    client: &GitHubClient,
    repo: &RepoId,
    p: GetBranchParams,
) -> Result<Value, GitHubApiError> {
    // Encode for branch names containing '/' (e.g. "feature/foo").
    let route = format!(
        "/repos/{}/{}/branches/{}",
        repo.owner,
        repo.name,
        urlencoding::encode(&p.branch)
    );
    let data = client.get_json(&route).await?;

    Ok(json!({
        "branch": {
            "name": data["name"],
            "protected": data["protected"],
            "sha": data["commit"]["sha"],
            "commit": {
                "message": data["commit"]["commit"]["message"],
                "author": data["commit"]["commit"]["author"]["name"],
                "date": data["commit"]["commit"]["author"]["date"],
            },
        },
    }))
}

pub(super) async fn create_branch(
    client: &GitHubClient,
    repo: &RepoId,
    p: CreateBranchParams,
) -> Result<Value, GitHubApiError> {
    // Resolve the source: an explicit ref, or the repository default branch.
    let source = match p.from_ref.clone() {
        Some(source) => source,
        None => {
            let data = client
                .get_json(&format!("/repos/{}/{}", repo.owner, repo.name))
                .await?;
            data["default_branch"]
                .as_str()
                .unwrap_or("main")
                .to_string()
        }
    };

    let source_branch = client
        .get_json(&format!(
            "/repos/{}/{}/branches/{}",
            repo.owner,
            repo.name,
            urlencoding::encode(&source)
        ))
        .await?;
    let Some(sha) = source_branch["commit"]["sha"].as_str() else {
        return Err(GitHubApiError::unexpected(format!(
            "source branch '{}' has no commit SHA",
            source
        )));
    };

    let created = client
        .post_json(
            &format!("/repos/{}/{}/git/refs", repo.owner, repo.name),
            &json!({
                "ref": format!("refs/heads/{}", p.branch),
                "sha": sha,
            }),
        )
        .await?;

    Ok(json!({
        "branch": {
            "name": p.branch,
            "sha": created["object"]["sha"],
            "from": source,
        },
        "message": format!("Created branch '{}' from '{}'", p.branch, source),
    }))
}

pub(super) async fn compare_branches(
    client: &GitHubClient,
    repo: &RepoId,
    p: CompareBranchesParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/compare/{}...{}",
        repo.owner,
        repo.name,
        urlencoding::encode(&p.base),
        urlencoding::encode(&p.head)
    );
    let data = client.get_json(&route).await?;

    let mut output = json!({
        "base": p.base,
        "head": p.head,
        "status": data["status"],
        "ahead_by": data["ahead_by"],
        "behind_by": data["behind_by"],
        "total_commits": data["total_commits"],
    });

    if p.include_commits {
        let commits: Vec<Value> = data["commits"]
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
        output["commits"] = Value::Array(commits);
    }

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
                })
            })
            .collect();
        output["files"] = Value::Array(files);
    }

    Ok(output)
}
