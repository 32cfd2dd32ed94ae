//! Repository operations, including the two user-level ones.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value, json};

use crate::ops::{
    CreateRepositoryParams, GetFileContentParams, GetRepositoryParams, ListRepositoriesParams,
    ListRepositoryContentsParams,
};
use crate::types::RepoId;

use super::client::GitHubClient;
use super::error::GitHubApiError;
use super::{per_page, query_string};

pub(super) async fn get_repository(
    client: &GitHubClient,
    repo: &RepoId,
    _p: GetRepositoryParams,
) -> Result<Value, GitHubApiError> {
    let route = format!("/repos/{}/{}", repo.owner, repo.name);
    let data = client.get_json(&route).await?;

    Ok(json!({
        "repository": {
            "name": data["name"],
            "full_name": data["full_name"],
            "description": data["description"],
            "private": data["private"],
            "fork": data["fork"],
            "archived": data["archived"],
            "default_branch": data["default_branch"],
            "language": data["language"],
            "topics": data["topics"],
            "license": data["license"]["spdx_id"],
            "stars": data["stargazers_count"],
            "forks": data["forks_count"],
            "open_issues": data["open_issues_count"],
            "created_at": data["created_at"],
            "updated_at": data["updated_at"],
            "pushed_at": data["pushed_at"],
            "url": data["html_url"],
            "clone_url": data["clone_url"],
        },
    }))
}

pub(super) async fn get_file_content(
    client: &GitHubClient,
    repo: &RepoId,
    p: GetFileContentParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/contents/{}{}",
        repo.owner,
        repo.name,
        encode_path(&p.path),
        query_string(&[("ref", p.r#ref.clone())]),
    );
    let data = client.get_json(&route).await?;

    if data.is_array() {
        return Err(GitHubApiError::validation(format!(
            "'{}' is a directory; use list_repository_contents instead",
            p.path
        )));
    }

    let mut file = Map::new();
    file.insert("name".to_string(), data["name"].clone());
    file.insert("path".to_string(), data["path"].clone());
    file.insert("size".to_string(), data["size"].clone());
    file.insert("sha".to_string(), data["sha"].clone());
    file.insert("download_url".to_string(), data["download_url"].clone());

    let raw_content = data["content"].as_str().unwrap_or_default();
    if p.decode {
        match decode_base64_content(raw_content) {
            Some(text) => {
                file.insert("content".to_string(), json!(text));
                file.insert("decoded".to_string(), json!(true));
            }
            None => {
                // Binary or malformed content: hand back the raw base64
                // rather than failing the whole call.
                tracing::warn!(path = %p.path, "file content is not valid UTF-8 text; returning base64");
                file.insert("content".to_string(), json!(raw_content));
                file.insert("decoded".to_string(), json!(false));
            }
        }
    } else {
        file.insert("content".to_string(), json!(raw_content));
        file.insert("decoded".to_string(), json!(false));
    }

    Ok(json!({ "file": Value::Object(file) }))
}

pub(super) async fn list_repository_contents(
    client: &GitHubClient,
    repo: &RepoId,
    p: ListRepositoryContentsParams,
) -> Result<Value, GitHubApiError> {
    if p.recursive {
        // The contents endpoint is one level at a time; recursive listings go
        // through the git trees API instead.
        let tree_ref = p.r#ref.clone().unwrap_or_else(|| "HEAD".to_string());
        let route = format!(
            "/repos/{}/{}/git/trees/{}?recursive=1",
            repo.owner,
            repo.name,
            urlencoding::encode(&tree_ref),
        );
        let data = client.get_json(&route).await?;
        let prefix = p.path.trim_matches('/');
        let entries: Vec<Value> = data["tree"]
            .as_array()
            .into_iter()
            .flatten()
            .filter(|entry| {
                prefix.is_empty()
                    || entry["path"]
                        .as_str()
                        .is_some_and(|path| path.starts_with(&format!("{}/", prefix)))
            })
            .map(|entry| {
                json!({
                    "path": entry["path"],
                    "type": content_type(entry["type"].as_str()),
                    "size": entry["size"],
                    "sha": entry["sha"],
                })
            })
            .collect();

        return Ok(json!({
            "path": p.path,
            "count": entries.len(),
            "truncated": data["truncated"],
            "entries": entries,
        }));
    }

    let route = format!(
        "/repos/{}/{}/contents/{}{}",
        repo.owner,
        repo.name,
        encode_path(&p.path),
        query_string(&[("ref", p.r#ref.clone())]),
    );
    let data = client.get_json(&route).await?;

    // A file path returns a single object; normalize to a one-entry listing.
    let items: Vec<&Value> = match data.as_array() {
        Some(array) => array.iter().collect(),
        None => vec![&data],
    };
    let entries: Vec<Value> = items
        .into_iter()
        .map(|entry| {
            json!({
                "name": entry["name"],
                "path": entry["path"],
                "type": entry["type"],
                "size": entry["size"],
                "sha": entry["sha"],
            })
        })
        .collect();

    Ok(json!({
        "path": p.path,
        "count": entries.len(),
        "entries": entries,
    }))
}

pub(super) async fn list_repositories(
    client: &GitHubClient,
    p: ListRepositoriesParams,
) -> Result<Value, GitHubApiError> {
    let query = query_string(&[
        ("type", Some(p.r#type.clone())),
        ("sort", Some(p.sort.clone())),
        ("direction", Some(p.direction.clone())),
        ("per_page", Some(per_page(p.limit).to_string())),
    ]);
    // The /users/ listing covers organizations too; /user/repos covers the
    // authenticated account when no owner is given.
    let route = match &p.owner {
        Some(owner) => format!("/users/{}/repos{}", urlencoding::encode(owner), query),
        None => format!("/user/repos{}", query),
    };
    let items = client.get_json(&route).await?;

    let repositories: Vec<Value> = items
        .as_array()
        .into_iter()
        .flatten()
        .take(p.limit as usize)
        .map(|item| {
            json!({
                "name": item["name"],
                "full_name": item["full_name"],
                "description": item["description"],
                "private": item["private"],
                "fork": item["fork"],
                "default_branch": item["default_branch"],
                "language": item["language"],
                "stars": item["stargazers_count"],
                "updated_at": item["updated_at"],
                "url": item["html_url"],
            })
        })
        .collect();

    Ok(json!({
        "owner": p.owner,
        "count": repositories.len(),
        "repositories": repositories,
    }))
}

pub(super) async fn create_repository(
    client: &GitHubClient,
    p: CreateRepositoryParams,
) -> Result<Value, GitHubApiError> {
    let route = match &p.organization {
        Some(org) => format!("/orgs/{}/repos", urlencoding::encode(org)),
        None => "/user/repos".to_string(),
    };

    let mut body = Map::new();
    body.insert("name".to_string(), json!(p.name));
    body.insert("private".to_string(), json!(p.private));
    body.insert("auto_init".to_string(), json!(p.auto_init));
    if let Some(description) = p.description {
        body.insert("description".to_string(), json!(description));
    }
    if let Some(template) = p.gitignore_template {
        body.insert("gitignore_template".to_string(), json!(template));
    }
    if let Some(template) = p.license_template {
        body.insert("license_template".to_string(), json!(template));
    }
    for (key, value) in [
        ("allow_squash_merge", p.allow_squash_merge),
        ("allow_merge_commit", p.allow_merge_commit),
        ("allow_rebase_merge", p.allow_rebase_merge),
        ("delete_branch_on_merge", p.delete_branch_on_merge),
        ("has_issues", p.has_issues),
        ("has_projects", p.has_projects),
        ("has_wiki", p.has_wiki),
    ] {
        if let Some(flag) = value {
            body.insert(key.to_string(), json!(flag));
        }
    }

    let data = client.post_json(&route, &Value::Object(body)).await?;

    Ok(json!({
        "repository": {
            "name": data["name"],
            "full_name": data["full_name"],
            "private": data["private"],
            "default_branch": data["default_branch"],
            "created_at": data["created_at"],
            "url": data["html_url"],
            "clone_url": data["clone_url"],
        },
        "message": format!("Created repository {}", data["full_name"]),
    }))
}

/// Percent-encodes a repository path segment by segment, keeping the `/`
/// separators intact.
fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Decodes GitHub's newline-wrapped base64 file content into UTF-8 text.
/// Returns `None` for invalid base64 or non-UTF-8 (binary) content.
fn decode_base64_content(content: &str) -> Option<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}

/// Maps git tree entry types onto the contents-endpoint vocabulary.
fn content_type(tree_type: Option<&str>) -> &'static str {
    match tree_type {
        Some("tree") => "dir",
        Some("commit") => "submodule",
        _ => "file",
    }
}
