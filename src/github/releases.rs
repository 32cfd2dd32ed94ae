//! Release and tag operations.

use serde_json::{Map, Value, json};

use crate::ops::{
    CreateReleaseParams, CreateTagParams, GetReleaseParams, ListReleasesParams, ListTagsParams,
};
use crate::types::RepoId;

use super::client::GitHubClient;
use super::error::GitHubApiError;
use super::{per_page, query_string};

pub(super) async fn list_releases(
    client: &GitHubClient,
    repo: &RepoId,
    p: ListReleasesParams,
) -> Result<Value, GitHubApiError> {
    // Draft/prerelease filtering happens client-side, so fetch a full page
    // regardless of the requested limit.
    let route = format!(
        "/repos/{}/{}/releases?per_page=100",
        repo.owner, repo.name
    );
    let items = client.get_json(&route).await?;

    let releases: Vec<Value> = items
        .as_array()
        .into_iter()
        .flatten()
        .filter(|release| p.include_drafts || !release["draft"].as_bool().unwrap_or(false))
        .filter(|release| {
            p.include_prereleases || !release["prerelease"].as_bool().unwrap_or(false)
        })
        .take(p.limit as usize)
        .map(release_summary)
        .collect();

    Ok(json!({
        "count": releases.len(),
        "releases": releases,
    }))
}

pub(super) async fn get_release(
    client: &GitHubClient,
    repo: &RepoId,
    p: GetReleaseParams,
) -> Result<Value, GitHubApiError> {
    let route = match (&p.release_id, p.tag_name.as_deref()) {
        (Some(id), _) => format!("/repos/{}/{}/releases/{}", repo.owner, repo.name, id),
        (None, Some("latest")) => {
            format!("/repos/{}/{}/releases/latest", repo.owner, repo.name)
        }
        (None, Some(tag)) => format!(
            "/repos/{}/{}/releases/tags/{}",
            repo.owner,
            repo.name,
            urlencoding::encode(tag)
        ),
        (None, None) => {
            return Err(GitHubApiError::validation(
                "either release_id or tag_name is required",
            ));
        }
    };
    let data = client.get_json(&route).await?;

    let assets: Vec<Value> = data["assets"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|asset| {
            json!({
                "name": asset["name"],
                "size": asset["size"],
                "download_count": asset["download_count"],
                "url": asset["browser_download_url"],
            })
        })
        .collect();

    Ok(json!({
        "release": {
            "id": data["id"],
            "tag_name": data["tag_name"],
            "name": data["name"],
            "body": data["body"],
            "draft": data["draft"],
            "prerelease": data["prerelease"],
            "author": data["author"]["login"],
            "created_at": data["created_at"],
            "published_at": data["published_at"],
            "assets": assets,
            "url": data["html_url"],
        },
    }))
}

pub(super) async fn create_release(
    client: &GitHubClient,
    repo: &RepoId,
    p: CreateReleaseParams,
) -> Result<Value, GitHubApiError> {
    let route = format!("/repos/{}/{}/releases", repo.owner, repo.name);

    let mut body = Map::new();
    body.insert("tag_name".to_string(), json!(p.tag_name));
    body.insert("draft".to_string(), json!(p.draft));
    body.insert("prerelease".to_string(), json!(p.prerelease));
    body.insert(
        "generate_release_notes".to_string(),
        json!(p.generate_release_notes),
    );
    if let Some(name) = p.name {
        body.insert("name".to_string(), json!(name));
    }
    if let Some(text) = p.body {
        body.insert("body".to_string(), json!(text));
    }
    if let Some(target) = p.target_commitish {
        body.insert("target_commitish".to_string(), json!(target));
    }

    let data = client.post_json(&route, &Value::Object(body)).await?;

    Ok(json!({
        "release": release_summary(&data),
        "message": format!("Created release {}", data["tag_name"]),
    }))
}

pub(super) async fn list_tags(
    client: &GitHubClient,
    repo: &RepoId,
    p: ListTagsParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/tags?per_page={}",
        repo.owner,
        repo.name,
        per_page(p.limit)
    );
    let items = client.get_json(&route).await?;

    let tags: Vec<Value> = items
        .as_array()
        .into_iter()
        .flatten()
        .take(p.limit as usize)
        .map(|tag| {
            json!({
                "name": tag["name"],
                "sha": tag["commit"]["sha"],
            })
        })
        .collect();

    Ok(json!({
        "count": tags.len(),
        "tags": tags,
    }))
}

pub(super) async fn create_tag(
    client: &GitHubClient,
    repo: &RepoId,
    p: CreateTagParams,
) -> Result<Value, GitHubApiError> {
    // Resolve what the tag points at: an explicit SHA, or the head of the
    // default branch.
    let object_sha = match p.object_sha.clone() {
        Some(sha) => sha,
        None => {
            let data = client
                .get_json(&format!("/repos/{}/{}", repo.owner, repo.name))
                .await?;
            let default_branch = data["default_branch"].as_str().unwrap_or("main");
            let branch = client
                .get_json(&format!(
                    "/repos/{}/{}/branches/{}",
                    repo.owner,
                    repo.name,
                    urlencoding::encode(default_branch)
                ))
                .await?;
            match branch["commit"]["sha"].as_str() {
                Some(sha) => sha.to_string(),
                None => {
                    return Err(GitHubApiError::unexpected(
                        "default branch has no commit SHA to tag",
                    ));
                }
            }
        }
    };

    let annotated = p.message.is_some();
    let ref_sha = if let Some(message) = &p.message {
        // Annotated tag: create the tag object first, then point a ref at it.
        let mut body = Map::new();
        body.insert("tag".to_string(), json!(p.tag));
        body.insert("message".to_string(), json!(message));
        body.insert("object".to_string(), json!(object_sha));
        body.insert("type".to_string(), json!(p.r#type));
        if let (Some(name), Some(email)) = (&p.tagger_name, &p.tagger_email) {
            body.insert(
                "tagger".to_string(),
                json!({ "name": name, "email": email }),
            );
        }
        let tag_object = client
            .post_json(
                &format!("/repos/{}/{}/git/tags", repo.owner, repo.name),
                &Value::Object(body),
            )
            .await?;
        match tag_object["sha"].as_str() {
            Some(sha) => sha.to_string(),
            None => {
                return Err(GitHubApiError::unexpected(
                    "tag object response carried no SHA",
                ));
            }
        }
    } else {
        object_sha.clone()
    };

    client
        .post_json(
            &format!("/repos/{}/{}/git/refs", repo.owner, repo.name),
            &json!({
                "ref": format!("refs/tags/{}", p.tag),
                "sha": ref_sha,
            }),
        )
        .await?;

    Ok(json!({
        "tag": {
            "name": p.tag,
            "sha": object_sha,
            "annotated": annotated,
        },
        "message": format!("Created tag '{}'", p.tag),
    }))
}

fn release_summary(release: &Value) -> Value {
    json!({
        "id": release["id"],
        "tag_name": release["tag_name"],
        "name": release["name"],
        "draft": release["draft"],
        "prerelease": release["prerelease"],
        "created_at": release["created_at"],
        "published_at": release["published_at"],
        "url": release["html_url"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_summary_shape() {
        let raw = json!({
            "id": 1,
            "tag_name": "v1.0.0",
            "name": "First release",
            "draft": false,
            "prerelease": false,
            "html_url": "https://github.com/octocat/Hello-World/releases/v1.0.0",
        });
        let summary = release_summary(&raw);
        assert_eq!(summary["tag_name"], "v1.0.0");
        assert_eq!(summary["draft"], false);
        assert_eq!(summary["published_at"], Value::Null);
    }
}
