//! Workflow (GitHub Actions) operations.

use serde_json::{Map, Value, json};

use crate::ops::{
    CancelWorkflowRunParams, GetWorkflowParams, GetWorkflowRunParams, ListWorkflowRunsParams,
    ListWorkflowsParams, RerunWorkflowParams, TriggerWorkflowParams,
};
use crate::types::RepoId;

use super::client::GitHubClient;
use super::error::GitHubApiError;
use super::{per_page, query_string};

pub(super) async fn list_workflows(
    client: &GitHubClient,
    repo: &RepoId,
    _p: ListWorkflowsParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/actions/workflows?per_page=100",
        repo.owner, repo.name
    );
    let data = client.get_json(&route).await?;

    let workflows: Vec<Value> = data["workflows"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|workflow| {
            json!({
                "id": workflow["id"],
                "name": workflow["name"],
                "path": workflow["path"],
                "state": workflow["state"],
            })
        })
        .collect();

    Ok(json!({
        "count": workflows.len(),
        "workflows": workflows,
    }))
}

pub(super) async fn get_workflow(
    client: &GitHubClient,
    repo: &RepoId,
    p: GetWorkflowParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/actions/workflows/{}",
        repo.owner,
        repo.name,
        urlencoding::encode(&p.workflow_id)
    );
    let data = client.get_json(&route).await?;

    Ok(json!({
        "workflow": {
            "id": data["id"],
            "name": data["name"],
            "path": data["path"],
            "state": data["state"],
            "created_at": data["created_at"],
            "updated_at": data["updated_at"],
            "url": data["html_url"],
            "badge_url": data["badge_url"],
        },
    }))
}

pub(super) async fn trigger_workflow(
    client: &GitHubClient,
    repo: &RepoId,
    p: TriggerWorkflowParams,
) -> Result<Value, GitHubApiError> {
    // workflow_dispatch requires an explicit ref; default to the
    // repository's default branch when the caller didn't pick one.
    let git_ref = match p.r#ref.clone() {
        Some(git_ref) => git_ref,
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

    let route = format!(
        "/repos/{}/{}/actions/workflows/{}/dispatches",
        repo.owner,
        repo.name,
        urlencoding::encode(&p.workflow_id)
    );
    let mut body = Map::new();
    body.insert("ref".to_string(), json!(git_ref));
    if !p.inputs.is_empty() {
        body.insert("inputs".to_string(), Value::Object(p.inputs.clone()));
    }
    client.post_empty(&route, Some(&Value::Object(body))).await?;

    Ok(json!({
        "workflow_id": p.workflow_id,
        "ref": git_ref,
        "inputs": p.inputs,
        "message": format!("Triggered workflow '{}' on '{}'", p.workflow_id, git_ref),
    }))
}

pub(super) async fn list_workflow_runs(
    client: &GitHubClient,
    repo: &RepoId,
    p: ListWorkflowRunsParams,
) -> Result<Value, GitHubApiError> {
    let query = query_string(&[
        ("status", p.status.clone()),
        ("branch", p.branch.clone()),
        ("actor", p.actor.clone()),
        ("per_page", Some(per_page(p.limit).to_string())),
    ]);
    let route = match &p.workflow_id {
        Some(workflow_id) => format!(
            "/repos/{}/{}/actions/workflows/{}/runs{}",
            repo.owner,
            repo.name,
            urlencoding::encode(workflow_id),
            query
        ),
        None => format!("/repos/{}/{}/actions/runs{}", repo.owner, repo.name, query),
    };
    let data = client.get_json(&route).await?;

    // The runs endpoint has no conclusion filter; apply it client-side.
    let runs: Vec<Value> = data["workflow_runs"]
        .as_array()
        .into_iter()
        .flatten()
        .filter(|run| {
            p.conclusion
                .as_deref()
                .is_none_or(|wanted| run["conclusion"].as_str() == Some(wanted))
        })
        .take(p.limit as usize)
        .map(run_summary)
        .collect();

    Ok(json!({
        "count": runs.len(),
        "runs": runs,
    }))
}

pub(super) async fn get_workflow_run(
    client: &GitHubClient,
    repo: &RepoId,
    p: GetWorkflowRunParams,
) -> Result<Value, GitHubApiError> {
    let base = format!(
        "/repos/{}/{}/actions/runs/{}",
        repo.owner, repo.name, p.run_id.0
    );
    let data = client.get_json(&base).await?;

    let mut output = Map::new();
    output.insert("run".to_string(), run_summary(&data));

    if p.include_jobs {
        let jobs = client.get_json(&format!("{}/jobs?per_page=100", base)).await?;
        let jobs: Vec<Value> = jobs["jobs"]
            .as_array()
            .into_iter()
            .flatten()
            .map(|job| {
                json!({
                    "id": job["id"],
                    "name": job["name"],
                    "status": job["status"],
                    "conclusion": job["conclusion"],
                    "started_at": job["started_at"],
                    "completed_at": job["completed_at"],
                })
            })
            .collect();
        output.insert("jobs".to_string(), Value::Array(jobs));
    }

    Ok(Value::Object(output))
}

pub(super) async fn cancel_workflow_run(
    client: &GitHubClient,
    repo: &RepoId,
    p: CancelWorkflowRunParams,
) -> Result<Value, GitHubApiError> {
    let route = format!(
        "/repos/{}/{}/actions/runs/{}/cancel",
        repo.owner, repo.name, p.run_id.0
    );
    client.post_empty(&route, None).await?;

    Ok(json!({
        "run_id": p.run_id.0,
        "message": format!("Requested cancellation of workflow run {}", p.run_id),
    }))
}

pub(super) async fn rerun_workflow(
    client: &GitHubClient,
    repo: &RepoId,
    p: RerunWorkflowParams,
) -> Result<Value, GitHubApiError> {
    let endpoint = if p.failed_jobs_only {
        "rerun-failed-jobs"
    } else {
        "rerun"
    };
    let route = format!(
        "/repos/{}/{}/actions/runs/{}/{}",
        repo.owner, repo.name, p.run_id.0, endpoint
    );
    client.post_empty(&route, None).await?;

    Ok(json!({
        "run_id": p.run_id.0,
        "failed_jobs_only": p.failed_jobs_only,
        "message": format!("Requested rerun of workflow run {}", p.run_id),
    }))
}

fn run_summary(run: &Value) -> Value {
    json!({
        "id": run["id"],
        "name": run["name"],
        "workflow_id": run["workflow_id"],
        "run_number": run["run_number"],
        "event": run["event"],
        "status": run["status"],
        "conclusion": run["conclusion"],
        "head_branch": run["head_branch"],
        "head_sha": run["head_sha"],
        "created_at": run["created_at"],
        "updated_at": run["updated_at"],
        "url": run["html_url"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_summary_shape() {
        let raw = json!({
            "id": 101,
            "name": "CI",
            "workflow_id": 7,
            "run_number": 55,
            "event": "push",
            "status": "completed",
            "conclusion": "success",
            "head_branch": "main",
            "head_sha": "abc123",
            "html_url": "https://github.com/octocat/Hello-World/actions/runs/101",
        });
        let summary = run_summary(&raw);
        assert_eq!(summary["id"], 101);
        assert_eq!(summary["conclusion"], "success");
        assert_eq!(summary["head_branch"], "main");
    }
}
