//! Octocrab client wrapper.
//!
//! `GitHubClient` owns the underlying `Octocrab` instance (or none, when no
//! token could be resolved) and exposes the small set of raw-route helpers
//! the operation handlers are built on. Unlike a bot scoped to a single
//! repository, this client serves whatever repository the dispatcher resolved
//! for the current call, so routes carry the owner/name explicitly.

use octocrab::Octocrab;
use serde_json::Value;

use crate::auth;
use crate::config::GitHubConfig;

use super::error::GitHubApiError;

/// A GitHub API client carrying resolved authentication.
#[derive(Clone)]
pub struct GitHubClient {
    /// The underlying octocrab client; `None` when no token was resolved, in
    /// which case every operation fails with an authentication error without
    /// touching the network.
    inner: Option<Octocrab>,
}

impl GitHubClient {
    /// Resolves authentication per the configuration and builds a client.
    ///
    /// With a token, authentication is verified by fetching the current user
    /// (invalid credentials fail construction). Without one, the client is
    /// still constructed and a warning is logged; operations will return
    /// authentication errors until a token is configured.
    pub async fn connect(config: &GitHubConfig) -> Result<Self, GitHubApiError> {
        let Some(token) = auth::resolve_token(config).await else {
            tracing::warn!(
                "no GitHub token resolved; operations will fail until a token is configured"
            );
            return Ok(GitHubClient { inner: None });
        };

        let mut builder = Octocrab::builder().personal_token(token);
        if !config.is_public_github() {
            builder = builder
                .base_uri(&config.base_url)
                .map_err(|e| GitHubApiError::validation(format!("invalid base_url: {}", e)))?;
        }
        let octocrab = builder.build().map_err(GitHubApiError::from_octocrab)?;

        let user = octocrab
            .current()
            .user()
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        tracing::info!(login = %user.login, "authenticated with GitHub");

        Ok(GitHubClient {
            inner: Some(octocrab),
        })
    }

    /// Wraps a pre-configured octocrab instance.
    ///
    /// Use this when you need custom authentication (e.g. GitHub App
    /// installation tokens) or in integration tests.
    pub fn from_octocrab(octocrab: Octocrab) -> Self {
        GitHubClient {
            inner: Some(octocrab),
        }
    }

    /// A client with no credentials; every operation fails with an
    /// authentication error.
    pub fn unauthenticated() -> Self {
        GitHubClient { inner: None }
    }

    /// Whether a token was resolved at construction time.
    pub fn is_authenticated(&self) -> bool {
        self.inner.is_some()
    }

    fn octocrab(&self) -> Result<&Octocrab, GitHubApiError> {
        self.inner
            .as_ref()
            .ok_or_else(|| GitHubApiError::authentication("GitHub client not authenticated"))
    }

    // ─── Raw route helpers ────────────────────────────────────────────────────

    pub(crate) async fn get_json(&self, route: &str) -> Result<Value, GitHubApiError> {
        self.octocrab()?
            .get(route, None::<&()>)
            .await
            .map_err(GitHubApiError::from_octocrab)
    }

    pub(crate) async fn post_json(&self, route: &str, body: &Value) -> Result<Value, GitHubApiError> {
        self.octocrab()?
            .post(route, Some(body))
            .await
            .map_err(GitHubApiError::from_octocrab)
    }

    pub(crate) async fn patch_json(
        &self,
        route: &str,
        body: &Value,
    ) -> Result<Value, GitHubApiError> {
        self.octocrab()?
            .patch(route, Some(body))
            .await
            .map_err(GitHubApiError::from_octocrab)
    }

    pub(crate) async fn put_json(&self, route: &str, body: &Value) -> Result<Value, GitHubApiError> {
        self.octocrab()?
            .put(route, Some(body))
            .await
            .map_err(GitHubApiError::from_octocrab)
    }

    /// POST to an endpoint that returns no body (202/204 responses, e.g.
    /// workflow dispatch and run cancellation).
    pub(crate) async fn post_empty(
        &self,
        route: &str,
        body: Option<&Value>,
    ) -> Result<(), GitHubApiError> {
        let response = self
            .octocrab()?
            ._post(route.to_string(), body)
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        octocrab::map_github_error(response)
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(())
    }

    /// DELETE against an endpoint that returns no body.
    pub(crate) async fn delete_empty(
        &self,
        route: &str,
        body: Option<&Value>,
    ) -> Result<(), GitHubApiError> {
        let response = self
            .octocrab()?
            ._delete(route.to_string(), body)
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        octocrab::map_github_error(response)
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(())
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
