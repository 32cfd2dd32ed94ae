//! Unified GitHub tool for LLM agents.
//!
//! This crate wraps the GitHub REST API behind a single dispatch-style tool:
//! a request names one of 34 operations and supplies a parameter payload, and
//! the tool answers with a uniform success/error envelope. On the way it
//! resolves authentication from several sources, normalizes repository
//! references, enforces an optional repository allow-list, and fans
//! repository-scoped operations out across every allowed repository when no
//! explicit target is given.

pub mod auth;
pub mod config;
pub mod envelope;
pub mod github;
pub mod ops;
pub mod policy;
pub mod registry;
pub mod tool;
pub mod types;

pub use config::GitHubConfig;
pub use envelope::{ErrorKind, ToolError, ToolResult};
pub use github::{GitHubApi, GitHubApiError, GitHubClient};
pub use policy::RepoPolicy;
pub use tool::{GitHubTool, SetupError, ToolRequest};
pub use types::RepoId;
