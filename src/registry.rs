//! Static registry of the 34 supported operations.
//!
//! Each operation is described once, at compile time: its name, whether it is
//! repository-scoped or user-level, and which parameters it requires. The
//! dispatcher validates requests against this table before anything touches
//! the network.
//!
//! Repository-scoped operations accept an optional `repository` parameter;
//! omitting it fans the operation out across the configured allow-list (see
//! the dispatcher). `repository` therefore never appears in a required list.

/// Whether an operation targets a repository or the authenticated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Targets one repository (or all allowed repositories when none is given).
    Repo,
    /// Targets the authenticated account or an explicit owner/organization;
    /// never takes a `repository` parameter.
    User,
}

/// Static description of one operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub scope: Scope,
    /// Parameters that must be present (and non-null) in the request.
    pub required: &'static [&'static str],
    /// Parameters the operation understands beyond the required set.
    pub optional: &'static [&'static str],
}

/// The full operation catalog, grouped by category.
pub const OPERATIONS: [OperationDescriptor; 34] = [
    // ─── Issues ───────────────────────────────────────────────────────────────
    OperationDescriptor {
        name: "list_issues",
        scope: Scope::Repo,
        required: &[],
        optional: &[
            "state",
            "labels",
            "assignee",
            "creator",
            "mentioned",
            "sort",
            "direction",
            "limit",
        ],
    },
    OperationDescriptor {
        name: "get_issue",
        scope: Scope::Repo,
        required: &["issue_number"],
        optional: &["include_comments", "comments_limit"],
    },
    OperationDescriptor {
        name: "create_issue",
        scope: Scope::Repo,
        required: &["title"],
        optional: &["body", "labels", "assignees", "milestone"],
    },
    OperationDescriptor {
        name: "update_issue",
        scope: Scope::Repo,
        required: &["issue_number"],
        optional: &["title", "body", "state", "labels", "assignees", "milestone"],
    },
    OperationDescriptor {
        name: "comment_issue",
        scope: Scope::Repo,
        required: &["issue_number", "body"],
        optional: &[],
    },
    // ─── Pull Requests ────────────────────────────────────────────────────────
    OperationDescriptor {
        name: "list_pull_requests",
        scope: Scope::Repo,
        required: &[],
        optional: &["state", "head", "base", "sort", "direction", "limit"],
    },
    OperationDescriptor {
        name: "get_pull_request",
        scope: Scope::Repo,
        required: &["pull_number"],
        optional: &["include_files", "include_reviews", "include_commits"],
    },
    OperationDescriptor {
        name: "create_pull_request",
        scope: Scope::Repo,
        required: &["title", "head", "base"],
        optional: &[
            "body",
            "draft",
            "maintainer_can_modify",
            "labels",
            "assignees",
            "reviewers",
            "team_reviewers",
        ],
    },
    OperationDescriptor {
        name: "update_pull_request",
        scope: Scope::Repo,
        required: &["pull_number"],
        optional: &[
            "title",
            "body",
            "state",
            "base",
            "maintainer_can_modify",
            "labels",
            "assignees",
            "add_reviewers",
            "remove_reviewers",
        ],
    },
    OperationDescriptor {
        name: "merge_pull_request",
        scope: Scope::Repo,
        required: &["pull_number"],
        optional: &[
            "merge_method",
            "commit_title",
            "commit_message",
            "sha",
            "delete_branch",
        ],
    },
    OperationDescriptor {
        name: "review_pull_request",
        scope: Scope::Repo,
        required: &["pull_number", "event"],
        optional: &["body", "comments"],
    },
    // ─── Repositories ─────────────────────────────────────────────────────────
    OperationDescriptor {
        name: "get_repository",
        scope: Scope::Repo,
        required: &[],
        optional: &[],
    },
    OperationDescriptor {
        name: "get_file_content",
        scope: Scope::Repo,
        required: &["path"],
        optional: &["ref", "decode"],
    },
    OperationDescriptor {
        name: "list_repository_contents",
        scope: Scope::Repo,
        required: &[],
        optional: &["path", "ref", "recursive"],
    },
    OperationDescriptor {
        name: "list_repositories",
        scope: Scope::User,
        required: &[],
        optional: &["owner", "type", "sort", "direction", "limit"],
    },
    OperationDescriptor {
        name: "create_repository",
        scope: Scope::User,
        required: &["name"],
        optional: &[
            "description",
            "private",
            "organization",
            "auto_init",
            "gitignore_template",
            "license_template",
            "allow_squash_merge",
            "allow_merge_commit",
            "allow_rebase_merge",
            "delete_branch_on_merge",
            "has_issues",
            "has_projects",
            "has_wiki",
        ],
    },
    // ─── Commits ──────────────────────────────────────────────────────────────
    OperationDescriptor {
        name: "list_commits",
        scope: Scope::Repo,
        required: &[],
        optional: &["sha", "path", "author", "since", "until", "limit"],
    },
    OperationDescriptor {
        name: "get_commit",
        scope: Scope::Repo,
        required: &["sha"],
        optional: &["include_files"],
    },
    // ─── Branches ─────────────────────────────────────────────────────────────
    OperationDescriptor {
        name: "list_branches",
        scope: Scope::Repo,
        required: &[],
        optional: &["protected", "limit"],
    },
    OperationDescriptor {
        name: "get_branch",
        scope: Scope::Repo,
        required: &["branch"],
        optional: &[],
    },
    OperationDescriptor {
        name: "create_branch",
        scope: Scope::Repo,
        required: &["branch"],
        optional: &["from_ref"],
    },
    OperationDescriptor {
        name: "compare_branches",
        scope: Scope::Repo,
        required: &["base", "head"],
        optional: &["include_files", "include_commits"],
    },
    // ─── Releases & Tags ──────────────────────────────────────────────────────
    OperationDescriptor {
        name: "list_releases",
        scope: Scope::Repo,
        required: &[],
        optional: &["include_drafts", "include_prereleases", "limit"],
    },
    OperationDescriptor {
        name: "get_release",
        scope: Scope::Repo,
        // Either release_id or tag_name; the handler enforces the either-or.
        required: &[],
        optional: &["release_id", "tag_name"],
    },
    OperationDescriptor {
        name: "create_release",
        scope: Scope::Repo,
        required: &["tag_name"],
        optional: &[
            "name",
            "body",
            "draft",
            "prerelease",
            "target_commitish",
            "generate_release_notes",
        ],
    },
    OperationDescriptor {
        name: "list_tags",
        scope: Scope::Repo,
        required: &[],
        optional: &["limit"],
    },
    OperationDescriptor {
        name: "create_tag",
        scope: Scope::Repo,
        required: &["tag"],
        optional: &[
            "message",
            "object_sha",
            "type",
            "tagger_name",
            "tagger_email",
        ],
    },
    // ─── Actions ──────────────────────────────────────────────────────────────
    OperationDescriptor {
        name: "list_workflows",
        scope: Scope::Repo,
        required: &[],
        optional: &[],
    },
    OperationDescriptor {
        name: "get_workflow",
        scope: Scope::Repo,
        required: &["workflow_id"],
        optional: &[],
    },
    OperationDescriptor {
        name: "trigger_workflow",
        scope: Scope::Repo,
        required: &["workflow_id"],
        optional: &["ref", "inputs"],
    },
    OperationDescriptor {
        name: "list_workflow_runs",
        scope: Scope::Repo,
        required: &[],
        optional: &[
            "workflow_id",
            "status",
            "conclusion",
            "branch",
            "actor",
            "limit",
        ],
    },
    OperationDescriptor {
        name: "get_workflow_run",
        scope: Scope::Repo,
        required: &["run_id"],
        optional: &["include_jobs"],
    },
    OperationDescriptor {
        name: "cancel_workflow_run",
        scope: Scope::Repo,
        required: &["run_id"],
        optional: &[],
    },
    OperationDescriptor {
        name: "rerun_workflow",
        scope: Scope::Repo,
        required: &["run_id"],
        optional: &["failed_jobs_only"],
    },
];

/// Looks up an operation by name.
pub fn resolve(name: &str) -> Option<&'static OperationDescriptor> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// All operation names, in catalog order.
pub fn names() -> impl Iterator<Item = &'static str> {
    OPERATIONS.iter().map(|op| op.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_34_operations() {
        assert_eq!(OPERATIONS.len(), 34);
    }

    #[test]
    fn names_are_unique() {
        let unique: HashSet<_> = names().collect();
        assert_eq!(unique.len(), OPERATIONS.len());
    }

    #[test]
    fn resolve_known_operations() {
        let issues = resolve("list_issues").unwrap();
        assert_eq!(issues.scope, Scope::Repo);
        assert!(issues.required.is_empty());

        let comment = resolve("comment_issue").unwrap();
        assert_eq!(comment.required, &["issue_number", "body"]);

        let create_repo = resolve("create_repository").unwrap();
        assert_eq!(create_repo.scope, Scope::User);
        assert_eq!(create_repo.required, &["name"]);
    }

    #[test]
    fn resolve_unknown_operation() {
        assert!(resolve("delete_everything").is_none());
        assert!(resolve("").is_none());
        assert!(resolve("LIST_ISSUES").is_none());
    }

    #[test]
    fn exactly_two_user_level_operations() {
        let user_ops: Vec<_> = OPERATIONS
            .iter()
            .filter(|op| op.scope == Scope::User)
            .map(|op| op.name)
            .collect();
        assert_eq!(user_ops, vec!["list_repositories", "create_repository"]);
    }

    #[test]
    fn repository_is_never_a_declared_parameter() {
        // The repository target is resolved by the dispatcher, not the
        // per-operation parameter sets.
        for op in &OPERATIONS {
            assert!(!op.required.contains(&"repository"), "{}", op.name);
            assert!(!op.optional.contains(&"repository"), "{}", op.name);
        }
    }
}
