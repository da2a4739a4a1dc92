//! GitHub webhook event fields and the sync decision rule.
//!
//! The relay only needs a handful of fields from each delivery. They are
//! pulled out of the JSON leniently: a field that is missing or has an
//! unexpected type is treated as absent, so an odd payload is ignored rather
//! than rejected.
//!
//! # Events that trigger a sync
//!
//! - `push` to the configured branch ref
//! - `release` with action `published`
//! - `workflow_run` that concluded `success` and whose name contains `docs`

use std::fmt;

use serde_json::Value;

use crate::types::RepoId;

/// `X-GitHub-Event` value for branch and tag pushes.
pub const EVENT_PUSH: &str = "push";
/// `X-GitHub-Event` value for release activity.
pub const EVENT_RELEASE: &str = "release";
/// `X-GitHub-Event` value for completed workflow runs.
pub const EVENT_WORKFLOW_RUN: &str = "workflow_run";

/// Substring a workflow name must contain to count as a docs workflow.
pub const DOCS_WORKFLOW_MARKER: &str = "docs";

/// The fields of a webhook payload the relay looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPayload {
    /// `repository.full_name`.
    pub repository: Option<String>,
    /// `ref` (push events).
    pub git_ref: Option<String>,
    /// `action` (release events, among others).
    pub action: Option<String>,
    /// `workflow_run.conclusion`.
    pub workflow_conclusion: Option<String>,
    /// `workflow_run.name`.
    pub workflow_name: Option<String>,
}

impl EventPayload {
    /// Extracts the relevant fields from a parsed webhook body.
    pub fn from_json(body: &Value) -> Self {
        let str_at = |pointer: &str| {
            body.pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        EventPayload {
            repository: str_at("/repository/full_name"),
            git_ref: str_at("/ref"),
            action: str_at("/action"),
            workflow_conclusion: str_at("/workflow_run/conclusion"),
            workflow_name: str_at("/workflow_run/name"),
        }
    }

    /// Returns the source repository, if present and well-formed.
    pub fn repo_id(&self) -> Option<RepoId> {
        self.repository
            .as_deref()
            .and_then(|name| RepoId::parse(name).ok())
    }
}

/// Why an event warrants a documentation sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncReason {
    /// A push landed on the sync branch.
    PushToBranch { git_ref: String },
    /// A release was published.
    ReleasePublished,
    /// A docs workflow finished successfully.
    DocsWorkflowSucceeded { workflow: String },
}

impl fmt::Display for SyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncReason::PushToBranch { git_ref } => write!(f, "push to {}", git_ref),
            SyncReason::ReleasePublished => write!(f, "release published"),
            SyncReason::DocsWorkflowSucceeded { workflow } => {
                write!(f, "workflow {:?} succeeded", workflow)
            }
        }
    }
}

/// Decides whether an event warrants a sync.
///
/// Returns `None` for every event that does not match one of the rules in the
/// module documentation. Event type matching is exact.
pub fn sync_reason(
    event_type: &str,
    payload: &EventPayload,
    sync_branch_ref: &str,
) -> Option<SyncReason> {
    match event_type {
        EVENT_PUSH => payload
            .git_ref
            .as_deref()
            .filter(|r| *r == sync_branch_ref)
            .map(|r| SyncReason::PushToBranch {
                git_ref: r.to_string(),
            }),
        EVENT_RELEASE => (payload.action.as_deref() == Some("published"))
            .then_some(SyncReason::ReleasePublished),
        EVENT_WORKFLOW_RUN => {
            let succeeded = payload.workflow_conclusion.as_deref() == Some("success");
            let name = payload.workflow_name.as_deref()?;
            (succeeded && name.contains(DOCS_WORKFLOW_MARKER)).then(|| {
                SyncReason::DocsWorkflowSucceeded {
                    workflow: name.to_string(),
                }
            })
        }
        _ => None,
    }
}
