//! Remote workflow dispatch via GitHub's `repository_dispatch` API.
//!
//! The request starts any workflow in the target repository listening on
//! `repository_dispatch` with a matching `event_type`. GitHub answers
//! `204 No Content` on success.

use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::types::RepoId;

use super::client::OctocrabClient;
use super::error::DispatchError;

/// Sends dispatch requests to a remote automation pipeline.
///
/// The production implementation is [`OctocrabClient`]. Tests substitute a
/// recording fake.
pub trait Dispatcher {
    /// Sends a single dispatch request. Success means the remote endpoint
    /// returned an HTTP success status.
    fn dispatch(
        &self,
        request: &DispatchRequest,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

/// Body of a `POST /repos/{owner}/{repo}/dispatches` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchRequest {
    /// Event type the target workflow listens for.
    pub event_type: String,

    /// Free-form payload made available to the workflow.
    pub client_payload: ClientPayload,
}

/// Payload describing what triggered the dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientPayload {
    /// `owner/repo` the webhook came from.
    pub source_repo: String,

    /// The webhook event type (e.g. `push`).
    pub event_type: String,

    /// When the relay sent the dispatch, RFC 3339 in UTC.
    pub timestamp: String,
}

impl DispatchRequest {
    pub fn new(
        dispatch_event_type: impl Into<String>,
        source_repo: &RepoId,
        webhook_event_type: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        DispatchRequest {
            event_type: dispatch_event_type.into(),
            client_payload: ClientPayload {
                source_repo: source_repo.full_name(),
                event_type: webhook_event_type.into(),
                timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        }
    }
}

impl Dispatcher for OctocrabClient {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        let route = format!("/repos/{}/{}/dispatches", self.owner(), self.repo_name());

        debug!(
            target_repo = %self.repo(),
            event_type = %request.event_type,
            "Sending repository_dispatch"
        );

        // The endpoint replies 204 with an empty body, so go through the raw
        // response API instead of a deserialising helper.
        let response = self
            .inner()
            ._post(route.as_str(), Some(request))
            .await
            .map_err(DispatchError::from_octocrab)?;

        octocrab::map_github_error(response)
            .await
            .map_err(DispatchError::from_octocrab)?;

        Ok(())
    }
}
