//! Shared test utilities: a recording dispatcher and request builders.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::Request;

use crate::github::{DispatchError, DispatchRequest, Dispatcher};
use crate::webhooks::{
    HEADER_DELIVERY, HEADER_EVENT, HEADER_SIGNATURE, compute_signature, format_signature_header,
};

#[derive(Debug, Clone, Copy)]
enum FakeOutcome {
    Succeed,
    Fail(u16),
    Unreachable,
    Hang,
}

/// A [`Dispatcher`] that records every request and answers with a fixed outcome.
#[derive(Debug, Clone)]
pub struct FakeDispatcher {
    outcome: FakeOutcome,
    requests: Arc<Mutex<Vec<DispatchRequest>>>,
}

impl FakeDispatcher {
    fn with_outcome(outcome: FakeOutcome) -> Self {
        FakeDispatcher {
            outcome,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding() -> Self {
        Self::with_outcome(FakeOutcome::Succeed)
    }

    /// Every dispatch is rejected with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self::with_outcome(FakeOutcome::Fail(status))
    }

    /// Every dispatch fails without an HTTP reply.
    pub fn unreachable() -> Self {
        Self::with_outcome(FakeOutcome::Unreachable)
    }

    /// Every dispatch never completes.
    pub fn hanging() -> Self {
        Self::with_outcome(FakeOutcome::Hang)
    }

    pub fn requests(&self) -> Vec<DispatchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Dispatcher for FakeDispatcher {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        self.requests.lock().unwrap().push(request.clone());

        match self.outcome {
            FakeOutcome::Succeed => Ok(()),
            FakeOutcome::Fail(status) => Err(DispatchError::without_source(
                Some(status),
                "rejected by fake dispatcher",
            )),
            FakeOutcome::Unreachable => Err(DispatchError::without_source(
                None,
                "connection refused",
            )),
            FakeOutcome::Hang => std::future::pending().await,
        }
    }
}

/// Builds a `POST /webhook` request. The body is signed with `secret` when given.
pub fn webhook_request(
    secret: Option<&[u8]>,
    event_type: &str,
    body: &serde_json::Value,
) -> Request<Body> {
    let body_bytes = serde_json::to_vec(body).unwrap();

    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header(HEADER_EVENT, event_type)
        .header(HEADER_DELIVERY, "72d3162e-cc78-11e3-81ab-4c9367dc0958");

    if let Some(secret) = secret {
        let signature = compute_signature(&body_bytes, secret);
        builder = builder.header(HEADER_SIGNATURE, format_signature_header(&signature));
    }

    builder.body(Body::from(body_bytes)).unwrap()
}

/// A `push` payload for `repository` targeting `git_ref`.
pub fn push_payload(repository: &str, git_ref: &str) -> serde_json::Value {
    serde_json::json!({
        "ref": git_ref,
        "repository": {
            "full_name": repository,
            "name": repository.split('/').nth(1).unwrap_or(repository),
        }
    })
}
