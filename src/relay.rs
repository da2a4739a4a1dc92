//! The webhook relay: authenticate, filter, trigger.
//!
//! [`Relay::handle_webhook`] runs the whole decision sequence for one
//! delivery and is independent of the HTTP framework. Each request is handled
//! on its own; the relay holds no mutable state.
//!
//! # Decision sequence
//!
//! 1. Verify `X-Hub-Signature-256` if present (401 on failure)
//! 2. Parse the body (400 if it is not JSON)
//! 3. Ignore repositories outside the allow-list (200)
//! 4. Ignore events that do not warrant a sync (200)
//! 5. Trigger the sync (200 on success, 500 on failure)

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::github::Dispatcher;
use crate::sync::{SyncResult, SyncTrigger};
use crate::types::{DeliveryId, RepoId};
use crate::webhooks::{
    EventPayload, HEADER_DELIVERY, HEADER_EVENT, HEADER_SIGNATURE, SignatureError, sync_reason,
    verify_signature,
};

/// An incoming webhook delivery.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub headers: HeaderMap,
    /// Raw body bytes, exactly as received. The signature covers these.
    pub body: Bytes,
}

impl InboundEvent {
    pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        InboundEvent {
            headers,
            body: body.into(),
        }
    }

    /// Returns a header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A status code and JSON body, ready to hand to the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// How a delivery that passed authentication was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The source repository is not in the allow-list (or was missing).
    RepositoryNotAllowed,
    /// The event does not warrant a sync.
    EventIgnored,
    /// A sync was triggered; the result says whether it worked.
    Synced(SyncResult),
}

impl WebhookOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookOutcome::Synced(result) if !result.success => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            WebhookOutcome::RepositoryNotAllowed => {
                json!({ "message": "Repository not in allowed list" })
            }
            WebhookOutcome::EventIgnored => json!({ "message": "Event ignored" }),
            WebhookOutcome::Synced(result) => {
                let message = if result.success {
                    "Sync triggered successfully"
                } else {
                    "Sync failed"
                };
                let mut body = json!({ "message": message });
                if let (Value::Object(map), Ok(Value::Object(extra))) =
                    (&mut body, serde_json::to_value(result))
                {
                    map.extend(extra);
                }
                body
            }
        }
    }
}

/// A delivery rejected before any sync decision was made.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The signature did not match, or could not be parsed.
    #[error("Invalid signature")]
    InvalidSignature(#[source] Option<SignatureError>),

    /// The body is not JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidJson(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn body(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<Result<WebhookOutcome, WebhookError>> for WebhookResponse {
    fn from(result: Result<WebhookOutcome, WebhookError>) -> Self {
        match result {
            Ok(outcome) => WebhookResponse {
                status: outcome.status(),
                body: outcome.body(),
            },
            Err(err) => WebhookResponse {
                status: err.status(),
                body: err.body(),
            },
        }
    }
}

/// The webhook relay.
pub struct Relay<D> {
    config: RelayConfig,
    sync: SyncTrigger<D>,
}

impl<D: Dispatcher> Relay<D> {
    /// Creates a relay. `dispatcher` should be `Some` exactly when
    /// `config.github_token` is set.
    pub fn new(config: RelayConfig, dispatcher: Option<D>) -> Self {
        let sync = SyncTrigger::new(&config, dispatcher);
        Relay { config, sync }
    }

    /// Handles one delivery and flattens the outcome into a response.
    pub async fn handle_webhook(&self, event: &InboundEvent) -> WebhookResponse {
        self.process(event).await.into()
    }

    /// Handles one delivery, keeping the typed outcome.
    pub async fn process(&self, event: &InboundEvent) -> Result<WebhookOutcome, WebhookError> {
        let delivery_id = event
            .header(HEADER_DELIVERY)
            .map(DeliveryId::new)
            .unwrap_or_else(DeliveryId::unknown);
        let event_type = event.header(HEADER_EVENT).unwrap_or_default();

        debug!(
            delivery_id = %delivery_id,
            event_type = %event_type,
            "Received webhook"
        );

        self.authenticate(event, &delivery_id)?;

        let body: Value = serde_json::from_slice(&event.body)?;
        let payload = EventPayload::from_json(&body);

        let Some(repository) = self.allowed_repository(&payload) else {
            info!(
                delivery_id = %delivery_id,
                repository = payload.repository.as_deref().unwrap_or("<none>"),
                "Ignoring event (repository not in allowed list)"
            );
            return Ok(WebhookOutcome::RepositoryNotAllowed);
        };

        let Some(reason) = sync_reason(event_type, &payload, &self.config.sync_branch_ref) else {
            info!(
                delivery_id = %delivery_id,
                repository = %repository,
                event_type = %event_type,
                "Event does not require docs sync"
            );
            return Ok(WebhookOutcome::EventIgnored);
        };

        info!(
            delivery_id = %delivery_id,
            repository = %repository,
            reason = %reason,
            "Event requires docs sync"
        );

        let result = self.sync.trigger(event_type, &repository).await;
        Ok(WebhookOutcome::Synced(result))
    }

    /// Verifies the signature header when one was sent.
    ///
    /// A delivery without a signature header is accepted even when a secret
    /// is configured; that case is logged at `warn`.
    fn authenticate(
        &self,
        event: &InboundEvent,
        delivery_id: &DeliveryId,
    ) -> Result<(), WebhookError> {
        let secret = self.config.webhook_secret.as_deref();

        let Some(signature) = event.headers.get(HEADER_SIGNATURE) else {
            if secret.is_some() {
                warn!(
                    delivery_id = %delivery_id,
                    "Webhook has no signature header; processing without verification"
                );
            }
            return Ok(());
        };

        // A header that is not valid UTF-8 cannot be a well-formed signature.
        let signature = signature
            .to_str()
            .map_err(|_| WebhookError::InvalidSignature(Some(SignatureError::MissingPrefix)))?;

        match verify_signature(&event.body, signature, secret) {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!(delivery_id = %delivery_id, "Invalid webhook signature");
                Err(WebhookError::InvalidSignature(None))
            }
            Err(e) => {
                warn!(delivery_id = %delivery_id, error = %e, "Malformed webhook signature");
                Err(WebhookError::InvalidSignature(Some(e)))
            }
        }
    }

    fn allowed_repository(&self, payload: &EventPayload) -> Option<RepoId> {
        payload
            .repo_id()
            .filter(|repo| self.config.is_allowed(repo))
    }
}
