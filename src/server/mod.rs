//! HTTP server for the docs relay.
//!
//! This module implements the HTTP server that:
//! - Accepts webhooks from GitHub and triggers documentation syncs
//! - Provides health checks for liveness probes
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries
//! - `GET /health` - Returns 200 with a timestamp if the server is running
//!
//! A panic while handling a request is caught and answered with
//! `500 {"error": "Internal server error"}`.

use std::any::Any;
use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::github::Dispatcher;
use crate::relay::Relay;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. The relay
/// inside is immutable, so cloning only bumps a reference count.
pub struct AppState<D> {
    inner: Arc<Relay<D>>,
}

impl<D> Clone for AppState<D> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> AppState<D> {
    pub fn new(relay: Relay<D>) -> Self {
        AppState {
            inner: Arc::new(relay),
        }
    }

    /// Returns the relay.
    pub fn relay(&self) -> &Relay<D> {
        &self.inner
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<D>(app_state: AppState<D>) -> axum::Router
where
    D: Dispatcher + Send + Sync + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<D>))
        .route("/health", get(health_handler))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}
