//! Webhook endpoint handler.
//!
//! Hands the raw delivery to [`Relay::handle_webhook`] and turns its
//! [`WebhookResponse`] into an HTTP response. The body is taken as raw bytes
//! so the signature is checked against exactly what GitHub sent.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use super::AppState;
use crate::github::Dispatcher;
use crate::relay::{InboundEvent, Relay, WebhookResponse};

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Headers:
///   - `X-GitHub-Event`: Event type (e.g., "push", "release")
///   - `X-Hub-Signature-256`: HMAC-SHA256 signature (optional)
///   - `X-GitHub-Delivery`: Delivery ID (optional, logged only)
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK: Sync triggered, or the event was ignored
/// - 400 Bad Request: Body is not JSON
/// - 401 Unauthorized: Invalid signature
/// - 500 Internal Server Error: Sync failed
///
/// # Example
///
/// ```ignore
/// POST /webhook HTTP/1.1
/// X-GitHub-Event: push
/// X-Hub-Signature-256: sha256=...
/// Content-Type: application/json
///
/// {"ref": "refs/heads/main", "repository": {"full_name": "jurono/api", ...}}
///
/// HTTP/1.1 200 OK
///
/// {"message": "Sync triggered successfully", "success": true, "method": "remote-dispatch"}
/// ```
pub async fn webhook_handler<D>(
    State(app_state): State<AppState<D>>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResponse
where
    D: Dispatcher + Send + Sync + 'static,
{
    let relay: &Relay<D> = app_state.relay();
    relay.handle_webhook(&InboundEvent::new(headers, body)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;

    #[tokio::test]
    async fn webhook_response_renders_status_and_json() {
        let response = WebhookResponse {
            status: StatusCode::UNAUTHORIZED,
            body: json!({ "error": "Invalid signature" }),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed, json!({ "error": "Invalid signature" }));
    }
}
