//! Health check endpoint for liveness probes.

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Body of a `GET /health` response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// Current time, RFC 3339 in UTC with millisecond precision.
    pub timestamp: String,
}

/// Health check handler.
///
/// Always returns 200 OK while the server is accepting connections.
///
/// # Example
///
/// ```ignore
/// GET /health HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// {"status":"ok","timestamp":"2024-03-01T12:30:00.000Z"}
/// ```
pub async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
