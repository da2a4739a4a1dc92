//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Extraction of the payload fields the relay acts on
//! - The rule deciding which events trigger a documentation sync

pub mod events;
pub mod signature;

pub use events::{EventPayload, SyncReason, sync_reason};
pub use signature::{
    SignatureError, compute_signature, format_signature_header, parse_signature_header,
    verify_signature,
};

/// Header carrying the event type.
pub const HEADER_EVENT: &str = "x-github-event";
/// Header carrying the delivery ID.
pub const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header carrying the HMAC-SHA256 signature.
pub const HEADER_SIGNATURE: &str = "x-hub-signature-256";
