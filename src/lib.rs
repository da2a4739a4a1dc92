//! Docs Relay - receives GitHub webhooks and triggers documentation syncs.
//!
//! This library provides the webhook verification, event filtering and sync
//! triggering logic behind the `docs-relay` binary.

pub mod config;
pub mod github;
pub mod relay;
pub mod server;
pub mod sync;
pub mod types;
pub mod webhooks;

#[cfg(test)]
mod test_utils;
