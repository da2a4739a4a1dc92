//! GitHub API client used for remote workflow dispatch.
//!
//! Key features:
//! - Repository-scoped octocrab client authenticated with a token
//! - `repository_dispatch` request type and the [`Dispatcher`] seam
//! - Errors that keep the HTTP status GitHub answered with

mod client;
mod dispatch;
mod error;

pub use client::OctocrabClient;
pub use dispatch::{ClientPayload, DispatchRequest, Dispatcher};
pub use error::DispatchError;
