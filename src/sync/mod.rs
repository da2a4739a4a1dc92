//! Documentation sync strategies.
//!
//! A sync is triggered in one of two ways:
//!
//! - [`SyncStrategy::RemoteDispatch`]: start the docs workflow through
//!   GitHub's `repository_dispatch` API. Available whenever a token is
//!   configured.
//! - [`SyncStrategy::LocalScript`]: run the sync script on this machine.
//!   Never available in production.
//!
//! [`SyncPlan::select`] is a pure function from configuration to the ordered
//! list of strategies to attempt. [`SyncTrigger`] walks that list until one
//! strategy succeeds, and always produces a [`SyncResult`].

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::github::DispatchError;
use crate::types::RuntimeEnv;

pub mod local;
pub mod trigger;

pub use local::{LocalSyncError, run_sync_script};
pub use trigger::SyncTrigger;

/// Error message reported when the plan is empty.
pub const NO_SYNC_METHOD: &str = "No sync method available";

/// A way of triggering a documentation sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStrategy {
    /// Dispatch a remote workflow.
    RemoteDispatch,
    /// Run the local sync script.
    #[serde(rename = "local-sync")]
    LocalScript,
}

impl fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStrategy::RemoteDispatch => write!(f, "remote-dispatch"),
            SyncStrategy::LocalScript => write!(f, "local-sync"),
        }
    }
}

/// Ordered strategies to attempt for one sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    strategies: Vec<SyncStrategy>,
}

impl SyncPlan {
    /// Chooses strategies from what is configured.
    ///
    /// Remote dispatch comes first when a token is available. The local
    /// script follows outside production, so it runs either on its own or
    /// after a dispatch GitHub rejected (see [`SyncError::ends_plan`]).
    pub fn select(remote_available: bool, runtime: RuntimeEnv) -> Self {
        let mut strategies = Vec::with_capacity(2);
        if remote_available {
            strategies.push(SyncStrategy::RemoteDispatch);
        }
        if !runtime.is_production() {
            strategies.push(SyncStrategy::LocalScript);
        }
        SyncPlan { strategies }
    }

    pub fn strategies(&self) -> &[SyncStrategy] {
        &self.strategies
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Outcome of a sync attempt, returned to the webhook sender.
///
/// Serializes as `{"success": true, "method": "remote-dispatch"}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<SyncStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    pub fn succeeded(method: SyncStrategy) -> Self {
        SyncResult {
            success: true,
            method: Some(method),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        SyncResult {
            success: false,
            method: None,
            error: Some(error.into()),
        }
    }
}

/// Why a single strategy failed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The dispatch request failed or was rejected.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The local script could not be run or exited unsuccessfully.
    #[error(transparent)]
    Local(#[from] LocalSyncError),

    /// The strategy did not finish in time.
    #[error("{strategy} timed out after {after:?}")]
    TimedOut {
        strategy: SyncStrategy,
        after: Duration,
    },

    /// The strategy was planned but its backing client is missing.
    #[error("{0} is not configured")]
    Unavailable(SyncStrategy),
}

impl SyncError {
    /// Returns true if no further strategy should be attempted after this one.
    ///
    /// A dispatch GitHub answered with an error status falls through to the
    /// next strategy. A dispatch that never got an answer (transport error or
    /// timeout) ends the plan.
    pub fn ends_plan(&self) -> bool {
        match self {
            SyncError::Dispatch(e) => e.status_code.is_none(),
            SyncError::TimedOut { strategy, .. } => *strategy == SyncStrategy::RemoteDispatch,
            SyncError::Local(_) | SyncError::Unavailable(_) => false,
        }
    }
}
