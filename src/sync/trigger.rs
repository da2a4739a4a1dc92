//! Executes a [`SyncPlan`] and reports a [`SyncResult`].

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::github::{DispatchRequest, Dispatcher};
use crate::types::{RepoId, RuntimeEnv};

use super::local::run_sync_script;
use super::{NO_SYNC_METHOD, SyncError, SyncPlan, SyncResult, SyncStrategy};

/// Triggers documentation syncs.
///
/// Holds everything the strategies need; immutable after construction.
pub struct SyncTrigger<D> {
    dispatcher: Option<D>,
    dispatch_event_type: String,
    sync_script: PathBuf,
    sync_timeout: Duration,
    runtime: RuntimeEnv,
}

impl<D: Dispatcher> SyncTrigger<D> {
    /// Builds a trigger from configuration.
    ///
    /// `dispatcher` should be `Some` exactly when a dispatch token is configured.
    pub fn new(config: &RelayConfig, dispatcher: Option<D>) -> Self {
        SyncTrigger {
            dispatcher,
            dispatch_event_type: config.dispatch_event_type.clone(),
            sync_script: config.sync_script.clone(),
            sync_timeout: config.sync_timeout,
            runtime: config.runtime,
        }
    }

    /// The strategies this trigger will attempt, in order.
    pub fn plan(&self) -> SyncPlan {
        SyncPlan::select(self.dispatcher.is_some(), self.runtime)
    }

    /// Triggers a sync for an event from `repository`.
    ///
    /// Strategies are attempted in plan order and the first success wins.
    /// A failure that [ends the plan](SyncError::ends_plan) stops the walk.
    /// Every failure is folded into the returned [`SyncResult`]; nothing is
    /// retried.
    pub async fn trigger(&self, event_type: &str, repository: &RepoId) -> SyncResult {
        let plan = self.plan();

        info!(
            repository = %repository,
            event_type = %event_type,
            strategies = ?plan.strategies(),
            "Triggering docs sync"
        );

        if plan.is_empty() {
            warn!(
                runtime = %self.runtime,
                "No sync method available (no dispatch token, local sync disabled)"
            );
            return SyncResult::failed(NO_SYNC_METHOD);
        }

        let mut last_error = None;
        for &strategy in plan.strategies() {
            match self.attempt(strategy, event_type, repository).await {
                Ok(()) => {
                    info!(
                        repository = %repository,
                        method = %strategy,
                        "Docs sync triggered"
                    );
                    return SyncResult::succeeded(strategy);
                }
                Err(e) => {
                    warn!(
                        repository = %repository,
                        method = %strategy,
                        error = %e,
                        "Sync strategy failed"
                    );
                    let ends_plan = e.ends_plan();
                    last_error = Some(e);
                    if ends_plan {
                        break;
                    }
                }
            }
        }

        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| NO_SYNC_METHOD.to_string());
        SyncResult::failed(message)
    }

    async fn attempt(
        &self,
        strategy: SyncStrategy,
        event_type: &str,
        repository: &RepoId,
    ) -> Result<(), SyncError> {
        let timed_out = || SyncError::TimedOut {
            strategy,
            after: self.sync_timeout,
        };

        match strategy {
            SyncStrategy::RemoteDispatch => {
                let dispatcher = self
                    .dispatcher
                    .as_ref()
                    .ok_or(SyncError::Unavailable(strategy))?;
                let request = DispatchRequest::new(
                    self.dispatch_event_type.clone(),
                    repository,
                    event_type,
                    Utc::now(),
                );
                timeout(self.sync_timeout, dispatcher.dispatch(&request))
                    .await
                    .map_err(|_| timed_out())??;
            }
            SyncStrategy::LocalScript => {
                timeout(self.sync_timeout, run_sync_script(&self.sync_script))
                    .await
                    .map_err(|_| timed_out())??;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeDispatcher;

    fn config(runtime: RuntimeEnv, script: &str) -> RelayConfig {
        let mut config = RelayConfig::new();
        config.runtime = runtime;
        config.sync_script = PathBuf::from(script);
        config.sync_timeout = Duration::from_secs(10);
        config
    }

    fn repo() -> RepoId {
        RepoId::new("jurono", "api")
    }

    #[tokio::test]
    async fn remote_dispatch_success() {
        let fake = FakeDispatcher::succeeding();
        let trigger = SyncTrigger::new(&config(RuntimeEnv::Production, "false"), Some(fake.clone()));

        let result = trigger.trigger("push", &repo()).await;

        assert_eq!(result, SyncResult::succeeded(SyncStrategy::RemoteDispatch));
        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].event_type, "api-docs-updated");
        assert_eq!(requests[0].client_payload.source_repo, "jurono/api");
        assert_eq!(requests[0].client_payload.event_type, "push");
    }

    #[tokio::test]
    async fn remote_failure_in_production_does_not_fall_back() {
        let fake = FakeDispatcher::failing(401);
        // `true` would succeed if the local strategy were attempted.
        let trigger = SyncTrigger::new(&config(RuntimeEnv::Production, "true"), Some(fake.clone()));

        let result = trigger.trigger("push", &repo()).await;

        assert!(!result.success);
        assert_eq!(result.method, None);
        assert!(result.error.unwrap().contains("401"));
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn remote_failure_in_development_falls_back_to_local() {
        let fake = FakeDispatcher::failing(500);
        let trigger =
            SyncTrigger::new(&config(RuntimeEnv::Development, "true"), Some(fake.clone()));

        let result = trigger.trigger("release", &repo()).await;

        assert_eq!(result, SyncResult::succeeded(SyncStrategy::LocalScript));
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn unreachable_dispatch_in_development_does_not_fall_back() {
        let fake = FakeDispatcher::unreachable();
        // `true` would succeed if the local strategy were attempted.
        let trigger =
            SyncTrigger::new(&config(RuntimeEnv::Development, "true"), Some(fake.clone()));

        let result = trigger.trigger("push", &repo()).await;

        assert!(!result.success);
        assert_eq!(result.method, None);
        assert!(result.error.unwrap().contains("connection refused"));
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn hung_dispatch_in_development_does_not_fall_back() {
        let fake = FakeDispatcher::hanging();
        let mut cfg = config(RuntimeEnv::Development, "true");
        cfg.sync_timeout = Duration::from_millis(50);
        let trigger = SyncTrigger::new(&cfg, Some(fake.clone()));

        let result = trigger.trigger("push", &repo()).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn both_strategies_failing_reports_last_error() {
        let fake = FakeDispatcher::failing(500);
        let trigger =
            SyncTrigger::new(&config(RuntimeEnv::Development, "false"), Some(fake.clone()));

        let result = trigger.trigger("push", &repo()).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("exited unsuccessfully"));
    }

    #[tokio::test]
    async fn local_only_without_token() {
        let trigger: SyncTrigger<FakeDispatcher> =
            SyncTrigger::new(&config(RuntimeEnv::Development, "true"), None);

        let result = trigger.trigger("push", &repo()).await;

        assert_eq!(result, SyncResult::succeeded(SyncStrategy::LocalScript));
    }

    #[tokio::test]
    async fn local_script_failure() {
        let trigger: SyncTrigger<FakeDispatcher> =
            SyncTrigger::new(&config(RuntimeEnv::Development, "false"), None);

        let result = trigger.trigger("push", &repo()).await;

        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn nothing_available_in_production_without_token() {
        let trigger: SyncTrigger<FakeDispatcher> =
            SyncTrigger::new(&config(RuntimeEnv::Production, "true"), None);

        let result = trigger.trigger("push", &repo()).await;

        assert_eq!(result, SyncResult::failed(NO_SYNC_METHOD));
    }

    #[tokio::test]
    async fn hung_dispatch_times_out() {
        let fake = FakeDispatcher::hanging();
        let mut cfg = config(RuntimeEnv::Production, "true");
        cfg.sync_timeout = Duration::from_millis(50);
        let trigger = SyncTrigger::new(&cfg, Some(fake.clone()));

        let result = trigger.trigger("push", &repo()).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("timed out"));
        assert_eq!(fake.call_count(), 1);
    }
}
