//! Relay configuration.
//!
//! Configuration is read once at startup and is immutable afterwards. It is
//! passed explicitly into [`crate::relay::Relay`] rather than read from the
//! environment at request time.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::{InvalidRepoId, RepoId, RuntimeEnv};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3001;

/// Repositories allowed to trigger a sync when `RELAY_ALLOWED_REPOS` is unset.
pub const DEFAULT_ALLOWED_REPOS: &[&str] = &["jurono/api", "jurono/backend"];

/// `event_type` sent with the `repository_dispatch` request.
pub const DEFAULT_DISPATCH_EVENT: &str = "api-docs-updated";

/// Branch whose pushes trigger a sync.
pub const DEFAULT_SYNC_BRANCH: &str = "main";

/// Script run by the local sync strategy.
pub const DEFAULT_SYNC_SCRIPT: &str = "./scripts/sync-from-api.sh";

/// Upper bound on a single sync attempt.
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 300;

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable held a value that could not be parsed.
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// A repository in the allow-list or dispatch target was malformed.
    #[error("invalid repository in {var}: {source}")]
    InvalidRepo {
        var: &'static str,
        #[source]
        source: InvalidRepoId,
    },

    /// The allow-list override was present but named no repositories.
    #[error("{0} is set but contains no repositories")]
    EmptyAllowList(&'static str),
}

/// Process-wide relay configuration.
#[derive(Clone)]
pub struct RelayConfig {
    /// Shared HMAC secret. `None` disables signature verification.
    pub webhook_secret: Option<Vec<u8>>,

    /// Repositories permitted to trigger a sync.
    pub allowed_repos: Vec<RepoId>,

    /// Token used for remote dispatch. `None` makes remote dispatch unavailable.
    pub github_token: Option<String>,

    /// Repository receiving the `repository_dispatch` event.
    pub dispatch_repo: RepoId,

    /// `event_type` of the `repository_dispatch` event.
    pub dispatch_event_type: String,

    /// Full ref (e.g. `refs/heads/main`) whose pushes trigger a sync.
    pub sync_branch_ref: String,

    /// Local script run by the fallback strategy.
    pub sync_script: PathBuf,

    /// Upper bound on a single sync attempt.
    pub sync_timeout: Duration,

    /// Runtime marker.
    pub runtime: RuntimeEnv,

    /// Listening port.
    pub port: u16,
}

impl RelayConfig {
    /// Creates a configuration with all defaults: no secret, no token,
    /// development runtime.
    pub fn new() -> Self {
        RelayConfig {
            webhook_secret: None,
            allowed_repos: DEFAULT_ALLOWED_REPOS
                .iter()
                .filter_map(|s| RepoId::parse(s).ok())
                .collect(),
            github_token: None,
            dispatch_repo: RepoId::new("jurono", "api-docs"),
            dispatch_event_type: DEFAULT_DISPATCH_EVENT.to_string(),
            sync_branch_ref: branch_ref(DEFAULT_SYNC_BRANCH),
            sync_script: PathBuf::from(DEFAULT_SYNC_SCRIPT),
            sync_timeout: Duration::from_secs(DEFAULT_SYNC_TIMEOUT_SECS),
            runtime: RuntimeEnv::Development,
            port: DEFAULT_PORT,
        }
    }

    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary lookup function.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::new();

        config.webhook_secret = get("WEBHOOK_SECRET").map(String::into_bytes);
        config.github_token = get("GITHUB_TOKEN").map(|t| t.trim().to_string());
        config.runtime = get("RELAY_ENV")
            .map(|m| RuntimeEnv::from_marker(&m))
            .unwrap_or_default();

        if let Some(port) = get("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                    var: "PORT",
                    value: port.clone(),
                    reason: e.to_string(),
                })?;
        }

        if let Some(repos) = get("RELAY_ALLOWED_REPOS") {
            config.allowed_repos = parse_repo_list("RELAY_ALLOWED_REPOS", &repos)?;
        }

        if let Some(repo) = get("RELAY_DISPATCH_REPO") {
            config.dispatch_repo =
                RepoId::parse(repo.trim()).map_err(|source| ConfigError::InvalidRepo {
                    var: "RELAY_DISPATCH_REPO",
                    source,
                })?;
        }

        if let Some(event) = get("RELAY_DISPATCH_EVENT") {
            config.dispatch_event_type = event.trim().to_string();
        }

        if let Some(branch) = get("RELAY_SYNC_BRANCH") {
            config.sync_branch_ref = branch_ref(branch.trim());
        }

        if let Some(script) = get("RELAY_SYNC_SCRIPT") {
            config.sync_script = PathBuf::from(script);
        }

        if let Some(secs) = get("RELAY_SYNC_TIMEOUT_SECS") {
            let parsed: u64 = secs.trim().parse().map_err(
                |e: std::num::ParseIntError| ConfigError::InvalidValue {
                    var: "RELAY_SYNC_TIMEOUT_SECS",
                    value: secs.clone(),
                    reason: e.to_string(),
                },
            )?;
            if parsed == 0 {
                return Err(ConfigError::InvalidValue {
                    var: "RELAY_SYNC_TIMEOUT_SECS",
                    value: secs,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.sync_timeout = Duration::from_secs(parsed);
        }

        Ok(config)
    }

    /// Returns true if `repo` is in the allow-list.
    pub fn is_allowed(&self, repo: &RepoId) -> bool {
        self.allowed_repos.contains(repo)
    }

    /// Returns true if signature verification is enabled.
    pub fn verification_enabled(&self) -> bool {
        self.webhook_secret.is_some()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new()
    }
}

// Secrets are never printed.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("allowed_repos", &self.allowed_repos)
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("dispatch_repo", &self.dispatch_repo)
            .field("dispatch_event_type", &self.dispatch_event_type)
            .field("sync_branch_ref", &self.sync_branch_ref)
            .field("sync_script", &self.sync_script)
            .field("sync_timeout", &self.sync_timeout)
            .field("runtime", &self.runtime)
            .field("port", &self.port)
            .finish()
    }
}

/// Expands a branch name into a full ref. Values already starting with
/// `refs/` are kept as-is.
fn branch_ref(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("refs/heads/{}", branch)
    }
}

fn parse_repo_list(var: &'static str, raw: &str) -> Result<Vec<RepoId>, ConfigError> {
    let repos = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| RepoId::parse(s).map_err(|source| ConfigError::InvalidRepo { var, source }))
        .collect::<Result<Vec<_>, _>>()?;

    if repos.is_empty() {
        return Err(ConfigError::EmptyAllowList(var));
    }
    Ok(repos)
}
