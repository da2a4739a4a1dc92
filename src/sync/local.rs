//! Local sync script execution.
//!
//! The script inherits the relay's working directory and standard streams so
//! its output ends up next to the relay's own logs.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Errors from running the local sync script.
#[derive(Debug, Error)]
pub enum LocalSyncError {
    /// The script could not be started (missing, not executable, ...).
    #[error("failed to run {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The script ran but did not exit successfully.
    #[error("{} exited unsuccessfully: {status}", path.display())]
    Failed { path: PathBuf, status: ExitStatus },
}

/// Runs the sync script and waits for it to exit.
///
/// The child is killed if the returned future is dropped, so wrapping this in
/// `tokio::time::timeout` bounds the script's lifetime too.
pub async fn run_sync_script(path: &Path) -> Result<(), LocalSyncError> {
    debug!(script = %path.display(), "Running local sync script");

    let status = Command::new(path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|source| LocalSyncError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;

    if !status.success() {
        return Err(LocalSyncError::Failed {
            path: path.to_path_buf(),
            status,
        });
    }

    info!(script = %path.display(), "Local sync script completed");
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    // `true` and `false` from PATH stand in for the sync script; executing a
    // freshly written file races with forks in other test threads (ETXTBSY).

    #[tokio::test]
    async fn successful_script() {
        run_sync_script(Path::new("true")).await.unwrap();
    }

    #[tokio::test]
    async fn non_zero_exit_is_failure() {
        let err = run_sync_script(Path::new("false")).await.unwrap_err();
        match err {
            LocalSyncError::Failed { status, .. } => assert_eq!(status.code(), Some(1)),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_script_is_spawn_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist.sh");

        let err = run_sync_script(&missing).await.unwrap_err();
        assert!(matches!(err, LocalSyncError::Spawn { .. }));
        assert!(err.to_string().contains("does-not-exist.sh"));
    }

    #[tokio::test]
    async fn non_executable_script_is_spawn_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.sh");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = run_sync_script(&path).await.unwrap_err();
        assert!(matches!(err, LocalSyncError::Spawn { .. }));
    }
}
