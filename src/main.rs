use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docs_relay::config::RelayConfig;
use docs_relay::github::OctocrabClient;
use docs_relay::relay::Relay;
use docs_relay::server::{AppState, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docs_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayConfig::from_env().context("invalid relay configuration")?;

    if !config.verification_enabled() {
        warn!("WEBHOOK_SECRET is not set; webhook signatures will not be verified");
    }

    let dispatcher = match &config.github_token {
        Some(token) => Some(
            OctocrabClient::from_token(token.clone(), config.dispatch_repo.clone())
                .context("failed to build GitHub client")?,
        ),
        None => {
            info!("GITHUB_TOKEN is not set; remote dispatch disabled");
            None
        }
    };

    info!(
        runtime = %config.runtime,
        dispatch_repo = %config.dispatch_repo,
        allowed_repos = config.allowed_repos.len(),
        "Starting docs relay"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = build_router(AppState::new(Relay::new(config, dispatcher)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on {}", addr);
    info!("webhook endpoint: http://{}/webhook", addr);
    info!("health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Docs relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
