//! Patient records server - entry point
//!
//! Loads configuration, prepares the store, runs the one-time CSV import and
//! then serves the HTTP API until SIGINT/SIGTERM.

use anyhow::Context;
use clap::Parser;
use pacientes_server::{
    api::create_router, config::Config, logging, startup::run_startup_import, state::AppState,
};

#[derive(Debug, Parser)]
#[command(name = "pacientes-server", version, about = "Patient records REST API")]
struct Args {
    /// Configuration file (defaults to ./config.{yaml,toml,json} when present)
    #[arg(short, long)]
    config: Option<String>,

    /// Skip the startup CSV import regardless of `import.enabled`
    #[arg(long)]
    skip_import: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration first to get logging settings
    let mut config =
        Config::load_from(args.config.as_deref()).context("Failed to load configuration")?;
    if args.skip_import {
        config.import.enabled = false;
    }

    // Validate configuration
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _logging_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting patient records server");

    let addr = config
        .socket_addr()
        .context("Failed to determine socket address")?;

    tracing::info!(
        listen_addr = %addr,
        backend = ?config.database.backend,
        auth_enabled = config.auth.enabled,
        "Configuration loaded"
    );

    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;

    // Import before binding so no request sees a partial table
    if let Some(outcome) = run_startup_import(&state).await {
        tracing::debug!(?outcome, "Startup import finished");
    }

    let app = create_router(state);

    tracing::info!("Patient records server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener on {addr}"))?;

    // Run server with graceful shutdown
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server terminated unexpectedly");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
/// Docker sends SIGTERM, while Ctrl+C sends SIGINT
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("SIGINT received, starting graceful shutdown...");
            return;
        }
    };
    let sigint = tokio::signal::ctrl_c();

    tokio::select! {
        _ = sigint => {
            tracing::info!("SIGINT received, starting graceful shutdown...");
        }
        _ = sigterm.recv() => {
            tracing::info!("SIGTERM received, starting graceful shutdown...");
        }
    }
}

/// Wait for shutdown signal (SIGINT only on non-Unix platforms)
#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for CTRL+C");
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
