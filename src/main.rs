// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use event_auth_server::{
    api::router,
    auth::{AuthResolver, TokenCodec},
    config::Config,
    logging,
    revocation::{RedisSetStore, RevocationStore, RevocationSweeper},
    state::AppState,
    store::InMemoryDirectory,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let codec = Arc::new(TokenCodec::new(&config.token)?);
    info!(
        algorithm = ?codec.algorithm(),
        expiry_policy = ?codec.expiry_policy(),
        "Token codec ready"
    );

    let sets = Arc::new(RedisSetStore::connect(&config.revocation.redis_url).await?);
    let revocation = Arc::new(
        RevocationStore::new(sets, codec.clone()).with_settings(&config.revocation),
    );
    info!(
        timeout_ms = config.revocation.timeout.as_millis() as u64,
        "Connected to revocation store"
    );

    let directory = Arc::new(match &config.directory_seed {
        Some(path) => InMemoryDirectory::load(path)?,
        None => InMemoryDirectory::new(),
    });
    info!(users = directory.user_count().await, "Directory loaded");

    let resolver = Arc::new(AuthResolver::new(codec, revocation.clone()));
    let state = AppState::new(resolver, directory.clone(), directory);
    let app = router(state);

    let shutdown = CancellationToken::new();
    let sweeper = config.revocation.sweep_interval.map(|interval| {
        tokio::spawn(RevocationSweeper::new(revocation.clone(), interval).run(shutdown.clone()))
    });

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Event auth server listening (docs at /docs)");

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_signal().await;
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Some(handle) = sweeper {
        let _ = handle.await;
    }
    info!("Server stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
