use axum::{serve, Router};
use database::Database;
use eyre::{Context, Result};
use settings::Settings;
use std::net::SocketAddr;
use storage::FileStorage;
use tokio::net::TcpListener;
use tokio::signal;

mod authentication;
pub mod database;
mod error;
mod handlers;
mod models;
mod router;
pub mod settings;
pub mod storage;

#[cfg(target_family = "unix")]
async fn shutdown_signal() {
    let term = signal::unix::signal(signal::unix::SignalKind::terminate());
    let interrupt = signal::unix::signal(signal::unix::SignalKind::interrupt());

    match (term, interrupt) {
        (Ok(mut term), Ok(mut interrupt)) => {
            tokio::select! {
                _ = term.recv() => {},
                _ = interrupt.recv() => {},
            };
        }
        (Err(err), _) | (_, Err(err)) => {
            tracing::error!("failed to register signal handler: {err}");
            std::future::pending::<()>().await;
        }
    }
    eprintln!("Shutting down gracefully...");
}

#[cfg(target_family = "windows")]
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("failed to register signal handler: {err}");
        std::future::pending::<()>().await;
    }
    eprintln!("Shutting down gracefully...");
}

pub async fn make_router(settings: &Settings, database: Database) -> Result<Router> {
    let storage = FileStorage::new(&settings.storage_path)?;
    Ok(router::router(database, storage))
}

pub async fn launch(settings: &Settings, address: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .context("Failed to connect to tcp listener")?;
    let database = Database::new(&settings.db_path).await?;
    let r = make_router(settings, database).await?;

    tracing::info!("Server started at {}", address);
    serve(listener, r.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
