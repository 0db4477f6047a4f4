//! HTTP API over the dispatcher (axum).

mod error;
mod handlers;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use smd_core::Dispatcher;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/download/{platform}", post(handlers::start_download))
        .route("/progress/{job_id}", get(handlers::get_progress))
        .route("/info", post(handlers::get_info))
        .route("/download_file/{job_id}", get(handlers::download_file))
        .route("/cancel/{job_id}", post(handlers::cancel_download))
        .route("/jobs", get(handlers::list_jobs))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Serves the API on `listen` until Ctrl+C.
pub async fn serve(dispatcher: Dispatcher, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("binding to {listen}"))?;
    let addr = listener.local_addr().context("reading bound address")?;
    tracing::info!(%addr, "HTTP API listening");
    println!("smd API listening on http://{addr}");

    axum::serve(listener, router(AppState { dispatcher }))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running API server")?;
    tracing::info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
