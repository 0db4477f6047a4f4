//! `smd serve` – run the HTTP API.

use anyhow::Result;
use smd_core::config::SmdConfig;
use smd_core::Dispatcher;

use crate::http_api;

pub async fn run_serve(dispatcher: Dispatcher, cfg: &SmdConfig, listen: &str) -> Result<()> {
    let sweeper = dispatcher.tracker().spawn_sweeper(cfg.sweep_interval());
    tracing::debug!(
        retention_secs = cfg.retention_secs,
        download_dir = %dispatcher.settings().download_dir.display(),
        "starting API"
    );
    let served = http_api::serve(dispatcher, listen).await;
    sweeper.abort();
    served
}
