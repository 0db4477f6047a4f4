//! `smd get` – download one item in-process, printing progress as it changes.

use anyhow::{bail, Result};
use smd_core::config::SmdConfig;
use smd_core::{reporter, Dispatcher, JobStatus};

pub async fn run_get(
    dispatcher: &Dispatcher,
    cfg: &SmdConfig,
    platform: &str,
    content_type: &str,
    url: &str,
    format: Option<&str>,
) -> Result<()> {
    let job_id = dispatcher.submit(platform, content_type, url, format)?;
    println!("job {job_id}");

    let poll = reporter::poll_until_terminal(
        dispatcher.tracker(),
        job_id,
        cfg.poll_interval(),
        |job| println!("  {}", reporter::render_line(job)),
    );
    tokio::pin!(poll);

    let job = tokio::select! {
        job = &mut poll => job?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(job_id = %job_id, "interrupted, cancelling");
            let job = match dispatcher.cancel(job_id) {
                Ok(job) => job,
                // finished while the signal was in flight
                Err(_) => dispatcher.tracker().get_status(job_id)?,
            };
            println!("  {}", reporter::render_line(&job));
            // let the fetcher remove its partial artifact before the process exits
            if !dispatcher.wait_settled(job_id).await {
                tracing::warn!(job_id = %job_id, "fetcher still running at exit");
            }
            job
        }
    };

    match job.status {
        JobStatus::Completed => {
            if let Some(artifact) = dispatcher.tracker().completed_artifact(job_id)? {
                println!("saved to {}", artifact.path.display());
            }
            Ok(())
        }
        _ => bail!(
            "download failed: {}",
            job.error.as_deref().unwrap_or("unknown error")
        ),
    }
}
