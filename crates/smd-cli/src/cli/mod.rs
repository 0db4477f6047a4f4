//! CLI for smd.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use smd_core::config::{self, SmdConfig};
use smd_core::fetcher::FetcherRegistry;
use smd_core::{Dispatcher, JobTracker};
use std::path::PathBuf;

use commands::{run_get, run_info, run_platforms, run_serve};

/// Top-level CLI for smd.
#[derive(Debug, Parser)]
#[command(name = "smd")]
#[command(about = "smd: social media download service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the HTTP API until Ctrl+C.
    Serve {
        /// Address to bind (overrides listen_addr from config).
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Download one item in-process and show its progress.
    Get {
        /// Platform: facebook, instagram, twitter, youtube, tiktok.
        platform: String,
        /// Content type for that platform (video, image, post, story, tweet, media, playlist).
        content_type: String,
        /// Content URL.
        url: String,
        /// Output format: best, video_mp4, audio.
        #[arg(long, short = 'f')]
        format: Option<String>,
        /// Directory to save into (overrides download_dir from config).
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
    },

    /// Show the detected platform and metadata of a URL without downloading.
    Info {
        /// Content URL.
        url: String,
    },

    /// List supported platforms and their content types.
    Platforms,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Platforms => run_platforms(),
            command => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                command.run(&cfg).await
            }
        }
    }

    async fn run(self, cfg: &SmdConfig) -> Result<()> {
        match self {
            CliCommand::Serve { listen } => {
                let listen = listen.unwrap_or_else(|| cfg.listen_addr.clone());
                run_serve(build_dispatcher(cfg, None)?, cfg, &listen).await
            }
            CliCommand::Get {
                platform,
                content_type,
                url,
                format,
                download_dir,
            } => {
                let dispatcher = build_dispatcher(cfg, download_dir)?;
                run_get(&dispatcher, cfg, &platform, &content_type, &url, format.as_deref()).await
            }
            CliCommand::Info { url } => run_info(&build_dispatcher(cfg, None)?, &url).await,
            CliCommand::Platforms => run_platforms(),
        }
    }
}

/// Tracker, demo fetchers, and dispatcher settings from config.
fn build_dispatcher(cfg: &SmdConfig, download_dir: Option<PathBuf>) -> Result<Dispatcher> {
    let settings = match download_dir {
        Some(dir) => SmdConfig {
            download_dir: Some(dir),
            ..cfg.clone()
        }
        .dispatcher_settings()?,
        None => cfg.dispatcher_settings()?,
    };
    tracing::debug!(download_dir = %settings.download_dir.display(), "dispatcher settings");
    Ok(Dispatcher::new(
        JobTracker::new(cfg.tracker_settings()),
        FetcherRegistry::demo(cfg.demo_settings()),
        settings,
    ))
}

#[cfg(test)]
mod tests;
