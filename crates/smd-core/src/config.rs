use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::dispatcher::DispatcherSettings;
use crate::fetcher::DemoSettings;
use crate::tracker::TrackerSettings;

/// Demo fetcher pacing (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Delay between simulated progress steps, in milliseconds.
    pub step_delay_ms: u64,
    /// Time spent in the processing phase, in milliseconds.
    pub processing_delay_ms: u64,
    /// Size of the artifact written for each completed job.
    pub artifact_bytes: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 500,
            processing_delay_ms: 1000,
            artifact_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Global configuration loaded from `~/.config/smd/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmdConfig {
    /// Address the HTTP API binds to.
    pub listen_addr: String,
    /// Where artifacts are written. None = `~/.local/share/smd/downloads`.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// A job whose fetcher publishes no state change for this long fails with a timeout.
    pub idle_timeout_secs: u64,
    /// How long terminal jobs (and their artifacts) are kept before expiry.
    pub retention_secs: u64,
    /// Interval of the expiry sweep.
    pub sweep_interval_secs: u64,
    /// How long a cancelled fetcher may take to wind down before it is dropped.
    pub cancel_grace_ms: u64,
    /// Poll interval of the terminal progress reporter (`smd get`).
    pub poll_interval_ms: u64,
    /// Optional demo fetcher pacing; if missing, built-in defaults are used.
    #[serde(default)]
    pub demo: Option<DemoConfig>,
}

impl Default for SmdConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
            download_dir: None,
            idle_timeout_secs: 60,
            retention_secs: 3600,
            sweep_interval_secs: 60,
            cancel_grace_ms: 2000,
            poll_interval_ms: 500,
            demo: None,
        }
    }
}

impl SmdConfig {
    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            retention: Duration::from_secs(self.retention_secs),
        }
    }

    /// Resolves the download directory (creating the XDG default if needed).
    pub fn dispatcher_settings(&self) -> Result<DispatcherSettings> {
        let download_dir = match &self.download_dir {
            Some(dir) => dir.clone(),
            None => default_download_dir()?,
        };
        Ok(DispatcherSettings {
            download_dir,
            idle_timeout: Duration::from_secs(self.idle_timeout_secs.max(1)),
            cancel_grace: Duration::from_millis(self.cancel_grace_ms),
        })
    }

    pub fn demo_settings(&self) -> DemoSettings {
        let demo = self.demo.clone().unwrap_or_default();
        DemoSettings {
            step_delay: Duration::from_millis(demo.step_delay_ms),
            processing_delay: Duration::from_millis(demo.processing_delay_ms),
            artifact_bytes: demo.artifact_bytes,
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("smd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// `~/.local/share/smd/downloads`, created on first use.
pub fn default_download_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("smd")?;
    Ok(xdg_dirs.create_data_directory("downloads")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SmdConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SmdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SmdConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = SmdConfig::default();
        assert_eq!(cfg.listen_addr, "127.0.0.1:5000");
        assert_eq!(cfg.idle_timeout_secs, 60);
        assert_eq!(cfg.retention_secs, 3600);
        assert!(cfg.download_dir.is_none());
        assert!(cfg.demo.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = SmdConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SmdConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.listen_addr, cfg.listen_addr);
        assert_eq!(parsed.idle_timeout_secs, cfg.idle_timeout_secs);
        assert_eq!(parsed.cancel_grace_ms, cfg.cancel_grace_ms);
        assert_eq!(parsed.poll_interval_ms, cfg.poll_interval_ms);
    }

    #[test]
    fn config_toml_custom_values_and_demo_section() {
        let toml = r#"
            listen_addr = "0.0.0.0:8080"
            download_dir = "/srv/smd"
            idle_timeout_secs = 5
            retention_secs = 120
            sweep_interval_secs = 10
            cancel_grace_ms = 250
            poll_interval_ms = 100

            [demo]
            step_delay_ms = 10
            processing_delay_ms = 20
            artifact_bytes = 4096
        "#;
        let cfg: SmdConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.download_dir.as_deref(), Some(std::path::Path::new("/srv/smd")));
        assert_eq!(cfg.tracker_settings().retention, Duration::from_secs(120));

        let dispatcher = cfg.dispatcher_settings().unwrap();
        assert_eq!(dispatcher.download_dir, PathBuf::from("/srv/smd"));
        assert_eq!(dispatcher.idle_timeout, Duration::from_secs(5));
        assert_eq!(dispatcher.cancel_grace, Duration::from_millis(250));

        let demo = cfg.demo_settings();
        assert_eq!(demo.step_delay, Duration::from_millis(10));
        assert_eq!(demo.processing_delay, Duration::from_millis(20));
        assert_eq!(demo.artifact_bytes, 4096);
    }

    #[test]
    fn missing_demo_section_uses_defaults() {
        let cfg = SmdConfig::default();
        let demo = cfg.demo_settings();
        assert_eq!(demo.step_delay, Duration::from_millis(500));
        assert_eq!(demo.artifact_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn intervals_are_never_zero() {
        let cfg = SmdConfig {
            download_dir: Some(PathBuf::from("/srv/smd")),
            idle_timeout_secs: 0,
            sweep_interval_secs: 0,
            poll_interval_ms: 0,
            ..SmdConfig::default()
        };
        assert_eq!(cfg.sweep_interval(), Duration::from_secs(1));
        assert_eq!(cfg.poll_interval(), Duration::from_millis(10));
        assert_eq!(
            cfg.dispatcher_settings().unwrap().idle_timeout,
            Duration::from_secs(1)
        );
    }
}
