use std::time::Duration;

use anyhow::{Context, bail};
use tracing::trace;

use crate::monitors::snapshot::DEFAULT_DELIMITER;
use crate::util;

pub const DEFAULT_URL: &str = "http://srv.msk01.gigacorp.local/_stats";

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Endpoint serving the snapshot
    pub url: String,

    /// Name used in logs and alert destinations
    pub display: Option<String>,

    /// Seconds between two polls
    pub interval: u64,

    /// Per-request timeout in seconds
    pub timeout: u64,

    /// Consecutive transport failures before the host is reported unavailable
    pub error_threshold: usize,

    /// Field delimiter of the wire format
    pub delimiter: char,

    /// Destinations besides the console
    pub alerts: Vec<Alert>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            display: None,
            interval: default_interval(),
            timeout: default_timeout(),
            error_threshold: default_error_threshold(),
            delimiter: DEFAULT_DELIMITER,
            alerts: vec![],
        }
    }
}

fn default_interval() -> u64 {
    60
}

fn default_timeout() -> u64 {
    10
}

fn default_error_threshold() -> usize {
    3
}

impl MonitorConfig {
    pub fn display_name(&self) -> String {
        self.display.clone().unwrap_or_else(|| self.url.clone())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Apply `MONITOR_URL` and `MONITOR_INTERVAL` from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = util::get_url() {
            self.url = url;
        }
        if let Some(interval) = util::get_interval() {
            self.interval = interval;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = reqwest::Url::parse(&self.url)
            .with_context(|| format!("invalid target url {:?}", self.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("target url must use http or https, got {:?}", url.scheme());
        }
        if self.interval == 0 {
            bail!("interval must be at least one second");
        }
        if self.timeout == 0 {
            bail!("timeout must be at least one second");
        }
        if self.error_threshold == 0 {
            bail!("error_threshold must be at least 1");
        }
        // must not collide with the characters of a decimal number
        if self.delimiter.is_ascii_digit() || matches!(self.delimiter, '.' | '-' | '+' | 'e' | 'E')
        {
            bail!("delimiter {:?} clashes with number syntax", self.delimiter);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    Discord(Discord),
    Webhook(Webhook),
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Webhook {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Discord {
    pub url: String,
    pub user_id: Option<String>,
}

pub fn read_config_file(path: &str) -> anyhow::Result<MonitorConfig> {
    let file_content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let config: MonitorConfig = serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))?;
    config.validate()?;
    trace!("loaded config: {config:?}");
    Ok(config)
}
