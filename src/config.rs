//! Layered configuration.
//!
//! Priority, lowest first: built-in defaults, the TOML file
//! (`$MAILGRAB_CONFIG` or `./mailgrab.toml`), `MAILGRAB_*` environment
//! variables, then command-line overrides.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::core::PollOptions;

pub const ENV_PREFIX: &str = "MAILGRAB_";
pub const CONFIG_PATH_ENV: &str = "MAILGRAB_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "mailgrab.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the job server.
    pub server_url: String,
    pub poll_interval_ms: u64,
    /// Give up after this many polls without a terminal status.
    pub max_poll_ticks: Option<u64>,
    /// Give up after this many seconds without a terminal status.
    pub max_poll_secs: Option<u64>,
    pub request_timeout_secs: u64,
    /// Where `mailgrab download` saves files.
    pub download_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:9090".to_string(),
            poll_interval_ms: 500,
            max_poll_ticks: None,
            max_poll_secs: None,
            request_timeout_secs: 30,
            download_dir: PathBuf::from("downloads"),
            log_file: None,
            verbose: false,
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Load configuration, applying `overrides` last.
    ///
    /// `overrides` should skip unset fields when serialized so they do not
    /// mask lower layers.
    pub fn new<T: Serialize>(overrides: Option<&T>) -> Result<Self> {
        let mut figment = Self::figment();
        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }
        let config: Self = figment.extract().context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            anyhow::bail!("Invalid configuration: poll_interval_ms must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("Invalid configuration: request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    fn figment() -> Figment {
        let file = Env::var(CONFIG_PATH_ENV).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config", "app_password"]))
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_ticks: self.max_poll_ticks,
            max_duration: self.max_poll_secs.map(Duration::from_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
