// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration loaded from `trough.toml`

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use trough_core::{DriverConfig, FailurePolicy};
use trough_engine::ServiceConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("backend_url must not be empty")]
    MissingBackendUrl,
}

/// Daemon configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the dashboard REST API
    pub backend_url: String,
    /// Cadence of the periodic registry refresh
    #[serde(default = "default_refresh_interval", with = "humantime_serde")]
    pub refresh_interval: Duration,
    /// Directory for the daemon log file; stderr-only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Feed driver overrides
    #[serde(default)]
    pub feed: DriverOverrides,
    /// Water driver overrides
    #[serde(default)]
    pub water: DriverOverrides,
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(300)
}

/// Per-driver overrides; anything unset keeps the built-in behavior
#[derive(Debug, Clone, Deserialize)]
pub struct DriverOverrides {
    #[serde(default, with = "humantime_serde::option")]
    pub tick_interval: Option<Duration>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub on_failure: Option<FailurePolicy>,
    /// Start the driver as soon as the daemon is up
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

fn default_autostart() -> bool {
    true
}

impl Default for DriverOverrides {
    fn default() -> Self {
        Self {
            tick_interval: None,
            step: None,
            on_failure: None,
            autostart: true,
        }
    }
}

impl DriverOverrides {
    fn apply(&self, mut base: DriverConfig) -> DriverConfig {
        if let Some(interval) = self.tick_interval {
            base.tick_interval = interval;
        }
        if let Some(step) = self.step {
            base.step = step;
        }
        if let Some(policy) = self.on_failure {
            base.on_failure = policy;
        }
        base
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text)?;
        if config.backend_url.trim().is_empty() {
            return Err(ConfigError::MissingBackendUrl);
        }
        Ok(config)
    }

    /// Driver configuration with file overrides applied
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            feed: self.feed.apply(DriverConfig::feed()),
            water: self.water.apply(DriverConfig::water()),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
