//! Process configuration.
//!
//! A [`Config`] is loaded from an optional TOML file and then overridden
//! by `DONES_*` environment variables, so deployments can point a whole
//! process at one backing target without threading settings through call
//! sites.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::db::{DEFAULT_CONNECT_DELAY, DEFAULT_CONNECT_RETRIES};
use crate::error::{DonesError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default connection url for database-backed dones, like
    /// `sqlite:///data/dones.db`.
    #[serde(default)]
    pub db_url: Option<String>,
    /// Directory holding one append-log file per namespace.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Extra connection attempts beyond the first.
    #[serde(default = "default_retries")]
    pub connect_retries: usize,
    /// Pause between connection attempts, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub connect_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_url: None,
            log_dir: None,
            connect_retries: default_retries(),
            connect_delay_ms: default_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from `explicit_path`, the file named by
    /// `DONES_CONFIG`, or defaults, then apply environment overrides.
    /// A missing file is not an error; environment variables still apply.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("DONES_CONFIG").ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::load_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| DonesError::Config(format!("read config {}: {err}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|err| DonesError::Config(format!("parse config {}: {err}", path.display())))
    }

    /// Override settings from `DONES_DB_URL`, `DONES_LOG_DIR`,
    /// `DONES_CONNECT_RETRIES`, and `DONES_CONNECT_DELAY_MS`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("DONES_DB_URL") {
            if !url.is_empty() {
                self.db_url = Some(url);
            }
        }
        if let Ok(dir) = std::env::var("DONES_LOG_DIR") {
            if !dir.is_empty() {
                self.log_dir = Some(PathBuf::from(dir));
            }
        }
        if let Ok(raw) = std::env::var("DONES_CONNECT_RETRIES") {
            self.connect_retries = raw.parse().map_err(|_| {
                DonesError::Config(format!("DONES_CONNECT_RETRIES must be an integer: '{raw}'"))
            })?;
        }
        if let Ok(raw) = std::env::var("DONES_CONNECT_DELAY_MS") {
            self.connect_delay_ms = raw.parse().map_err(|_| {
                DonesError::Config(format!("DONES_CONNECT_DELAY_MS must be an integer: '{raw}'"))
            })?;
        }
        Ok(())
    }

    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }
}

fn default_retries() -> usize {
    DEFAULT_CONNECT_RETRIES
}

#[allow(clippy::cast_possible_truncation)]
fn default_delay_ms() -> u64 {
    DEFAULT_CONNECT_DELAY.as_millis() as u64
}
