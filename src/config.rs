//! Optional TOML file holding the birth details, so they need not be typed
//! on every run. Command-line flags win over the file.

use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;

use crate::input::BirthInput;
use crate::live::DEFAULT_INTERVAL;

pub const APP_NAME: &str = "agewatch";
pub const CONFIG_ENV: &str = "AGEWATCH_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub date: Option<String>,
    pub time: Option<String>,
    pub timezone: Option<String>,
    /// Live refresh cadence in milliseconds.
    pub interval_ms: Option<u64>,
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Config {
    /// Load from `path`, else from `$AGEWATCH_CONFIG`, else from the user
    /// config dir. A missing default file is not an error.
    #[tracing::instrument]
    pub async fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = if let Some(path) = path {
            path
        } else if let Some(env_path) = std::env::var_os(CONFIG_ENV) {
            PathBuf::from(env_path)
        } else {
            match default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    tracing::debug!("no config file, using flags only");
                    return Ok(Self::default());
                }
            }
        };

        fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?
            .parse()
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    /// Overlay values given on the command line.
    pub fn merge(
        mut self,
        date: Option<String>,
        time: Option<String>,
        timezone: Option<String>,
    ) -> Self {
        if date.is_some() {
            self.date = date;
        }
        if time.is_some() {
            self.time = time;
        }
        if timezone.is_some() {
            self.timezone = timezone;
        }
        self
    }

    pub fn birth_input(&self) -> BirthInput {
        BirthInput {
            date: self.date.clone().unwrap_or_default(),
            time: self.time.clone(),
            timezone: self.timezone.clone(),
        }
    }

    pub fn interval(&self) -> Duration {
        match self.interval_ms {
            Some(0) | None => DEFAULT_INTERVAL,
            Some(ms) => Duration::from_millis(ms),
        }
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
}
