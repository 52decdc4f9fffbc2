use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Unit system sent to the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    /// Wire code expected by the `unit` query parameter.
    pub const fn code(self) -> &'static str {
        match self {
            Unit::Metric => "m",
            Unit::Imperial => "i",
        }
    }
}

/// Per-category cache-eligibility intervals, in minutes.
///
/// These become `Cache-Control: max-age` hints on outgoing requests; nothing
/// in this crate keeps a local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheIntervals {
    pub now: u64,
    pub hourly: u64,
    pub day: u64,
    pub warning: u64,
    pub minutely: u64,
    pub air_now: u64,
    pub air_daily: u64,
    pub indices: u64,
}

impl Default for CacheIntervals {
    fn default() -> Self {
        Self {
            now: 10,
            hourly: 30,
            day: 120,
            warning: 10,
            minutely: 5,
            air_now: 30,
            air_daily: 120,
            indices: 120,
        }
    }
}

/// Everything a fetch needs besides the location: credentials, unit,
/// language, cache intervals, and the per-call freshness override.
///
/// Resolved by the caller before invocation; the repo layer never reads
/// global state. Loaded once at startup, replaced wholesale when the user
/// changes settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FetchConfig {
    /// QWeather API key. Example TOML:
    /// api_key = "..."
    pub api_key: Option<String>,

    pub unit: Unit,

    /// Language tag passed through to the API, e.g. "en" or "zh".
    pub lang: String,

    pub intervals: CacheIntervals,

    /// Per-call override: bypass any intermediary cache for this fetch.
    /// Never persisted.
    #[serde(skip)]
    pub no_cache: bool,
}

impl FetchConfig {
    /// Copy of this config with the freshness override set.
    pub fn fresh(&self) -> Self {
        Self {
            no_cache: true,
            ..self.clone()
        }
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `qweather configure` and enter your QWeather key."
            )
        })
    }

    /// Read the stored configuration, falling back to defaults when no file
    /// has been written yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // Nothing saved yet; start from defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: FetchConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Write the configuration back out, creating the config directory if
    /// it is missing.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Platform-specific location of the TOML config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "qweather", "qweather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
