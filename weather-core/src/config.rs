use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{error::WeatherError, model::Units};

pub const DEFAULT_API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

pub const ENV_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_API_URL: &str = "WEATHER_API_URL";
pub const ENV_UNITS: &str = "WEATHER_UNITS";
pub const ENV_LANG: &str = "WEATHER_LANG";
pub const ENV_TIMEOUT_SECS: &str = "WEATHER_TIMEOUT_SECS";
pub const ENV_CONFIG_PATH: &str = "WEATHER_CONFIG";

/// Runtime configuration, read once at startup.
///
/// Example TOML:
/// ```toml
/// api_base_url = "https://api.openweathermap.org/data/2.5"
/// units = "imperial"
/// lang = "de"
/// timeout_secs = 5
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Normally supplied through `WEATHER_API_KEY` rather than the file.
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub units: Units,
    pub lang: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            units: Units::Metric,
            lang: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("units", &self.units)
            .field("lang", &self.lang)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load config from `path`, `$WEATHER_CONFIG` or the platform config dir,
    /// then apply environment overrides.
    ///
    /// A missing file at the platform default location is not an error; an
    /// explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from));

        let mut cfg = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = Self::config_file_path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the default config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-web")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override fields from environment-style variables. `lookup` is
    /// `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), WeatherError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(units) = lookup(ENV_UNITS) {
            self.units = Units::try_from(units.as_str()).map_err(|_| {
                WeatherError::Configuration(format!(
                    "{ENV_UNITS}='{units}' is not metric or imperial"
                ))
            })?;
        }
        if let Some(lang) = lookup(ENV_LANG) {
            self.lang = lang;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs.trim().parse().map_err(|_| {
                WeatherError::Configuration(format!("{ENV_TIMEOUT_SECS}='{secs}' is not a number"))
            })?;
        }
        Ok(())
    }

    /// The provider API key; missing or blank is a configuration error.
    pub fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                WeatherError::Configuration(format!(
                    "No API key configured.\n\
                     Hint: set {ENV_API_KEY} in the environment or in a .env file."
                ))
            })
    }

    pub fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), resource)
    }
}
