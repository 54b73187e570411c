//! Configuration file support for ridelog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/ridelog/config.toml`.

use crate::extract::{TimeWindow, CYCLING_ACTIVITY_TYPE};
use crate::timestamp::parse_timestamp;
use crate::units::DisplayUnits;
use crate::zones::{default_bands, ZoneBand};
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub heart_rate: HeartRateConfig,

    #[serde(default)]
    pub routes: RouteConfig,

    #[serde(default)]
    pub units: DisplayUnits,
}

/// Input and output locations
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            export_path: default_export_path(),
            output_dir: default_output_dir(),
        }
    }
}

/// Workout selection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_workout_types")]
    pub workout_types: Vec<String>,

    /// Inclusive lower bound on workout start, `YYYY-MM-DD` or full timestamp
    #[serde(default)]
    pub start_date: Option<String>,

    /// Inclusive upper bound on workout start
    #[serde(default)]
    pub end_date: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            workout_types: default_workout_types(),
            start_date: None,
            end_date: None,
        }
    }
}

impl FilterConfig {
    /// Parse the configured date bounds into a window.
    ///
    /// Unlike record-level parsing inside the extractor, a malformed bound
    /// here is fatal; a broken config should stop the run.
    pub fn window(&self) -> Result<Option<TimeWindow>> {
        let start = self.start_date.as_deref().map(parse_bound).transpose()?;
        let end = self.end_date.as_deref().map(parse_bound).transpose()?;
        if start.is_none() && end.is_none() {
            return Ok(None);
        }
        Ok(Some(TimeWindow { start, end }))
    }
}

fn parse_bound(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(at) = parse_timestamp(raw) {
        return Ok(at);
    }
    // Bare dates mean midnight at the start of that day
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|source| Error::Timestamp {
        raw: raw.to_string(),
        source,
    })?;
    Ok(date.and_time(NaiveTime::MIN))
}

/// Heart-rate zone parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeartRateConfig {
    /// Reference maximum, conventionally 220 minus age
    #[serde(default = "default_max_hr")]
    pub max_hr: u32,

    #[serde(default = "default_bands")]
    pub zones: Vec<ZoneBand>,
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            max_hr: default_max_hr(),
            zones: default_bands(),
        }
    }
}

/// Route matching parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Elevation summary file written by the route matcher, if any
    #[serde(default)]
    pub summary_path: Option<PathBuf>,

    /// A route matches only when recorded strictly closer than this to the
    /// workout start
    #[serde(default = "default_tolerance_minutes")]
    pub tolerance_minutes: i64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            summary_path: None,
            tolerance_minutes: default_tolerance_minutes(),
        }
    }
}

// Default value functions
fn default_export_path() -> PathBuf {
    PathBuf::from("export.xml")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_workout_types() -> Vec<String> {
    vec![CYCLING_ACTIVITY_TYPE.to_string()]
}

fn default_max_hr() -> u32 {
    185
}

fn default_tolerance_minutes() -> i64 {
    crate::elevation::DEFAULT_TOLERANCE_MINUTES
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("ridelog").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
