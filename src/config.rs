//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! tide-config.toml file: tide API access, chart dimensions and styling, and
//! where the selected location is stored.
//!
//! Every section and field has a default, so a partial file only overrides
//! what it names. The `WORLDTIDES_API_KEY` environment variable takes
//! precedence over `api.api_key`.

use crate::chart::ChartStyle;
use crate::curve::{DEFAULT_GRID_LINES, DEFAULT_LABEL_OFFSET};
use crate::Viewport;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "tide-config.toml";

/// Environment variable overriding the API key.
pub const API_KEY_ENV: &str = "WORLDTIDES_API_KEY";

/// Application configuration loaded from tide-config.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Tide API configuration
    pub api: ApiConfig,
    /// Chart size and styling
    pub chart: ChartConfig,
    /// Selected location persistence
    pub location: LocationConfig,
}

/// Tide API configuration
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; `/heights` is appended per request
    pub base_url: String,
    /// API key sent as the `apikey` query parameter
    pub api_key: String,
}

/// Chart size and styling
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Chart width in pixels (SVG) or columns (ASCII)
    pub width: u32,
    /// Chart height in pixels (SVG) or rows (ASCII)
    pub height: u32,
    /// Horizontal grid guide lines
    pub grid_lines: usize,
    /// Pixels between a point and its label
    pub label_offset: f64,
}

/// Selected location persistence
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationConfig {
    /// JSON file holding the selected location
    pub store_path: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "https://www.worldtides.info/api/v3".to_string(),
            api_key: String::new(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            width: 400,
            height: 300,
            grid_lines: DEFAULT_GRID_LINES,
            label_offset: DEFAULT_LABEL_OFFSET,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        LocationConfig {
            store_path: PathBuf::from("tide-location.json"),
        }
    }
}

impl ChartConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f64, self.height as f64)
    }

    pub fn style(&self) -> ChartStyle {
        ChartStyle {
            grid_lines: self.grid_lines,
            label_offset: self.label_offset,
        }
    }
}

impl Config {
    /// Load configuration from tide-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "invalid config file format: {}", e);
                    tracing::warn!("using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "no config file found, using default configuration");
                Self::default()
            }
        };
        config.apply_env_override(env::var(API_KEY_ENV).ok());
        config
    }

    fn apply_env_override(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            tracing::debug!("using API key from {}", API_KEY_ENV);
            self.api.api_key = key;
        }
    }

    /// Save current configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        tracing::info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
