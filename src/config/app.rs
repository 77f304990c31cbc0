//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! mars-ratings tool, including TOML and environment variable loading and
//! validation.

use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub data: DataSettings,
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in log output
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Canonical match table (CSV)
    pub input_path: PathBuf,
    /// Directory the output tables are written to
    pub output_dir: PathBuf,
    /// Output format (csv or json)
    pub output_format: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "mars-ratings".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("terraforming-mars-stats.csv"),
            output_dir: PathBuf::from("ratings"),
            output_format: "csv".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(initial) = env::var("RATING_INITIAL") {
            self.rating.initial_rating = initial
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_INITIAL value: {}", initial))?;
        }
        if let Ok(k) = env::var("RATING_K_FACTOR") {
            self.rating.k_factor = k
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_K_FACTOR value: {}", k))?;
        }
        if let Ok(scale) = env::var("RATING_SCALE") {
            self.rating.scale = scale
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_SCALE value: {}", scale))?;
        }
        if let Ok(score_function) = env::var("RATING_SCORE_FUNCTION") {
            self.rating.score_function = score_function;
        }
        if let Ok(alpha) = env::var("RATING_EXP_ALPHA") {
            self.rating.exp_alpha = alpha
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_EXP_ALPHA value: {}", alpha))?;
        }

        // Data settings
        if let Ok(input) = env::var("DATA_INPUT_PATH") {
            self.data.input_path = PathBuf::from(input);
        }
        if let Ok(output) = env::var("DATA_OUTPUT_DIR") {
            self.data.output_dir = PathBuf::from(output);
        }
        if let Ok(format) = env::var("DATA_OUTPUT_FORMAT") {
            self.data.output_format = format;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Rating constants and score function name
    config.rating.validate()?;

    // Validate data settings
    if config.data.input_path.as_os_str().is_empty() {
        return Err(anyhow!("Input path cannot be empty"));
    }
    match config.data.output_format.to_lowercase().as_str() {
        "csv" | "json" => {}
        other => return Err(anyhow!("Unsupported output format: {}", other)),
    }

    Ok(())
}
