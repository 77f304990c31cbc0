//! Configuration management for the mars-ratings tool
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values for the rating engine.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, DataSettings, ServiceSettings};
pub use rating::RatingConfig;
