//! Rig configuration for the echo engine.
//!
//! Everything here is injected into each engine call; nothing is derived from
//! the waveform. A TOML file may override any subset of the defaults:
//!
//! ```toml
//! path_length = 0.015
//! threshold_fraction = 0.1
//! second_window_offset = 8e-6
//!
//! [filter]
//! order = 5
//! ```

use crate::engine::common::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),

    #[error("Invalid config file {0}: {1}")]
    Invalid(PathBuf, EngineError),
}

/// Band edges as multiples of the carrier frequency, and the filter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub low_factor: f64,
    pub high_factor: f64,
    pub order: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            low_factor: 0.5,
            high_factor: 1.5,
            order: 5,
        }
    }
}

/// Rig constants consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// One-way acoustic path length between the two reflecting faces (m)
    pub path_length: f64,
    /// Peak height threshold as a fraction of the window maximum
    pub threshold_fraction: f64,
    /// Minimum peak separation in tone-burst lengths
    pub separation_factor: f64,
    /// Delay from the first echo to the start of the second-echo window (s)
    pub second_window_offset: f64,
    /// Length of the second-echo window (s)
    pub second_window_width: f64,
    /// Target sample rate for upsampling (Hz)
    pub upsample_rate: f64,
    pub filter: FilterConfig,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path_length: 0.015,
            threshold_fraction: 0.1,
            separation_factor: 3.0,
            second_window_offset: 8.0e-6,
            second_window_width: 3.0e-6,
            upsample_rate: 1.0e9,
            filter: FilterConfig::default(),
            log_level: None,
        }
    }
}

impl EngineConfig {
    /// Checks that every constant is physically meaningful.
    ///
    /// # Errors
    /// Will return `Err(EngineError::InvalidSpec)` naming the first offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(EngineError::InvalidSpec(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        };
        positive("path_length", self.path_length)?;
        positive("separation_factor", self.separation_factor)?;
        positive("second_window_width", self.second_window_width)?;
        positive("upsample_rate", self.upsample_rate)?;
        positive("filter.low_factor", self.filter.low_factor)?;
        if !(self.threshold_fraction > 0.0 && self.threshold_fraction < 1.0) {
            Err(EngineError::InvalidSpec(format!(
                "threshold_fraction must lie in (0, 1), got {}",
                self.threshold_fraction
            )))?
        }
        if !(self.second_window_offset.is_finite() && self.second_window_offset >= 0.0) {
            Err(EngineError::InvalidSpec(format!(
                "second_window_offset must not be negative, got {}",
                self.second_window_offset
            )))?
        }
        if self.filter.order == 0 {
            Err(EngineError::InvalidSpec(
                "filter.order must be at least 1".to_string(),
            ))?
        }
        if self.filter.high_factor <= self.filter.low_factor {
            Err(EngineError::InvalidSpec(format!(
                "filter.high_factor ({}) must exceed filter.low_factor ({})",
                self.filter.high_factor, self.filter.low_factor
            )))?
        }
        Ok(())
    }

    /// Load and validate configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        config
            .validate()
            .map_err(|e| ConfigError::Invalid(path.to_path_buf(), e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml_str = r#"
            path_length = 0.02
            second_window_offset = 6e-6

            [filter]
            order = 4
        "#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.path_length, 0.02);
        assert_eq!(config.second_window_offset, 6.0e-6);
        assert_eq!(config.second_window_width, 3.0e-6);
        assert_eq!(config.filter.order, 4);
        assert_eq!(config.filter.low_factor, 0.5);
        assert_eq!(config.upsample_rate, 1.0e9);
    }

    #[test]
    fn rejects_inverted_band() {
        let mut config = EngineConfig::default();
        config.filter.high_factor = 0.4;
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidSpec(_))
        ));
    }

    #[test]
    fn rejects_bad_threshold() {
        let config = EngineConfig {
            threshold_fraction: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = EngineConfig {
            threshold_fraction: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = EngineConfig::load_from_file(Path::new("/nonexistent/echoprop.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_, _)));
    }
}
