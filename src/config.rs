//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{OverlayError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Poller configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PollerConfig {
    /// Minimum spacing between two normalization passes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Cadence of the frame clock driving the poll loop.
    #[serde(default = "default_frame_rate_hz")]
    pub frame_rate_hz: u32,
}

/// Controller (hardware source) configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Explicit `/dev/input/eventX` path. Empty means auto-detect.
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,
}

/// Console presenter configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_display_format")]
    pub format: String,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

// Default value functions
fn default_poll_interval_ms() -> u64 { 16 }
fn default_frame_rate_hz() -> u32 { 60 }

fn default_rescan_interval_ms() -> u64 { 1000 }

fn default_display_format() -> String { "text".to_string() }
fn default_refresh_interval_ms() -> u64 { 100 }

/// Frame rates a display commonly refreshes at.
const SUPPORTED_FRAME_RATES: [u32; 8] = [30, 60, 75, 90, 120, 144, 165, 240];

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            frame_rate_hz: default_frame_rate_hz(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            rescan_interval_ms: default_rescan_interval_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_display_format(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poller: PollerConfig::default(),
            controller: ControllerConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dualsense_overlay::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// Missing sections and fields take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.poller.poll_interval_ms == 0 || self.poller.poll_interval_ms > 1000 {
            return Err(invalid("poll_interval_ms must be between 1 and 1000"));
        }

        if !SUPPORTED_FRAME_RATES.contains(&self.poller.frame_rate_hz) {
            return Err(invalid(
                "frame_rate_hz must be one of: 30, 60, 75, 90, 120, 144, 165, 240",
            ));
        }

        if self.controller.rescan_interval_ms == 0 || self.controller.rescan_interval_ms > 60000 {
            return Err(invalid("rescan_interval_ms must be between 1 and 60000"));
        }

        if !self.controller.device_path.is_empty()
            && !self.controller.device_path.starts_with("/dev/input/")
        {
            return Err(invalid("device_path must be empty or point into /dev/input/"));
        }

        if self.display.format != "text" && self.display.format != "jsonl" {
            return Err(invalid("display format must be 'text' or 'jsonl'"));
        }

        if self.display.refresh_interval_ms == 0 || self.display.refresh_interval_ms > 60000 {
            return Err(invalid("refresh_interval_ms must be between 1 and 60000"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> OverlayError {
    OverlayError::Config(toml::de::Error::custom(msg))
}
