//! Configuration management for the landmark tracker

use crate::constants::{
    DEFAULT_INITIAL_ERROR_COV, DEFAULT_MAX_MISSED_FRAMES, DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Kalman tracker configuration
    pub tracker: TrackerConfig,

    /// Multi-face track registry configuration
    pub tracks: TracksConfig,

    /// Filter selection
    pub filter: FilterConfig,
}

/// How the state is seeded before the first correction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPolicy {
    /// Start every landmark at the origin and let the filter pull it in
    Zero,
    /// Copy the first detection into the position half of the state
    #[default]
    FirstDetection,
}

/// Which estimate a combined predict/correct step hands back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPolicy {
    /// Position after fusing the current detection
    #[default]
    Corrected,
    /// Position predicted from the previous frame, before fusing the detection
    Predicted,
}

impl std::str::FromStr for InitPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "first_detection" | "first-detection" | "first" => Ok(Self::FirstDetection),
            other => Err(Error::ConfigError(format!("Unknown initialization policy: {other}"))),
        }
    }
}

impl std::str::FromStr for OutputPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "corrected" => Ok(Self::Corrected),
            "predicted" => Ok(Self::Predicted),
            other => Err(Error::ConfigError(format!("Unknown output policy: {other}"))),
        }
    }
}

/// Noise and lifecycle parameters of a single tracker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Diagonal of the process noise covariance
    pub process_noise: f64,

    /// Diagonal of the measurement noise covariance
    pub measurement_noise: f64,

    /// Diagonal of the prior error covariance
    pub initial_error_cov: f64,

    /// State seeding policy
    pub initialization: InitPolicy,

    /// Estimate returned by a combined step
    pub output: OutputPolicy,
}

/// Track registry parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracksConfig {
    /// Consecutive frames without detection before a track is dropped
    pub max_missed_frames: u32,
}

/// Filter selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter kind (`kalman` or `none`)
    pub kind: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            process_noise: DEFAULT_PROCESS_NOISE,
            measurement_noise: DEFAULT_MEASUREMENT_NOISE,
            initial_error_cov: DEFAULT_INITIAL_ERROR_COV,
            initialization: InitPolicy::default(),
            output: OutputPolicy::default(),
        }
    }
}

impl Default for TracksConfig {
    fn default() -> Self {
        Self {
            max_missed_frames: DEFAULT_MAX_MISSED_FRAMES,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: "kalman".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Validate noise parameters
    ///
    /// # Errors
    ///
    /// Returns an error if any value is non-finite, the process noise is
    /// negative, or the measurement noise or prior covariance is not positive
    pub fn validate(&self) -> Result<()> {
        if !self.process_noise.is_finite() || self.process_noise < 0.0 {
            return Err(Error::ConfigError(format!(
                "Process noise must be finite and non-negative, got {}",
                self.process_noise
            )));
        }
        if !self.measurement_noise.is_finite() || self.measurement_noise <= 0.0 {
            return Err(Error::ConfigError(format!(
                "Measurement noise must be finite and positive, got {}",
                self.measurement_noise
            )));
        }
        if !self.initial_error_cov.is_finite() || self.initial_error_cov <= 0.0 {
            return Err(Error::ConfigError(format!(
                "Initial error covariance must be finite and positive, got {}",
                self.initial_error_cov
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker parameters are invalid or the filter kind is unknown
    pub fn validate(&self) -> Result<()> {
        self.tracker.validate()?;

        match self.filter.kind.to_lowercase().as_str() {
            "kalman" | "none" | "passthrough" => Ok(()),
            other => Err(Error::ConfigError(format!("Unknown filter kind: {other}"))),
        }
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Face Landmark Tracker Configuration

# Kalman tracker
tracker:
  process_noise: 0.00001
  measurement_noise: 0.1
  initial_error_cov: 1.0
  initialization: first_detection   # or: zero
  output: corrected                 # or: predicted

# Multi-face tracks
tracks:
  max_missed_frames: 5

# Filter selection
filter:
  kind: "kalman"                    # or: none
"#;
