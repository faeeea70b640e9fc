//! Pipeline configuration
//!
//! All fields have defaults, so a partial JSON document (or none at all) yields
//! a usable configuration. `validate` is run before any session state is built.

use serde::{Deserialize, Serialize};

use crate::blink::{
    DEFAULT_BLINK_RATE_WINDOW_MS, DEFAULT_BLINK_THRESHOLD, DEFAULT_MAX_BLINK_DURATION_MS,
    DEFAULT_MIN_BLINK_DURATION_MS,
};
use crate::error::ComputeError;
use crate::perclos::{DEFAULT_CLOSURE_THRESHOLD, DEFAULT_PERCLOS_WINDOW};

/// Default processing rate (frames per second)
pub const DEFAULT_TARGET_FPS: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum frames processed per second
    pub target_fps: f64,
    /// PERCLOS window size (samples)
    pub window_size: usize,
    /// EAR below which a PERCLOS sample is closed
    pub closure_threshold: f64,
    /// EAR at or below which the blink detector sees a closed eye
    pub blink_threshold: f64,
    pub min_blink_duration_ms: f64,
    pub max_blink_duration_ms: f64,
    /// Trailing window for the reported blink rate
    pub blink_rate_window_ms: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            window_size: DEFAULT_PERCLOS_WINDOW,
            closure_threshold: DEFAULT_CLOSURE_THRESHOLD,
            blink_threshold: DEFAULT_BLINK_THRESHOLD,
            min_blink_duration_ms: DEFAULT_MIN_BLINK_DURATION_MS,
            max_blink_duration_ms: DEFAULT_MAX_BLINK_DURATION_MS,
            blink_rate_window_ms: DEFAULT_BLINK_RATE_WINDOW_MS,
        }
    }
}

impl PipelineConfig {
    /// Load from JSON, filling unspecified fields with defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if !self.target_fps.is_finite() || self.target_fps <= 0.0 {
            return Err(ComputeError::InvalidConfig(format!(
                "target_fps must be positive, got {}",
                self.target_fps
            )));
        }

        if self.window_size == 0 {
            return Err(ComputeError::InvalidConfig(
                "window_size must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("closure_threshold", self.closure_threshold),
            ("blink_threshold", self.blink_threshold),
            ("min_blink_duration_ms", self.min_blink_duration_ms),
            ("max_blink_duration_ms", self.max_blink_duration_ms),
            ("blink_rate_window_ms", self.blink_rate_window_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ComputeError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.min_blink_duration_ms > self.max_blink_duration_ms {
            return Err(ComputeError::InvalidConfig(format!(
                "min_blink_duration_ms ({}) exceeds max_blink_duration_ms ({})",
                self.min_blink_duration_ms, self.max_blink_duration_ms
            )));
        }

        if self.blink_rate_window_ms == 0.0 {
            return Err(ComputeError::InvalidConfig(
                "blink_rate_window_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Minimum spacing between accepted frames (ms)
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.target_fps, 15.0);
        assert_eq!(config.window_size, 30);
        assert_eq!(config.closure_threshold, 0.2);
        assert_eq!(config.blink_threshold, 0.2);
        assert_eq!(config.min_blink_duration_ms, 100.0);
        assert_eq!(config.max_blink_duration_ms, 400.0);
        assert!(config.validate().is_ok());
        assert!((config.frame_interval_ms() - 66.666).abs() < 0.001);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PipelineConfig::from_json(r#"{"target_fps": 30, "window_size": 60}"#).unwrap();
        assert_eq!(
            config,
            PipelineConfig {
                target_fps: 30.0,
                window_size: 60,
                ..PipelineConfig::default()
            }
        );
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(PipelineConfig::from_json("{}").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_rejects_invalid_values() {
        for json in [
            r#"{"target_fps": 0}"#,
            r#"{"target_fps": -5}"#,
            r#"{"window_size": 0}"#,
            r#"{"closure_threshold": -0.1}"#,
            r#"{"min_blink_duration_ms": 500, "max_blink_duration_ms": 400}"#,
            r#"{"blink_rate_window_ms": 0}"#,
        ] {
            assert!(
                matches!(PipelineConfig::from_json(json), Err(ComputeError::InvalidConfig(_))),
                "expected rejection for {}",
                json
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            PipelineConfig::from_json("not json"),
            Err(ComputeError::JsonError(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PipelineConfig {
            target_fps: 10.0,
            ..PipelineConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(PipelineConfig::from_json(&json).unwrap(), config);
    }
}
