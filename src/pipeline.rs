//! Pipeline orchestration
//!
//! Sequences the per-frame stages: landmark extraction → EAR → PERCLOS window
//! and blink detector → head pose → fatigue fusion → metrics record.

use crate::blink::BlinkDetector;
use crate::config::PipelineConfig;
use crate::ear::{calculate_average_ear, calculate_ear};
use crate::error::ComputeError;
use crate::fatigue::{fatigue_index, fatigue_level};
use crate::head_pose::{classify_posture, head_pose_from_landmarks};
use crate::landmarks::eye_samples;
use crate::perclos::PerclosWindow;
use crate::types::{EyeMetricsRecord, FrameMeasurement, LandmarkSet};

/// Take the stateless measurements of one landmark set (stateless, one-shot).
///
/// Fails without partial results if either eye or the head pose cannot be
/// computed.
pub fn measure_frame(landmarks: &LandmarkSet) -> Result<FrameMeasurement, ComputeError> {
    let (left, right) = eye_samples(landmarks)?;
    let left_ear = calculate_ear(&left)?;
    let right_ear = calculate_ear(&right)?;
    let head_pose = head_pose_from_landmarks(landmarks)?;

    let measurement = FrameMeasurement {
        left_ear,
        right_ear,
        ear: calculate_average_ear(&left, &right)?,
        head_pose,
        posture: classify_posture(&head_pose),
    };

    if !measurement.ear.is_finite() || !head_pose.is_finite() {
        return Err(ComputeError::Internal(format!(
            "non-finite measurement: ear={}, pose={:?}",
            measurement.ear, head_pose
        )));
    }

    Ok(measurement)
}

/// Stateful processor holding one session's PERCLOS window and blink detector.
///
/// Frames must be fed one at a time in timestamp order; `FrameWorker` enforces
/// this when frames arrive from a live source.
#[derive(Debug, Clone)]
pub struct EyeMetricsProcessor {
    config: PipelineConfig,
    perclos: PerclosWindow,
    blink: BlinkDetector,
    total_blinks: u64,
}

impl Default for EyeMetricsProcessor {
    fn default() -> Self {
        Self::from_valid_config(PipelineConfig::default())
    }
}

impl EyeMetricsProcessor {
    /// Create a processor after validating `config`
    pub fn new(config: PipelineConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: PipelineConfig) -> Self {
        Self {
            perclos: PerclosWindow::new(config.window_size, config.closure_threshold),
            blink: BlinkDetector::new(
                config.blink_threshold,
                config.min_blink_duration_ms,
                config.max_blink_duration_ms,
            ),
            config,
            total_blinks: 0,
        }
    }

    /// Score a landmark set captured at `timestamp_ms`
    pub fn process(
        &mut self,
        landmarks: &LandmarkSet,
        timestamp_ms: f64,
    ) -> Result<EyeMetricsRecord, ComputeError> {
        if !timestamp_ms.is_finite() {
            return Err(ComputeError::InvalidInput(format!(
                "frame timestamp {} is not finite",
                timestamp_ms
            )));
        }
        // Measure before touching session state so a bad frame leaves it unchanged
        let measurement = measure_frame(landmarks)?;
        self.process_measurement(&measurement, timestamp_ms)
    }

    /// Feed an already-measured frame through the windowed stages
    pub fn process_measurement(
        &mut self,
        measurement: &FrameMeasurement,
        timestamp_ms: f64,
    ) -> Result<EyeMetricsRecord, ComputeError> {
        if !measurement.ear.is_finite() || !timestamp_ms.is_finite() {
            return Err(ComputeError::Internal(format!(
                "non-finite sample: ear={}, timestamp={}",
                measurement.ear, timestamp_ms
            )));
        }

        let perclos_value = self.perclos.add_sample(measurement.ear);
        if self.blink.update(measurement.ear, timestamp_ms).is_some() {
            self.total_blinks += 1;
        }
        let blink_rate = self
            .blink
            .blink_rate(timestamp_ms, self.config.blink_rate_window_ms);

        let fatigue = fatigue_index(
            measurement.ear,
            perclos_value,
            blink_rate,
            measurement.posture,
        );
        if fatigue.is_nan() {
            return Err(ComputeError::Internal(format!(
                "fatigue fusion produced NaN (perclos={}, blink_rate={})",
                perclos_value, blink_rate
            )));
        }

        Ok(EyeMetricsRecord {
            blink_rate,
            fatigue_index: fatigue,
            fatigue_level: fatigue_level(fatigue),
            posture: measurement.posture,
            ear_value: measurement.ear,
            perclos_value,
            head_pose: measurement.head_pose,
            timestamp: timestamp_ms,
        })
    }

    /// Start a clean session at `now_ms`. Any blink in progress is discarded.
    pub fn reset(&mut self, now_ms: f64) {
        self.perclos.reset();
        self.blink.reset(now_ms);
        self.total_blinks = 0;
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn perclos_window(&self) -> &PerclosWindow {
        &self.perclos
    }

    pub fn blink_detector(&self) -> &BlinkDetector {
        &self.blink
    }

    /// Valid blinks since the last reset
    pub fn total_blinks(&self) -> u64 {
        self.total_blinks
    }
}
