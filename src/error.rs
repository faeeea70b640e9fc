//! Error types for EyeRest Flux

use thiserror::Error;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient landmarks: {0}")]
    InsufficientLandmarks(String),

    #[error("Pipeline not ready: {0}")]
    NotReady(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Landmark detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ComputeError {
    /// Whether the worker recovers from this error at the frame boundary.
    ///
    /// Detector and configuration failures end the session; everything else
    /// only costs the current frame.
    pub fn is_frame_recoverable(&self) -> bool {
        matches!(
            self,
            ComputeError::InvalidInput(_)
                | ComputeError::InsufficientLandmarks(_)
                | ComputeError::NotReady(_)
                | ComputeError::Internal(_)
        )
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ComputeError::InvalidInput(_) => "INVALID_INPUT",
            ComputeError::InsufficientLandmarks(_) => "INSUFFICIENT_LANDMARKS",
            ComputeError::NotReady(_) => "NOT_READY",
            ComputeError::Internal(_) => "INTERNAL",
            ComputeError::DetectorUnavailable(_) => "DETECTOR_UNAVAILABLE",
            ComputeError::InvalidConfig(_) => "INVALID_CONFIG",
            ComputeError::JsonError(_) => "JSON_ERROR",
        }
    }
}
