//! EyeRest Flux - On-device eye-fatigue metrics from facial landmarks
//!
//! Flux turns a stream of face-mesh landmark sets into eye-fatigue metrics
//! through a deterministic pipeline: landmark extraction → eye aspect ratio →
//! PERCLOS window and blink detection → head pose → fatigue fusion.
//!
//! ## Modules
//!
//! - **Pipeline**: stateless per-frame measurement and the stateful `EyeMetricsProcessor`
//! - **Worker**: `FrameWorker`, a throttled single-frame-in-flight session around an
//!   injected `LandmarkDetector`

pub mod blink;
pub mod config;
pub mod ear;
pub mod error;
pub mod fatigue;
pub mod geometry;
pub mod head_pose;
pub mod landmarks;
pub mod perclos;
pub mod pipeline;
pub mod types;
pub mod worker;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::PipelineConfig;
pub use error::ComputeError;
pub use pipeline::{measure_frame, EyeMetricsProcessor};
pub use types::{EyeMetricsRecord, FatigueLevel, Frame, HeadPose, LandmarkSet, Point3, PostureStatus};
pub use worker::{
    Clock, DropReason, FrameOutcome, FrameWorker, LandmarkDetector, ManualClock, MonotonicClock,
    SessionSummary, WorkerState,
};

/// Flux version
pub const FLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for emitted records
pub const PRODUCER_NAME: &str = "eyerest-flux";
