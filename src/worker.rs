//! Frame scheduler and worker loop
//!
//! `FrameWorker` owns one monitoring session: it throttles incoming frames to
//! the target rate, hands accepted frames to the injected landmark detector,
//! runs the metrics pipeline, and reports one `FrameOutcome` per frame.
//!
//! At most one frame is in flight. A frame that arrives while another is
//! being processed is dropped, never queued. Per-frame failures are reported
//! as outcomes and never end the session.
//!
//! Lifecycle: `Idle → Initializing → Ready → Processing → Stopped`, with
//! `cleanup` returning to `Idle` from any state.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::ComputeError;
use crate::pipeline::EyeMetricsProcessor;
use crate::types::{EyeMetricsRecord, Frame, LandmarkSet};

/// External face-landmark detection capability, injected at `init`.
pub trait LandmarkDetector: Send + Sync {
    /// Frame payload the detector consumes (image buffer, replayed landmarks, ...)
    type Frame;

    /// Load or warm up the underlying model. Failure is fatal for `init`.
    fn load(&self) -> Result<(), ComputeError>;

    /// Landmarks of the first detected face, or `None` when no face is visible
    fn detect(&self, frame: &Self::Frame) -> Result<Option<LandmarkSet>, ComputeError>;
}

/// Monotonic millisecond clock
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> f64;
}

/// Wall-independent clock backed by `Instant`
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually driven clock for replays and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(now_ms: f64) -> Self {
        Self {
            bits: AtomicU64::new(now_ms.to_bits()),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.bits.store(now_ms.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.set(self.now_ms() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Idle,
    Initializing,
    Ready,
    Processing,
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Idle => "idle",
            WorkerState::Initializing => "initializing",
            WorkerState::Ready => "ready",
            WorkerState::Processing => "processing",
            WorkerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Why a frame was not processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Another frame was still in flight
    Busy,
    /// Arrived sooner than the target frame interval
    Throttled,
    /// The session was stopped or restarted while the frame was in flight
    Cancelled,
}

/// Result of submitting one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameOutcome {
    Metrics { record: EyeMetricsRecord },
    NoFace { timestamp_ms: f64 },
    Dropped { timestamp_ms: f64, reason: DropReason },
    Error { timestamp_ms: f64, code: String, message: String },
}

impl FrameOutcome {
    fn error(timestamp_ms: f64, err: &ComputeError) -> Self {
        FrameOutcome::Error {
            timestamp_ms,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn record(&self) -> Option<&EyeMetricsRecord> {
        match self {
            FrameOutcome::Metrics { record } => Some(record),
            _ => None,
        }
    }
}

/// Per-session counters, returned as the final status on `stop`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub frames_received: u64,
    pub frames_accepted: u64,
    pub frames_throttled: u64,
    pub frames_dropped_busy: u64,
    pub frames_cancelled: u64,
    pub frames_without_face: u64,
    pub frame_errors: u64,
    pub records_emitted: u64,
    pub blink_count: u64,
    pub mean_fatigue_index: Option<f64>,
    pub peak_fatigue_index: Option<f64>,
    pub last_record: Option<EyeMetricsRecord>,
}

impl SessionSummary {
    fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            stopped_at: None,
            frames_received: 0,
            frames_accepted: 0,
            frames_throttled: 0,
            frames_dropped_busy: 0,
            frames_cancelled: 0,
            frames_without_face: 0,
            frame_errors: 0,
            records_emitted: 0,
            blink_count: 0,
            mean_fatigue_index: None,
            peak_fatigue_index: None,
            last_record: None,
        }
    }

    fn record_metrics(&mut self, record: &EyeMetricsRecord, blink_count: u64) {
        let n = self.records_emitted as f64;
        let mean = self.mean_fatigue_index.unwrap_or(0.0);
        self.mean_fatigue_index = Some((mean * n + record.fatigue_index) / (n + 1.0));
        self.peak_fatigue_index = Some(
            self.peak_fatigue_index
                .map_or(record.fatigue_index, |peak| peak.max(record.fatigue_index)),
        );
        self.records_emitted += 1;
        self.blink_count = blink_count;
        self.last_record = Some(record.clone());
    }
}

struct Session {
    summary: SessionSummary,
    last_accepted_ms: Option<f64>,
    /// Session time starts at the first accepted frame, in the frames' own time base
    anchored: bool,
}

struct Shared<D> {
    state: WorkerState,
    config: PipelineConfig,
    detector: Option<Arc<D>>,
    processor: Option<EyeMetricsProcessor>,
    session: Option<Session>,
}

/// Clears the in-flight flag when the frame finishes, however it finishes
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-session frame worker
pub struct FrameWorker<D: LandmarkDetector> {
    clock: Arc<dyn Clock>,
    in_flight: AtomicBool,
    shared: Mutex<Shared<D>>,
}

impl<D: LandmarkDetector> Default for FrameWorker<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: LandmarkDetector> FrameWorker<D> {
    /// Create an idle worker on the monotonic clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(MonotonicClock::default()))
    }

    /// Create an idle worker on the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            in_flight: AtomicBool::new(false),
            shared: Mutex::new(Shared {
                state: WorkerState::Idle,
                config: PipelineConfig::default(),
                detector: None,
                processor: None,
                session: None,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Shared<D>>, ComputeError> {
        self.shared
            .lock()
            .map_err(|_| ComputeError::Internal("worker state lock poisoned".to_string()))
    }

    pub fn state(&self) -> WorkerState {
        self.lock().map(|s| s.state).unwrap_or(WorkerState::Idle)
    }

    /// Load the detector and allocate session state.
    ///
    /// On failure the worker stays `Idle`.
    pub fn init(&self, config: PipelineConfig, detector: Arc<D>) -> Result<(), ComputeError> {
        let mut shared = self.lock()?;
        if shared.state != WorkerState::Idle {
            return Err(ComputeError::InvalidInput(format!(
                "init requires an idle worker, state is {}",
                shared.state
            )));
        }

        config.validate()?;
        shared.state = WorkerState::Initializing;
        tracing::info!(target_fps = config.target_fps, window_size = config.window_size, "initializing worker");

        if let Err(e) = detector.load() {
            shared.state = WorkerState::Idle;
            tracing::error!(error = %e, "landmark detector failed to load");
            return Err(match e {
                ComputeError::DetectorUnavailable(_) => e,
                other => ComputeError::DetectorUnavailable(other.to_string()),
            });
        }

        shared.processor = Some(EyeMetricsProcessor::new(config.clone())?);
        shared.config = config;
        shared.detector = Some(detector);
        shared.state = WorkerState::Ready;
        tracing::info!("worker ready");
        Ok(())
    }

    /// Begin a clean session. Valid from `Ready`, `Processing` or `Stopped`.
    ///
    /// Session time for the blink rate is measured from the first accepted
    /// frame's timestamp, so frames may use any monotonic time base.
    pub fn start(&self) -> Result<(), ComputeError> {
        let mut shared = self.lock()?;
        match shared.state {
            WorkerState::Ready | WorkerState::Processing | WorkerState::Stopped => {}
            state => {
                return Err(ComputeError::NotReady(format!(
                    "cannot start from state {}",
                    state
                )))
            }
        }

        let now = self.clock.now_ms();
        let processor = shared
            .processor
            .as_mut()
            .ok_or_else(|| ComputeError::Internal("initialized worker has no processor".to_string()))?;
        processor.reset(now);

        let session = Session {
            summary: SessionSummary::new(),
            last_accepted_ms: None,
            anchored: false,
        };
        tracing::info!(session_id = %session.summary.session_id, "monitoring started");
        shared.session = Some(session);
        shared.state = WorkerState::Processing;
        Ok(())
    }

    /// Submit one frame.
    pub fn process(&self, frame: &Frame<D::Frame>) -> FrameOutcome {
        let timestamp_ms = frame.timestamp_ms;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            if let Ok(mut shared) = self.lock() {
                let processing = shared.state == WorkerState::Processing;
                if let Some(session) = shared.session.as_mut().filter(|_| processing) {
                    session.summary.frames_received += 1;
                    session.summary.frames_dropped_busy += 1;
                }
            }
            tracing::debug!(timestamp_ms, reason = "busy", "frame dropped");
            return FrameOutcome::Dropped {
                timestamp_ms,
                reason: DropReason::Busy,
            };
        }
        let _in_flight = InFlight(&self.in_flight);

        let (detector, session_id) = match self.accept(timestamp_ms) {
            Ok(Ok(accepted)) => accepted,
            Ok(Err(reason)) => {
                tracing::debug!(timestamp_ms, reason = ?reason, "frame dropped");
                return FrameOutcome::Dropped {
                    timestamp_ms,
                    reason,
                };
            }
            Err(e) => {
                tracing::warn!(timestamp_ms, error = %e, "frame rejected");
                return FrameOutcome::error(timestamp_ms, &e);
            }
        };

        // Detection runs without holding the state lock
        let detected = detector.detect(&frame.data);

        match self.finish(timestamp_ms, session_id, detected) {
            Ok(outcome) => outcome,
            Err(e) => FrameOutcome::error(timestamp_ms, &e),
        }
    }

    /// Throttle check and bookkeeping for a frame entering the pipeline
    fn accept(&self, timestamp_ms: f64) -> Result<Result<(Arc<D>, Uuid), DropReason>, ComputeError> {
        let mut guard = self.lock()?;
        let shared = &mut *guard;
        if shared.state != WorkerState::Processing {
            return Err(ComputeError::NotReady(format!(
                "frame submitted while {}",
                shared.state
            )));
        }

        let interval = shared.config.frame_interval_ms();
        let detector = shared
            .detector
            .clone()
            .ok_or_else(|| ComputeError::Internal("processing without a detector".to_string()))?;
        let session = shared
            .session
            .as_mut()
            .ok_or_else(|| ComputeError::Internal("processing without a session".to_string()))?;

        session.summary.frames_received += 1;
        if let Some(last) = session.last_accepted_ms {
            if timestamp_ms - last < interval {
                session.summary.frames_throttled += 1;
                return Ok(Err(DropReason::Throttled));
            }
        }
        session.last_accepted_ms = Some(timestamp_ms);
        session.summary.frames_accepted += 1;

        if !session.anchored {
            let processor = shared.processor.as_mut().ok_or_else(|| {
                ComputeError::Internal("processing without a processor".to_string())
            })?;
            processor.reset(timestamp_ms);
            session.anchored = true;
        }

        Ok(Ok((detector, session.summary.session_id)))
    }

    fn finish(
        &self,
        timestamp_ms: f64,
        session_id: Uuid,
        detected: Result<Option<LandmarkSet>, ComputeError>,
    ) -> Result<FrameOutcome, ComputeError> {
        let mut guard = self.lock()?;
        let shared = &mut *guard;

        let session = match shared.session.as_mut() {
            Some(s) if shared.state == WorkerState::Processing && s.summary.session_id == session_id => s,
            Some(s) => {
                s.summary.frames_cancelled += 1;
                return Ok(FrameOutcome::Dropped {
                    timestamp_ms,
                    reason: DropReason::Cancelled,
                });
            }
            None => {
                return Ok(FrameOutcome::Dropped {
                    timestamp_ms,
                    reason: DropReason::Cancelled,
                })
            }
        };
        let processor = shared
            .processor
            .as_mut()
            .ok_or_else(|| ComputeError::Internal("processing without a processor".to_string()))?;

        let result = match detected {
            Ok(None) => {
                session.summary.frames_without_face += 1;
                tracing::debug!(timestamp_ms, "no face detected");
                return Ok(FrameOutcome::NoFace { timestamp_ms });
            }
            Ok(Some(landmarks)) => processor.process(&landmarks, timestamp_ms),
            Err(e) => Err(e),
        };

        match result {
            Ok(record) => {
                session.summary.record_metrics(&record, processor.total_blinks());
                Ok(FrameOutcome::Metrics { record })
            }
            Err(e) => {
                session.summary.frame_errors += 1;
                if e.is_frame_recoverable() {
                    tracing::warn!(timestamp_ms, error = %e, "frame processing failed");
                } else {
                    tracing::error!(timestamp_ms, error = %e, "landmark detector failed mid-session");
                }
                Ok(FrameOutcome::error(timestamp_ms, &e))
            }
        }
    }

    /// Snapshot of the running session's counters
    pub fn session_summary(&self) -> Option<SessionSummary> {
        self.lock()
            .ok()
            .and_then(|s| s.session.as_ref().map(|session| session.summary.clone()))
    }

    /// Stop accepting frames and return the final session status.
    ///
    /// Safe in any state; only a `Processing` worker has a session to report.
    /// An open blink is discarded.
    pub fn stop(&self) -> Option<SessionSummary> {
        let mut shared = self.lock().ok()?;
        if shared.state != WorkerState::Processing {
            return None;
        }

        let now = self.clock.now_ms();
        if let Some(processor) = shared.processor.as_mut() {
            processor.reset(now);
        }
        shared.state = WorkerState::Stopped;

        let mut summary = shared.session.as_ref()?.summary.clone();
        summary.stopped_at = Some(Utc::now());
        tracing::info!(
            session_id = %summary.session_id,
            records = summary.records_emitted,
            frames = summary.frames_received,
            "monitoring stopped"
        );
        if let Some(session) = shared.session.as_mut() {
            session.summary = summary.clone();
        }
        Some(summary)
    }

    /// Release the detector and all session state. Safe in any state.
    pub fn cleanup(&self) {
        if let Ok(mut shared) = self.lock() {
            shared.detector = None;
            shared.processor = None;
            shared.session = None;
            shared.state = WorkerState::Idle;
            tracing::info!("worker cleaned up");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::face_with_ear;
    use pretty_assertions::assert_eq;

    /// Detector whose frames already carry the landmarks
    struct PassThrough {
        fail_load: bool,
    }

    impl LandmarkDetector for PassThrough {
        type Frame = Option<LandmarkSet>;

        fn load(&self) -> Result<(), ComputeError> {
            if self.fail_load {
                Err(ComputeError::Internal("model missing".to_string()))
            } else {
                Ok(())
            }
        }

        fn detect(&self, frame: &Self::Frame) -> Result<Option<LandmarkSet>, ComputeError> {
            Ok(frame.clone())
        }
    }

    fn ready_worker() -> (FrameWorker<PassThrough>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0.0));
        let worker = FrameWorker::with_clock(clock.clone());
        worker
            .init(PipelineConfig::default(), Arc::new(PassThrough { fail_load: false }))
            .unwrap();
        (worker, clock)
    }

    fn face_frame(t: f64, ear: f64) -> Frame<Option<LandmarkSet>> {
        Frame::new(t, Some(face_with_ear(ear)))
    }

    #[test]
    fn test_lifecycle_transitions() {
        let (worker, _clock) = ready_worker();
        assert_eq!(worker.state(), WorkerState::Ready);

        worker.start().unwrap();
        assert_eq!(worker.state(), WorkerState::Processing);

        let summary = worker.stop().unwrap();
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert!(summary.stopped_at.is_some());

        worker.cleanup();
        assert_eq!(worker.state(), WorkerState::Idle);
    }

    #[test]
    fn test_failed_init_stays_idle() {
        let worker: FrameWorker<PassThrough> = FrameWorker::new();
        let result = worker.init(PipelineConfig::default(), Arc::new(PassThrough { fail_load: true }));

        assert!(matches!(result, Err(ComputeError::DetectorUnavailable(_))));
        assert_eq!(worker.state(), WorkerState::Idle);
    }

    #[test]
    fn test_invalid_config_stays_idle() {
        let worker: FrameWorker<PassThrough> = FrameWorker::new();
        let config = PipelineConfig {
            target_fps: 0.0,
            ..PipelineConfig::default()
        };
        let result = worker.init(config, Arc::new(PassThrough { fail_load: false }));

        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
        assert_eq!(worker.state(), WorkerState::Idle);
    }

    #[test]
    fn test_start_before_init_is_not_ready() {
        let worker: FrameWorker<PassThrough> = FrameWorker::new();
        assert!(matches!(worker.start(), Err(ComputeError::NotReady(_))));
    }

    #[test]
    fn test_frame_before_start_is_not_ready() {
        let (worker, _clock) = ready_worker();
        match worker.process(&face_frame(0.0, 0.3)) {
            FrameOutcome::Error { code, .. } => assert_eq!(code, "NOT_READY"),
            other => panic!("expected NOT_READY error, got {:?}", other),
        }
    }

    #[test]
    fn test_emits_record_per_face_frame() {
        let (worker, _clock) = ready_worker();
        worker.start().unwrap();

        let outcome = worker.process(&face_frame(0.0, 0.3));
        let record = outcome.record().expect("metrics record");
        assert!((record.ear_value - 0.3).abs() < 1e-9);
        assert_eq!(record.timestamp, 0.0);
    }

    #[test]
    fn test_no_face_is_silent() {
        let (worker, _clock) = ready_worker();
        worker.start().unwrap();

        assert_eq!(
            worker.process(&Frame::new(0.0, None)),
            FrameOutcome::NoFace { timestamp_ms: 0.0 }
        );
        let summary = worker.session_summary().unwrap();
        assert_eq!(summary.frames_without_face, 1);
        assert_eq!(summary.records_emitted, 0);
    }

    #[test]
    fn test_throttles_to_target_rate() {
        let (worker, _clock) = ready_worker();
        worker.start().unwrap();

        assert!(worker.process(&face_frame(0.0, 0.3)).record().is_some());
        assert_eq!(
            worker.process(&face_frame(33.0, 0.3)),
            FrameOutcome::Dropped {
                timestamp_ms: 33.0,
                reason: DropReason::Throttled
            }
        );
        assert!(worker.process(&face_frame(67.0, 0.3)).record().is_some());

        let summary = worker.session_summary().unwrap();
        assert_eq!(summary.frames_received, 3);
        assert_eq!(summary.frames_accepted, 2);
        assert_eq!(summary.frames_throttled, 1);
    }

    #[test]
    fn test_bad_frame_does_not_end_session() {
        let (worker, _clock) = ready_worker();
        worker.start().unwrap();

        let short = Frame::new(0.0, Some(LandmarkSet::new(vec![Default::default(); 20])));
        match worker.process(&short) {
            FrameOutcome::Error { code, .. } => assert_eq!(code, "INSUFFICIENT_LANDMARKS"),
            other => panic!("expected error outcome, got {:?}", other),
        }

        assert_eq!(worker.state(), WorkerState::Processing);
        assert!(worker.process(&face_frame(100.0, 0.3)).record().is_some());
        assert_eq!(worker.session_summary().unwrap().frame_errors, 1);
    }

    #[test]
    fn test_frames_after_stop_are_refused() {
        let (worker, _clock) = ready_worker();
        worker.start().unwrap();
        worker.stop();

        assert!(matches!(
            worker.process(&face_frame(0.0, 0.3)),
            FrameOutcome::Error { .. }
        ));
    }

    #[test]
    fn test_restart_resets_session_state() {
        let (worker, clock) = ready_worker();
        worker.start().unwrap();
        worker.process(&face_frame(0.0, 0.1));
        let first = worker.stop().unwrap();
        assert_eq!(first.records_emitted, 1);

        clock.set(5_000.0);
        worker.start().unwrap();
        let summary = worker.session_summary().unwrap();
        assert_ne!(summary.session_id, first.session_id);
        assert_eq!(summary.records_emitted, 0);

        // PERCLOS window starts empty again
        let record = worker.process(&face_frame(5_000.0, 0.3)).record().cloned().unwrap();
        assert_eq!(record.perclos_value, 0.0);
    }

    #[test]
    fn test_stop_discards_open_blink() {
        let (worker, clock) = ready_worker();
        worker.start().unwrap();
        worker.process(&face_frame(1_000.0, 0.1));
        worker.stop();

        clock.set(1_100.0);
        worker.start().unwrap();
        worker.process(&face_frame(1_200.0, 0.3));
        assert_eq!(worker.session_summary().unwrap().blink_count, 0);
    }

    #[test]
    fn test_session_time_follows_frame_timestamps() {
        let worker: FrameWorker<PassThrough> = FrameWorker::new();
        worker
            .init(PipelineConfig::default(), Arc::new(PassThrough { fail_load: false }))
            .unwrap();
        worker.start().unwrap();

        // Camera timestamps far from the worker clock's origin
        let t0 = 3_600_000.0;
        worker.process(&face_frame(t0, 0.3));
        worker.process(&face_frame(t0 + 100.0, 0.1));
        let record = worker.process(&face_frame(t0 + 250.0, 0.3)).record().cloned().unwrap();

        assert_eq!(worker.session_summary().unwrap().blink_count, 1);
        // Only 250 ms of session time
        assert_eq!(record.blink_rate, 0.0);

        let record = worker.process(&face_frame(t0 + 2_000.0, 0.3)).record().cloned().unwrap();
        assert!((record.blink_rate - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_busy_drop_after_stop_is_not_counted() {
        let (worker, _clock) = ready_worker();
        worker.start().unwrap();
        worker.process(&face_frame(0.0, 0.3));
        let summary = worker.stop().unwrap();

        worker.in_flight.store(true, Ordering::Release);
        assert_eq!(
            worker.process(&face_frame(100.0, 0.3)),
            FrameOutcome::Dropped {
                timestamp_ms: 100.0,
                reason: DropReason::Busy
            }
        );
        worker.in_flight.store(false, Ordering::Release);

        let after = worker.session_summary().unwrap();
        assert_eq!(after.frames_received, summary.frames_received);
        assert_eq!(after.frames_dropped_busy, 0);
    }

    #[test]
    fn test_stop_and_cleanup_safe_in_any_state() {
        let worker: FrameWorker<PassThrough> = FrameWorker::new();
        assert!(worker.stop().is_none());
        worker.cleanup();
        worker.cleanup();
        assert_eq!(worker.state(), WorkerState::Idle);
    }

    #[test]
    fn test_summary_tracks_fatigue() {
        let (worker, _clock) = ready_worker();
        worker.start().unwrap();
        worker.process(&face_frame(0.0, 0.3));
        worker.process(&face_frame(100.0, 0.15));

        let summary = worker.stop().unwrap();
        assert_eq!(summary.records_emitted, 2);
        let mean = summary.mean_fatigue_index.unwrap();
        let peak = summary.peak_fatigue_index.unwrap();
        assert!(peak >= mean);
        assert_eq!(summary.last_record.unwrap().timestamp, 100.0);
    }
}
