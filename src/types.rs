//! Core types for the EyeRest Flux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: landmark input, per-frame measurements, and the emitted metrics record.

use serde::{Deserialize, Serialize};

/// A normalized image-space point produced by the landmark detector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    /// Depth, absent in some detector outputs
    #[serde(default)]
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Translate by a fixed offset
    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<[f64; 2]> for Point3 {
    fn from(p: [f64; 2]) -> Self {
        Self::xy(p[0], p[1])
    }
}

/// Ordered landmark points for one detected face, indexed by anatomical landmark index.
///
/// Accepts either `{x, y, z}` objects or `[x, y, z]` / `[x, y]` arrays when deserialized.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Point3>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Point3> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }
}

impl From<Vec<Point3>> for LandmarkSet {
    fn from(points: Vec<Point3>) -> Self {
        Self::new(points)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePoint {
    Object(Point3),
    Array(Vec<f64>),
}

impl<'de> Deserialize<'de> for LandmarkSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = Vec::<WirePoint>::deserialize(deserializer)?;
        let mut points = Vec::with_capacity(wire.len());
        for (i, p) in wire.into_iter().enumerate() {
            let point = match p {
                WirePoint::Object(point) => point,
                WirePoint::Array(coords) => match coords.as_slice() {
                    [x, y] => Point3::xy(*x, *y),
                    [x, y, z] => Point3::new(*x, *y, *z),
                    _ => {
                        return Err(serde::de::Error::custom(format!(
                            "landmark {} has {} coordinates, expected 2 or 3",
                            i,
                            coords.len()
                        )))
                    }
                },
            };
            points.push(point);
        }
        Ok(Self { points })
    }
}

/// Six eye landmarks in canonical order:
/// `[outer_corner, top_1, top_2, inner_corner, bottom_2, bottom_1]`
pub type EyeSample = [Point3; 6];

/// Head orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadPose {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl HeadPose {
    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

/// Posture classification
///
/// `TooClose` and `TooFar` are reserved for distance estimation and are not
/// produced by the current estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureStatus {
    Good,
    Forward,
    Tilted,
    TooClose,
    TooFar,
}

impl PostureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostureStatus::Good => "good",
            PostureStatus::Forward => "forward",
            PostureStatus::Tilted => "tilted",
            PostureStatus::TooClose => "too_close",
            PostureStatus::TooFar => "too_far",
        }
    }
}

/// Coarse fatigue band derived from the fatigue index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueLevel {
    Low,
    Moderate,
    High,
}

/// Stateless measurements taken from a single landmark set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameMeasurement {
    /// Left eye aspect ratio
    pub left_ear: f64,
    /// Right eye aspect ratio
    pub right_ear: f64,
    /// Bilateral average
    pub ear: f64,
    pub head_pose: HeadPose,
    pub posture: PostureStatus,
}

/// Metrics emitted for every accepted frame with a detected face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeMetricsRecord {
    /// Blinks per minute over the trailing rate window
    pub blink_rate: f64,
    /// Fused fatigue index in `[0, 70]`
    pub fatigue_index: f64,
    pub fatigue_level: FatigueLevel,
    pub posture: PostureStatus,
    pub ear_value: f64,
    /// Percentage of closed samples in the PERCLOS window
    pub perclos_value: f64,
    pub head_pose: HeadPose,
    /// Monotonic frame timestamp (ms)
    pub timestamp: f64,
}

/// A camera frame tagged with its monotonic capture time
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<T> {
    pub timestamp_ms: f64,
    pub data: T,
}

impl<T> Frame<T> {
    pub fn new(timestamp_ms: f64, data: T) -> Self {
        Self { timestamp_ms, data }
    }
}
