//! Face-mesh landmark indices and extraction
//!
//! The detector emits a fixed-size face mesh (468 points, or 478 with irises).
//! The pipeline reads a handful of known indices; a set that does not contain
//! them is rejected instead of being padded.

use crate::error::ComputeError;
use crate::types::{EyeSample, LandmarkSet, Point3};

/// Number of points in the standard face mesh
pub const FACE_MESH_POINTS: usize = 468;

/// Left eye, canonical EAR order
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Right eye, canonical EAR order
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

pub const NOSE_TIP: usize = 1;
pub const LEFT_EYE_OUTER: usize = 33;
pub const RIGHT_EYE_OUTER: usize = 263;
pub const LEFT_MOUTH_CORNER: usize = 61;
pub const RIGHT_MOUTH_CORNER: usize = 291;

/// Smallest landmark set that carries every index the pipeline reads
pub const MIN_LANDMARKS: usize = 388;

/// Reference points for head-pose estimation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseLandmarks {
    pub nose_tip: Point3,
    pub left_eye_outer: Point3,
    pub right_eye_outer: Point3,
    pub left_mouth: Point3,
    pub right_mouth: Point3,
}

fn point_at(landmarks: &LandmarkSet, index: usize) -> Result<Point3, ComputeError> {
    landmarks.get(index).copied().ok_or_else(|| {
        ComputeError::InsufficientLandmarks(format!(
            "index {} missing from set of {} points",
            index,
            landmarks.len()
        ))
    })
}

/// Extract one eye's six points using the given index order
pub fn eye_sample(landmarks: &LandmarkSet, indices: &[usize; 6]) -> Result<EyeSample, ComputeError> {
    let mut sample = [Point3::default(); 6];
    for (slot, &index) in sample.iter_mut().zip(indices.iter()) {
        *slot = point_at(landmarks, index)?;
    }
    Ok(sample)
}

/// Extract both eyes as `(left, right)`
pub fn eye_samples(landmarks: &LandmarkSet) -> Result<(EyeSample, EyeSample), ComputeError> {
    Ok((eye_sample(landmarks, &LEFT_EYE)?, eye_sample(landmarks, &RIGHT_EYE)?))
}

/// Extract the five head-pose reference points
pub fn pose_landmarks(landmarks: &LandmarkSet) -> Result<PoseLandmarks, ComputeError> {
    Ok(PoseLandmarks {
        nose_tip: point_at(landmarks, NOSE_TIP)?,
        left_eye_outer: point_at(landmarks, LEFT_EYE_OUTER)?,
        right_eye_outer: point_at(landmarks, RIGHT_EYE_OUTER)?,
        left_mouth: point_at(landmarks, LEFT_MOUTH_CORNER)?,
        right_mouth: point_at(landmarks, RIGHT_MOUTH_CORNER)?,
    })
}
