//! Head pose estimation and posture classification
//!
//! A coarse, stateless estimate from five reference landmarks: nose tip, outer
//! eye corners and mouth corners. Yaw and pitch are nose offsets normalized by
//! eye distance and face height; roll is the slope of the eye line.

use crate::error::ComputeError;
use crate::geometry::{euclidean_distance, midpoint, to_degrees};
use crate::landmarks::{pose_landmarks, PoseLandmarks};
use crate::types::{HeadPose, LandmarkSet, PostureStatus};

/// Pitch magnitude beyond which the head is leaning (degrees)
pub const PITCH_LIMIT_DEG: f64 = 15.0;

/// Yaw magnitude beyond which the head is turned (degrees)
pub const YAW_LIMIT_DEG: f64 = 20.0;

/// Roll magnitude beyond which the head is tilted (degrees)
pub const ROLL_LIMIT_DEG: f64 = 15.0;

const MIN_REFERENCE_DISTANCE: f64 = 1e-6;

/// Estimate the head pose from the five reference points
pub fn estimate_head_pose(points: &PoseLandmarks) -> Result<HeadPose, ComputeError> {
    let eye_mid = midpoint(&points.left_eye_outer, &points.right_eye_outer);
    let mouth_mid = midpoint(&points.left_mouth, &points.right_mouth);

    let eye_distance = euclidean_distance(&points.left_eye_outer, &points.right_eye_outer);
    if eye_distance.is_nan() || eye_distance <= MIN_REFERENCE_DISTANCE {
        return Err(ComputeError::InvalidInput(format!(
            "degenerate eye distance {}",
            eye_distance
        )));
    }

    let face_height = (mouth_mid.y - eye_mid.y).abs();
    if face_height.is_nan() || face_height <= MIN_REFERENCE_DISTANCE {
        return Err(ComputeError::InvalidInput(format!(
            "degenerate face height {}",
            face_height
        )));
    }

    let yaw = (points.nose_tip.x - eye_mid.x) / eye_distance;
    let pitch = (points.nose_tip.y - eye_mid.y) / face_height;
    let roll = ((points.right_eye_outer.y - points.left_eye_outer.y)
        / (points.right_eye_outer.x - points.left_eye_outer.x))
        .atan();

    Ok(HeadPose {
        pitch: to_degrees(pitch),
        yaw: to_degrees(yaw),
        roll: to_degrees(roll),
    })
}

/// Estimate the head pose directly from a face-mesh landmark set
pub fn head_pose_from_landmarks(landmarks: &LandmarkSet) -> Result<HeadPose, ComputeError> {
    estimate_head_pose(&pose_landmarks(landmarks)?)
}

/// Map a pose onto the posture taxonomy.
///
/// Pitch is checked first; a large negative pitch maps to `Good`. Only
/// `Good`, `Forward` and `Tilted` are produced.
pub fn classify_posture(pose: &HeadPose) -> PostureStatus {
    if pose.pitch.abs() > PITCH_LIMIT_DEG {
        if pose.pitch > 0.0 {
            PostureStatus::Forward
        } else {
            PostureStatus::Good
        }
    } else if pose.yaw.abs() > YAW_LIMIT_DEG || pose.roll.abs() > ROLL_LIMIT_DEG {
        PostureStatus::Tilted
    } else {
        PostureStatus::Good
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3;

    fn pose(pitch: f64, yaw: f64, roll: f64) -> HeadPose {
        HeadPose { pitch, yaw, roll }
    }

    /// Nose placed `nose_dy` below the eye line; mouth 0.2 below it.
    fn frontal_face(nose_dx: f64, nose_dy: f64) -> PoseLandmarks {
        PoseLandmarks {
            nose_tip: Point3::xy(0.5 + nose_dx, 0.4 + nose_dy),
            left_eye_outer: Point3::xy(0.4, 0.4),
            right_eye_outer: Point3::xy(0.6, 0.4),
            left_mouth: Point3::xy(0.45, 0.6),
            right_mouth: Point3::xy(0.55, 0.6),
        }
    }

    #[test]
    fn test_classify_posture() {
        assert_eq!(classify_posture(&pose(20.0, 0.0, 0.0)), PostureStatus::Forward);
        assert_eq!(classify_posture(&pose(0.0, 25.0, 0.0)), PostureStatus::Tilted);
        assert_eq!(classify_posture(&pose(0.0, 0.0, 0.0)), PostureStatus::Good);
    }

    #[test]
    fn test_classify_pitch_precedence() {
        // Pitch over the limit wins even when yaw is also over
        assert_eq!(classify_posture(&pose(30.0, 40.0, 0.0)), PostureStatus::Forward);
        assert_eq!(classify_posture(&pose(-30.0, 40.0, 0.0)), PostureStatus::Good);
        assert_eq!(classify_posture(&pose(0.0, 0.0, -16.0)), PostureStatus::Tilted);
        assert_eq!(classify_posture(&pose(15.0, 20.0, 15.0)), PostureStatus::Good);
    }

    #[test]
    fn test_centered_nose_has_zero_yaw_and_roll() {
        let head = estimate_head_pose(&frontal_face(0.0, 0.0)).unwrap();
        assert!(head.yaw.abs() < 1e-9);
        assert!(head.roll.abs() < 1e-9);
        assert!(head.pitch.abs() < 1e-9);
    }

    #[test]
    fn test_nose_offset_yaw() {
        // 0.02 / 0.2 = 0.1 rad
        let head = estimate_head_pose(&frontal_face(0.02, 0.0)).unwrap();
        assert!((head.yaw - to_degrees(0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_nose_drop_pitch() {
        // 0.1 / 0.2 = 0.5 rad, about 28.6 degrees
        let head = estimate_head_pose(&frontal_face(0.0, 0.1)).unwrap();
        assert!((head.pitch - to_degrees(0.5)).abs() < 1e-9);
        assert_eq!(classify_posture(&head), PostureStatus::Forward);
    }

    #[test]
    fn test_roll_from_eye_slope() {
        let mut face = frontal_face(0.0, 0.0);
        face.right_eye_outer.y = 0.6;
        let head = estimate_head_pose(&face).unwrap();
        assert!((head.roll - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_geometry() {
        let mut face = frontal_face(0.0, 0.0);
        face.right_eye_outer = face.left_eye_outer;
        assert!(matches!(estimate_head_pose(&face), Err(ComputeError::InvalidInput(_))));

        let mut face = frontal_face(0.0, 0.0);
        face.left_mouth.y = 0.4;
        face.right_mouth.y = 0.4;
        assert!(matches!(estimate_head_pose(&face), Err(ComputeError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_landmarks() {
        let set = LandmarkSet::new(vec![Point3::default(); 100]);
        assert!(matches!(
            head_pose_from_landmarks(&set),
            Err(ComputeError::InsufficientLandmarks(_))
        ));
    }
}
