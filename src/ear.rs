//! Eye Aspect Ratio
//!
//! `EAR = (|p2 - p6| + |p3 - p5|) / (2 * |p1 - p4|)` over the six canonical eye
//! points. Lower values mean a more closed eye.

use crate::error::ComputeError;
use crate::geometry::euclidean_distance;
use crate::types::Point3;

/// Horizontal eye widths at or below this are treated as degenerate geometry
pub const MIN_HORIZONTAL_DISTANCE: f64 = 1e-6;

/// Compute the EAR of one eye from its six ordered points.
///
/// Only the first six points are read; fewer than six is an error, as is a
/// zero-width eye.
pub fn calculate_ear(eye: &[Point3]) -> Result<f64, ComputeError> {
    let [p1, p2, p3, p4, p5, p6] = match eye {
        [p1, p2, p3, p4, p5, p6, ..] => [p1, p2, p3, p4, p5, p6],
        _ => {
            return Err(ComputeError::InvalidInput(format!(
                "eye sample needs 6 points, got {}",
                eye.len()
            )))
        }
    };

    let vertical_1 = euclidean_distance(p2, p6);
    let vertical_2 = euclidean_distance(p3, p5);
    let horizontal = euclidean_distance(p1, p4);

    if horizontal.is_nan() || horizontal <= MIN_HORIZONTAL_DISTANCE {
        return Err(ComputeError::InvalidInput(format!(
            "degenerate eye width {}",
            horizontal
        )));
    }

    Ok((vertical_1 + vertical_2) / (2.0 * horizontal))
}

/// Mean EAR of both eyes. Fails if either eye fails.
pub fn calculate_average_ear(left: &[Point3], right: &[Point3]) -> Result<f64, ComputeError> {
    let left_ear = calculate_ear(left)?;
    let right_ear = calculate_ear(right)?;
    Ok((left_ear + right_ear) / 2.0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Build an eye 0.1 wide whose lids sit `opening / 2` above and below the midline.
    /// With both lid pairs vertical the resulting EAR is `opening / 0.1`.
    pub(crate) fn eye_with_opening(opening: f64) -> [Point3; 6] {
        let half = opening / 2.0;
        [
            Point3::xy(0.0, 0.0),
            Point3::xy(0.03, -half),
            Point3::xy(0.07, -half),
            Point3::xy(0.1, 0.0),
            Point3::xy(0.07, half),
            Point3::xy(0.03, half),
        ]
    }

    #[test]
    fn test_open_eye_ear() {
        let ear = calculate_ear(&eye_with_opening(0.03)).unwrap();
        assert!((ear - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_closed_eye_ear_is_zero() {
        let ear = calculate_ear(&eye_with_opening(0.0)).unwrap();
        assert_eq!(ear, 0.0);
    }

    #[test]
    fn test_too_few_points() {
        let eye = eye_with_opening(0.03);
        assert!(matches!(
            calculate_ear(&eye[..5]),
            Err(ComputeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_width_eye_is_rejected() {
        let mut eye = eye_with_opening(0.03);
        eye[3] = eye[0];
        assert!(matches!(calculate_ear(&eye), Err(ComputeError::InvalidInput(_))));
    }

    #[test]
    fn test_nan_width_is_rejected() {
        let mut eye = eye_with_opening(0.03);
        eye[3].x = f64::NAN;
        assert!(calculate_ear(&eye).is_err());
    }

    #[test]
    fn test_average_ear() {
        let avg = calculate_average_ear(&eye_with_opening(0.02), &eye_with_opening(0.04)).unwrap();
        assert!((avg - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_average_fails_if_one_eye_fails() {
        let good = eye_with_opening(0.03);
        let mut bad = eye_with_opening(0.03);
        bad[3] = bad[0];
        assert!(calculate_average_ear(&good, &bad).is_err());
        assert!(calculate_average_ear(&bad, &good).is_err());
    }

    proptest! {
        #[test]
        fn ear_is_translation_invariant(
            opening in 0.0f64..0.06,
            dx in -10.0f64..10.0,
            dy in -10.0f64..10.0,
            dz in -10.0f64..10.0,
        ) {
            let eye = eye_with_opening(opening);
            let moved: Vec<Point3> = eye.iter().map(|p| p.offset(dx, dy, dz)).collect();

            let before = calculate_ear(&eye).unwrap();
            let after = calculate_ear(&moved).unwrap();
            prop_assert!((before - after).abs() < 1e-6);
        }
    }
}
