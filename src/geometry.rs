//! Geometry helpers over normalized landmark points

use crate::types::Point3;

/// Euclidean distance in 3D. NaN coordinates propagate.
#[inline]
pub fn euclidean_distance(a: &Point3, b: &Point3) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[inline]
pub fn midpoint(a: &Point3, b: &Point3) -> Point3 {
    Point3 {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
        z: (a.z + b.z) / 2.0,
    }
}

#[inline]
pub fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_3_4_5() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < 1e-12);
        assert!((euclidean_distance(&b, &a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_uses_depth() {
        let a = Point3::new(1.0, 1.0, 0.0);
        let b = Point3::new(1.0, 1.0, 2.0);
        assert!((euclidean_distance(&a, &b) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_nan_propagates() {
        let a = Point3::new(f64::NAN, 0.0, 0.0);
        assert!(euclidean_distance(&a, &Point3::default()).is_nan());
    }

    #[test]
    fn test_midpoint_and_degrees() {
        let m = midpoint(&Point3::xy(0.0, 0.0), &Point3::xy(2.0, 4.0));
        assert_eq!(m, Point3::xy(1.0, 2.0));
        assert!((to_degrees(std::f64::consts::PI) - 180.0).abs() < 1e-12);
    }
}
