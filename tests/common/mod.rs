//! Synthetic face meshes for integration tests

use eyerest_flux::landmarks::{
    FACE_MESH_POINTS, LEFT_EYE, LEFT_MOUTH_CORNER, NOSE_TIP, RIGHT_EYE, RIGHT_MOUTH_CORNER,
};
use eyerest_flux::{LandmarkSet, Point3};

/// A frontal 468-point face whose eyes both have the given aspect ratio
pub fn face_with_ear(ear: f64) -> LandmarkSet {
    let half = ear * 0.1 / 2.0;
    // Eye 0.1 wide: outer, top_1, top_2, inner, bottom_2, bottom_1
    let eye = [
        (0.0, 0.0),
        (0.03, -half),
        (0.07, -half),
        (0.1, 0.0),
        (0.07, half),
        (0.03, half),
    ];

    let mut points = vec![Point3::xy(0.5, 0.5); FACE_MESH_POINTS];
    for (i, &(x, y)) in eye.iter().enumerate() {
        points[LEFT_EYE[i]] = Point3::xy(0.35 + x, 0.4 + y);
        points[RIGHT_EYE[i]] = Point3::xy(0.55 + x, 0.4 + y);
    }
    points[NOSE_TIP] = Point3::xy(0.5, 0.42);
    points[LEFT_MOUTH_CORNER] = Point3::xy(0.45, 0.6);
    points[RIGHT_MOUTH_CORNER] = Point3::xy(0.55, 0.6);

    LandmarkSet::new(points)
}
