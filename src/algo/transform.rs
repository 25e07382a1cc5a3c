//! Rigid rotations in degrees.
//!
//! Rotations are about the coordinate axes through the origin and compose in
//! X, Y, Z order: the Y rotation acts on the result of the X rotation.

use nalgebra::{Matrix4, Rotation3, Vector3};

use crate::mesh::Axis;

/// Homogeneous rotation about a coordinate axis.
pub fn rotation_about(axis: Axis, degrees: f64) -> Matrix4<f64> {
    Rotation3::from_axis_angle(&axis.unit(), degrees.to_radians()).to_homogeneous()
}

/// Rotation about X, then Y, then Z. Zero angles are skipped.
///
/// ```
/// use chisel::algo::transform::rotation_xyz;
/// use nalgebra::{Matrix4, Point3};
///
/// assert_eq!(rotation_xyz(0.0, 0.0, 0.0), Matrix4::identity());
///
/// let p = rotation_xyz(0.0, 0.0, 90.0).transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
/// ```
pub fn rotation_xyz(x_deg: f64, y_deg: f64, z_deg: f64) -> Matrix4<f64> {
    [(Axis::X, x_deg), (Axis::Y, y_deg), (Axis::Z, z_deg)]
        .into_iter()
        .filter(|&(_, deg)| deg != 0.0)
        .fold(Matrix4::identity(), |acc, (axis, deg)| {
            rotation_about(axis, deg) * acc
        })
}

/// Tilt a plane normal about X by `tilt_x`, then about Y by `tilt_y`.
///
/// The result is re-normalized. With both tilts zero the normal is returned
/// unchanged.
pub fn tilt_normal(normal: &Vector3<f64>, tilt_x: f64, tilt_y: f64) -> Vector3<f64> {
    if tilt_x == 0.0 && tilt_y == 0.0 {
        return *normal;
    }
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), tilt_x.to_radians());
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), tilt_y.to_radians());
    let tilted = ry * (rx * normal);
    tilted.try_normalize(f64::EPSILON).unwrap_or(tilted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn close(a: Vector3<f64>, b: Vector3<f64>) -> bool {
        (a - b).norm() < 1e-3
    }

    #[test]
    fn test_full_turn_is_identity() {
        let m = rotation_xyz(360.0, 0.0, 360.0);
        let p = Point3::new(0.3, -1.2, 2.5);
        assert!((m.transform_point(&p) - p).norm() < 1e-12);
    }

    #[test]
    fn test_order_x_then_y() {
        // X by 90 sends +Y to +Z; Y by 90 then sends +Z to +X.
        let p = rotation_xyz(90.0, 90.0, 0.0).transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert!((p - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_tilt_normal() {
        let z = Vector3::z();
        assert_eq!(tilt_normal(&z, 0.0, 0.0), z);
        assert!(close(tilt_normal(&z, 30.0, 0.0), Vector3::new(0.0, -0.5, 0.866)));
        assert!(close(tilt_normal(&z, 0.0, 30.0), Vector3::new(0.5, 0.0, 0.866)));
        assert!(close(tilt_normal(&z, 30.0, 30.0), Vector3::new(0.433, -0.5, 0.75)));
        assert!((tilt_normal(&z, 17.0, -42.0).norm() - 1.0).abs() < 1e-12);
    }
}
