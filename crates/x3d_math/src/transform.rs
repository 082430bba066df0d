// Transform utilities for Mat4
//
// Extends glam::Mat4 with direction transforms and builds X3D `Transform`
// node matrices from their field set.
// Note: glam::Mat4 already provides transform_point3() and inverse()

use glam::{Mat4, Quat, Vec3, Vec4};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a direction in 3D space (applies rotation and scale, but NOT translation).
    /// The result is re-normalized unless it collapses to zero.
    fn transform_direction(&self, direction: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn transform_direction(&self, direction: Vec3) -> Vec3 {
        let transformed = *self * direction.extend(0.0);
        let transformed = transformed.truncate();
        transformed.try_normalize().unwrap_or(transformed)
    }
}

/// Convert an X3D axis-angle rotation `(x, y, z, angle)` to a quaternion.
///
/// A zero-length axis yields the identity rotation.
pub fn axis_angle_to_quat(rotation: Vec4) -> Quat {
    match rotation.truncate().try_normalize() {
        Some(axis) => Quat::from_axis_angle(axis, rotation.w),
        None => Quat::IDENTITY,
    }
}

/// The field set of an X3D `Transform` node.
///
/// Rotations are axis-angle, stored as `(x, y, z, radians)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformFields {
    pub center: Vec3,
    pub rotation: Vec4,
    pub scale: Vec3,
    pub scale_orientation: Vec4,
    pub translation: Vec3,
}

impl Default for TransformFields {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            rotation: Vec4::new(0.0, 0.0, 1.0, 0.0),
            scale: Vec3::ONE,
            scale_orientation: Vec4::new(0.0, 0.0, 1.0, 0.0),
            translation: Vec3::ZERO,
        }
    }
}

impl TransformFields {
    /// Compose the local matrix.
    ///
    /// Order: `T × C × R × SR × S × -SR × -C`
    pub fn to_matrix(&self) -> Mat4 {
        let scale_orientation = axis_angle_to_quat(self.scale_orientation);

        Mat4::from_translation(self.translation)
            * Mat4::from_translation(self.center)
            * Mat4::from_quat(axis_angle_to_quat(self.rotation))
            * Mat4::from_quat(scale_orientation)
            * Mat4::from_scale(self.scale)
            * Mat4::from_quat(scale_orientation.inverse())
            * Mat4::from_translation(-self.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 0.001
    }

    #[test]
    fn test_transform_direction_ignores_translation() {
        let mat = Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0));
        let direction = Vec3::new(0.0, 0.0, -1.0);

        // Translation should NOT affect directions (w=0)
        assert_eq!(mat.transform_direction(direction), direction);
    }

    #[test]
    fn test_transform_direction_rotation() {
        // 90 degree rotation around Z axis
        let mat = Mat4::from_rotation_z(PI / 2.0);
        let transformed = mat.transform_direction(Vec3::X);

        assert!(approx(transformed, Vec3::Y));
    }

    #[test]
    fn test_transform_direction_renormalizes() {
        let mat = Mat4::from_scale(Vec3::splat(4.0));
        let transformed = mat.transform_direction(Vec3::new(0.0, 1.0, 0.0));

        assert!(approx(transformed, Vec3::Y));
    }

    #[test]
    fn test_axis_angle_zero_axis() {
        let q = axis_angle_to_quat(Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(q, Quat::IDENTITY);
    }

    #[test]
    fn test_default_fields_identity() {
        let mat = TransformFields::default().to_matrix();
        assert!(mat.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_translation_only() {
        let fields = TransformFields {
            translation: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let p = fields.to_matrix().transform_point3(Vec3::ZERO);

        assert!(approx(p, Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_rotation_about_center() {
        // Rotating (2,0,0) by 180 degrees about Z around center (1,0,0) lands on the origin
        let fields = TransformFields {
            center: Vec3::new(1.0, 0.0, 0.0),
            rotation: Vec4::new(0.0, 0.0, 1.0, PI),
            ..Default::default()
        };
        let p = fields.to_matrix().transform_point3(Vec3::new(2.0, 0.0, 0.0));

        assert!(approx(p, Vec3::ZERO));
    }

    #[test]
    fn test_scale_about_center() {
        let fields = TransformFields {
            center: Vec3::new(1.0, 1.0, 1.0),
            scale: Vec3::splat(2.0),
            ..Default::default()
        };
        // The center is a fixed point of the scale
        let m = fields.to_matrix();
        assert!(approx(m.transform_point3(Vec3::ONE), Vec3::ONE));
        assert!(approx(m.transform_point3(Vec3::new(2.0, 1.0, 1.0)), Vec3::new(3.0, 1.0, 1.0)));
    }

    #[test]
    fn test_scale_orientation_cancels_for_uniform_scale() {
        let fields = TransformFields {
            scale: Vec3::splat(3.0),
            scale_orientation: Vec4::new(0.0, 1.0, 0.0, PI / 3.0),
            ..Default::default()
        };
        let p = fields.to_matrix().transform_point3(Vec3::new(1.0, 2.0, 3.0));

        assert!(approx(p, Vec3::new(3.0, 6.0, 9.0)));
    }

    #[test]
    fn test_mat4_inverse_round_trip() {
        let fields = TransformFields {
            translation: Vec3::new(10.0, 20.0, 30.0),
            rotation: Vec4::new(0.0, 1.0, 0.0, PI / 4.0),
            ..Default::default()
        };
        let mat = fields.to_matrix();
        let point = Vec3::new(5.0, 3.0, 2.0);
        let back = mat.inverse().transform_point3(mat.transform_point3(point));

        assert!(approx(back, point));
    }
}
