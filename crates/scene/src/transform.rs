//! Object transforms.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Translation, rotation (YXZ Tait-Bryan angles, radians), and
/// non-uniform scale.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// The model matrix: translate * rotate_y * rotate_x * rotate_z *
    /// scale.
    pub fn matrix(&self) -> Mat4 {
        let rotation =
            Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }

    /// Inverse-transpose of the upper-left 3x3, for transforming normals
    /// under non-uniform scale.
    pub fn normal_matrix(&self) -> Mat3 {
        let rotation =
            Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z);
        Mat3::from_quat(rotation) * Mat3::from_diagonal(self.scale.recip())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_by_default() {
        let transform = Transform::default();
        assert_eq!(transform.matrix(), Mat4::IDENTITY);
        assert_eq!(transform.normal_matrix(), Mat3::IDENTITY);
    }

    #[test]
    fn translation_lands_in_last_column() {
        let transform = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let m = transform.matrix();
        assert_eq!(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let transform = Transform {
            scale: Vec3::new(2.0, 1.0, 1.0),
            ..Default::default()
        };
        // A normal along x on a surface stretched in x must shrink, then
        // renormalize to the same direction.
        let n = transform.normal_matrix() * Vec3::X;
        assert!((n.normalize() - Vec3::X).length() < 1e-6);
        assert!((n.x - 0.5).abs() < 1e-6);
    }
}
