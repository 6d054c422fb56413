//! Camera projection and view matrices.
//!
//! Conventions: right-handed, y pointing down, depth mapped to [0, 1].

use glam::{vec4, EulerRot, Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    projection: Mat4,
    view: Mat4,
    inverse_view: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Perspective projection. `fov_y` is the vertical field of view in
    /// radians.
    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        assert!(aspect > 0.0, "aspect ratio must be positive");
        assert!(far > near, "far plane must be beyond the near plane");

        let tan_half_fov = (fov_y / 2.0).tan();
        self.projection = Mat4::from_cols(
            vec4(1.0 / (aspect * tan_half_fov), 0.0, 0.0, 0.0),
            vec4(0.0, 1.0 / tan_half_fov, 0.0, 0.0),
            vec4(0.0, 0.0, far / (far - near), 1.0),
            vec4(0.0, 0.0, -(far * near) / (far - near), 0.0),
        );
    }

    /// Orthographic projection over the given view volume.
    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Mat4::from_cols(
            vec4(2.0 / (right - left), 0.0, 0.0, 0.0),
            vec4(0.0, 2.0 / (bottom - top), 0.0, 0.0),
            vec4(0.0, 0.0, 1.0 / (far - near), 0.0),
            vec4(
                -(right + left) / (right - left),
                -(bottom + top) / (bottom - top),
                -near / (far - near),
                1.0,
            ),
        );
    }

    /// Look along `direction` from `position`.
    pub fn set_view_direction(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        assert!(
            direction.length_squared() > f32::EPSILON,
            "view direction must be non-zero"
        );
        let w = direction.normalize();
        let u = w.cross(up).normalize();
        let v = w.cross(u);
        self.set_view_basis(position, u, v, w);
    }

    /// Look at `target` from `position`.
    pub fn set_view_target(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.set_view_direction(position, target - position, up);
    }

    /// View from a position and YXZ Tait-Bryan angles, matching
    /// [`Transform`](crate::Transform) rotations.
    pub fn set_view_yxz(&mut self, position: Vec3, rotation: Vec3) {
        let q = Quat::from_euler(EulerRot::YXZ, rotation.y, rotation.x, rotation.z);
        let u = q * Vec3::X;
        let v = q * Vec3::Y;
        let w = q * Vec3::Z;
        self.set_view_basis(position, u, v, w);
    }

    fn set_view_basis(&mut self, position: Vec3, u: Vec3, v: Vec3, w: Vec3) {
        self.view = Mat4::from_cols(
            vec4(u.x, v.x, w.x, 0.0),
            vec4(u.y, v.y, w.y, 0.0),
            vec4(u.z, v.z, w.z, 0.0),
            vec4(-u.dot(position), -v.dot(position), -w.dot(position), 1.0),
        );
        self.inverse_view = Mat4::from_cols(
            vec4(u.x, u.y, u.z, 0.0),
            vec4(v.x, v.y, v.z, 0.0),
            vec4(w.x, w.y, w.z, 0.0),
            vec4(position.x, position.y, position.z, 1.0),
        );
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    #[inline]
    pub fn inverse_view(&self) -> Mat4 {
        self.inverse_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perspective_maps_near_to_zero_and_far_to_one() {
        let mut camera = Camera::new();
        camera.set_perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);

        let near = camera.projection() * vec4(0.0, 0.0, 0.1, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);

        let far = camera.projection() * vec4(0.0, 0.0, 100.0, 1.0);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn view_target_moves_target_onto_positive_z() {
        let mut camera = Camera::new();
        camera.set_view_target(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, -Vec3::Y);

        let target = camera.view() * vec4(0.0, 0.0, 0.0, 1.0);
        assert!(target.x.abs() < 1e-5);
        assert!(target.y.abs() < 1e-5);
        assert!((target.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn position_round_trips_through_inverse_view() {
        let mut camera = Camera::new();
        let position = Vec3::new(1.0, -2.0, 3.0);
        camera.set_view_yxz(position, Vec3::new(0.2, 0.5, 0.0));
        assert!((camera.inverse_view().w_axis.truncate() - position).length() < 1e-5);
    }
}
