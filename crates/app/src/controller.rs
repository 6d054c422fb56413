//! Keyboard-driven camera movement.

use glam::Vec3;
use winit::keyboard::KeyCode;

use lantern_platform::InputState;
use lantern_scene::Transform;

const LOOK_SPEED: f32 = 1.5;
const MOVE_SPEED: f32 = 3.0;
const PITCH_LIMIT: f32 = 1.5;

/// Moves a transform in the XZ plane with WASD, vertically with Q/E, and
/// looks around with the arrow keys.
pub struct CameraController;

impl CameraController {
    pub fn update(&self, input: &InputState, dt: f32, transform: &mut Transform) {
        let mut rotate = Vec3::ZERO;
        if input.is_pressed(KeyCode::ArrowRight) {
            rotate.y += 1.0;
        }
        if input.is_pressed(KeyCode::ArrowLeft) {
            rotate.y -= 1.0;
        }
        if input.is_pressed(KeyCode::ArrowUp) {
            rotate.x -= 1.0;
        }
        if input.is_pressed(KeyCode::ArrowDown) {
            rotate.x += 1.0;
        }
        if rotate.length_squared() > f32::EPSILON {
            transform.rotation += LOOK_SPEED * dt * rotate.normalize();
        }
        transform.rotation.x = transform.rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        transform.rotation.y %= std::f32::consts::TAU;

        let yaw = transform.rotation.y;
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(forward.z, 0.0, -forward.x);
        // y points down.
        let up = Vec3::new(0.0, -1.0, 0.0);

        let mut movement = Vec3::ZERO;
        if input.is_pressed(KeyCode::KeyW) {
            movement += forward;
        }
        if input.is_pressed(KeyCode::KeyS) {
            movement -= forward;
        }
        if input.is_pressed(KeyCode::KeyD) {
            movement += right;
        }
        if input.is_pressed(KeyCode::KeyA) {
            movement -= right;
        }
        if input.is_pressed(KeyCode::KeyE) {
            movement += up;
        }
        if input.is_pressed(KeyCode::KeyQ) {
            movement -= up;
        }
        if movement.length_squared() > f32::EPSILON {
            transform.translation += MOVE_SPEED * dt * movement.normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::ElementState;

    #[test]
    fn forward_motion_follows_yaw() {
        let controller = CameraController;
        let mut input = InputState::new();
        input.handle_key(KeyCode::KeyW, ElementState::Pressed);

        let mut transform = Transform::default();
        controller.update(&input, 1.0, &mut transform);

        // Facing +z at yaw 0.
        assert!(transform.translation.z > 0.0);
        assert!(transform.translation.x.abs() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let controller = CameraController;
        let mut input = InputState::new();
        input.handle_key(KeyCode::ArrowDown, ElementState::Pressed);

        let mut transform = Transform::default();
        for _ in 0..100 {
            controller.update(&input, 0.1, &mut transform);
        }

        assert!(transform.rotation.x <= PITCH_LIMIT + 1e-6);
    }
}
