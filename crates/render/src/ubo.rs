//! Per-frame global uniform data.

use bytemuck::{Pod, Zeroable};
use glam::{vec4, Mat4, Vec4};

/// Global uniforms shared by all render systems, one buffer per frame in
/// flight. Layout matches the std140 block in the shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GlobalUbo {
    pub projection: Mat4,
    pub view: Mat4,
    pub inverse_view: Mat4,
    /// w is the ambient intensity.
    pub ambient_light_color: Vec4,
    /// w is unused padding.
    pub light_position: Vec4,
    /// w is the light intensity.
    pub light_color: Vec4,
}

impl Default for GlobalUbo {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            ambient_light_color: vec4(1.0, 1.0, 1.0, 0.02),
            light_position: vec4(-1.0, -1.0, -1.0, 0.0),
            light_color: vec4(1.0, 1.0, 1.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_has_no_implicit_padding() {
        // Three mat4s plus three vec4s, tightly packed for std140.
        assert_eq!(std::mem::size_of::<GlobalUbo>(), 3 * 64 + 3 * 16);
    }
}
