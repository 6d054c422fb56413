//! Render systems that draw into the swapchain render pass.

pub mod mesh;
pub mod point_light;

pub use mesh::MeshRenderSystem;
pub use point_light::PointLightSystem;
