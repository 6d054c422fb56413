//! Frame orchestration: the renderer, per-frame state, and the render
//! systems.

pub mod frame;
pub mod renderer;
pub mod systems;
pub mod ubo;

pub use frame::{FrameInfo, FrameTracker};
pub use renderer::Renderer;
pub use systems::{MeshRenderSystem, PointLightSystem};
pub use ubo::GlobalUbo;
