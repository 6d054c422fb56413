//! Platform layer: windowing, input, and Vulkan surface creation.

pub mod input;
pub mod window;

pub use input::InputState;
pub use window::{required_surface_extensions, Surface, Window};
