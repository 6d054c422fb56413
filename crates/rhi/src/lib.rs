//! Rendering hardware interface over ash.
//!
//! Thin RAII wrappers around the Vulkan objects the renderer needs, plus
//! the swapchain with its acquire/present protocol.

pub mod buffer;
pub mod command;
pub mod depth;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod instance;
pub mod physical_device;
pub mod pipeline;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod vertex;

pub use buffer::Buffer;
pub use command::CommandPool;
pub use depth::DepthImage;
pub use descriptor::{DescriptorPool, DescriptorSetLayout};
pub use device::Device;
pub use error::{RhiError, RhiResult};
pub use instance::Instance;
pub use physical_device::{select_physical_device, QueueFamilyIndices};
pub use pipeline::{GraphicsPipeline, GraphicsPipelineBuilder, PipelineLayout};
pub use shader::ShaderModule;
pub use swapchain::{AcquireOutcome, PresentOutcome, Swapchain, SwapchainSupport};
pub use sync::{Fence, FrameSync, Semaphore, MAX_FRAMES_IN_FLIGHT};
pub use vertex::Vertex;
