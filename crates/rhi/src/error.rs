//! Error types for the rendering hardware interface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RhiError {
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] ash::vk::Result),

    #[error("Failed to load Vulkan library: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("Allocation error: {0}")]
    Allocator(#[from] gpu_allocator::AllocationError),

    #[error("No suitable GPU found")]
    NoSuitableGpu,

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Swapchain error: {0}")]
    Swapchain(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Shader error: {0}")]
    Shader(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),
}

pub type RhiResult<T> = Result<T, RhiError>;
