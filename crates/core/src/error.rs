//! Error types shared across the engine.

use thiserror::Error;

/// Top-level error type for engine code outside the RHI.
#[derive(Error, Debug)]
pub enum Error {
    /// Window creation or management errors
    #[error("Window error: {0}")]
    Window(String),

    /// Vulkan-related errors surfaced above the RHI layer
    #[error("Vulkan error: {0}")]
    Vulkan(String),

    /// Resource loading errors
    #[error("Resource error: {0}")]
    Resource(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using the engine's top-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
