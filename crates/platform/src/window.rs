//! Window management using winit.
//!
//! This module provides window creation, drawable-extent queries, and
//! Vulkan surface creation for the renderer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window as WinitWindow, WindowAttributes};

use lantern_core::{Error, Result};

/// RAII wrapper for a Vulkan surface.
///
/// Owns a `vk::SurfaceKHR` handle and destroys it when dropped. The caller
/// must ensure the Vulkan instance outlives this surface.
pub struct Surface {
    handle: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
}

impl Surface {
    /// Get the raw Vulkan surface handle.
    ///
    /// Valid only as long as this `Surface` instance exists.
    #[inline]
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }

    /// Get a reference to the surface loader, useful for querying surface
    /// capabilities, formats, and present modes.
    #[inline]
    pub fn loader(&self) -> &ash::khr::surface::Instance {
        &self.surface_loader
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        // SAFETY: The handle was created by ash_window::create_surface and
        // the loader comes from the same instance. This is the only place
        // the surface is destroyed.
        unsafe {
            self.surface_loader.destroy_surface(self.handle, None);
        }
        tracing::debug!("Vulkan surface destroyed");
    }
}

/// A window wrapper exposing the drawable extent, a resize flag, and raw
/// handles for Vulkan surface creation.
///
/// The resize flag is set by the event loop when the OS reports a resize
/// and cleared by the renderer once the swapchain has been rebuilt.
pub struct Window {
    window: Arc<WinitWindow>,
    resized: AtomicBool,
}

impl Window {
    /// Create a new window with the given dimensions and title.
    pub fn new(event_loop: &ActiveEventLoop, width: u32, height: u32, title: &str) -> Result<Self> {
        let attrs = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(true);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| Error::Window(e.to_string()))?;

        tracing::info!("Window created: {}x{}", width, height);

        Ok(Self {
            window: Arc::new(window),
            resized: AtomicBool::new(false),
        })
    }

    /// Get a reference to the underlying winit window.
    pub fn inner(&self) -> &WinitWindow {
        &self.window
    }

    /// The current drawable extent in pixels, read live from the window.
    pub fn extent(&self) -> vk::Extent2D {
        let size = self.window.inner_size();
        vk::Extent2D {
            width: size.width,
            height: size.height,
        }
    }

    /// True while the drawable area is degenerate (zero width or height),
    /// e.g. when the window is minimized. No swapchain can be built in
    /// this state.
    pub fn is_minimized(&self) -> bool {
        let extent = self.extent();
        extent.width == 0 || extent.height == 0
    }

    /// The aspect ratio of the drawable area.
    pub fn aspect_ratio(&self) -> f32 {
        let extent = self.extent();
        extent.width as f32 / extent.height.max(1) as f32
    }

    /// Record that the OS reported a resize. Called from the event loop.
    pub fn mark_resized(&self) {
        self.resized.store(true, Ordering::Relaxed);
    }

    /// Whether a resize has been reported since the flag was last cleared.
    pub fn was_resized(&self) -> bool {
        self.resized.load(Ordering::Relaxed)
    }

    /// Clear the resize flag after the swapchain has been rebuilt.
    pub fn reset_resized(&self) {
        self.resized.store(false, Ordering::Relaxed);
    }

    /// Request a redraw of the window.
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Create a Vulkan surface for this window.
    ///
    /// Returns a RAII [`Surface`] that destroys itself when dropped.
    ///
    /// # Errors
    /// Returns an error if the window handles are invalid or surface
    /// creation is rejected by the platform.
    pub fn create_surface(&self, entry: &ash::Entry, instance: &ash::Instance) -> Result<Surface> {
        let display_handle = self
            .window
            .display_handle()
            .map_err(|e| Error::Window(format!("Failed to get display handle: {}", e)))?;

        let window_handle = self
            .window
            .window_handle()
            .map_err(|e| Error::Window(format!("Failed to get window handle: {}", e)))?;

        // SAFETY: entry and instance are valid references provided by the
        // caller and the handles come from the live winit window. The
        // surface is destroyed in Surface::drop.
        let handle = unsafe {
            ash_window::create_surface(
                entry,
                instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| Error::Vulkan(format!("Failed to create Vulkan surface: {}", e)))?
        };

        let surface_loader = ash::khr::surface::Instance::new(entry, instance);

        tracing::info!("Vulkan surface created");

        Ok(Surface {
            handle,
            surface_loader,
        })
    }
}

/// Get the Vulkan instance extensions required for surface creation on the
/// current platform.
///
/// The returned pointers reference static strings owned by the Vulkan
/// loader and remain valid for the lifetime of the process.
pub fn required_surface_extensions(
    display_handle: raw_window_handle::RawDisplayHandle,
) -> Result<Vec<*const std::ffi::c_char>> {
    let extensions = ash_window::enumerate_required_extensions(display_handle)
        .map_err(|e| Error::Vulkan(format!("Failed to enumerate surface extensions: {}", e)))?;

    Ok(extensions.to_vec())
}
