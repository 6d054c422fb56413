//! The frame coordinator.
//!
//! Owns the swapchain, the command pool, and one command buffer per
//! swapchain image, and drives the begin/end frame protocol including
//! swapchain recreation on resize and surface loss.

use std::sync::Arc;
use std::time::Duration;

use ash::vk;

use lantern_platform::{Surface, Window};
use lantern_rhi::{
    AcquireOutcome, CommandPool, Device, Instance, PresentOutcome, RhiResult, Swapchain,
};

use crate::frame::FrameTracker;

/// Sleep interval while waiting for a minimized window to regain a
/// drawable area.
const MINIMIZED_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Number of minimized-window polls before warning that the wait looks
/// stuck.
const MINIMIZED_WARN_POLLS: u32 = 500;

pub struct Renderer {
    device: Arc<Device>,
    command_pool: CommandPool,
    /// One command buffer per swapchain image, indexed by image index.
    command_buffers: Vec<vk::CommandBuffer>,
    swapchain: Option<Swapchain>,
    tracker: FrameTracker,
}

impl Renderer {
    pub fn new(
        instance: &Instance,
        device: Arc<Device>,
        window: &Window,
        surface: &Surface,
    ) -> RhiResult<Self> {
        let swapchain = Swapchain::new(
            instance.handle(),
            device.clone(),
            surface.loader(),
            surface.handle(),
            window.extent(),
        )?;

        let command_pool = CommandPool::new(device.clone())?;
        let command_buffers = command_pool.allocate(swapchain.image_count() as u32)?;

        Ok(Self {
            device,
            command_pool,
            command_buffers,
            swapchain: Some(swapchain),
            tracker: FrameTracker::new(),
        })
    }

    fn swapchain(&self) -> &Swapchain {
        self.swapchain.as_ref().expect("swapchain missing")
    }

    /// Start recording a frame.
    ///
    /// Returns the command buffer to record into, or `None` when the
    /// swapchain was out of date and has been recreated; the caller skips
    /// this frame and tries again next iteration.
    ///
    /// # Panics
    /// Panics if a frame is already in progress.
    pub fn begin_frame(
        &mut self,
        window: &Window,
        instance: &Instance,
        surface: &Surface,
    ) -> RhiResult<Option<vk::CommandBuffer>> {
        assert!(
            !self.tracker.is_recording(),
            "begin_frame called while a frame is in progress"
        );

        let outcome = self
            .swapchain
            .as_mut()
            .expect("swapchain missing")
            .acquire_next_image()?;

        let image_index = match outcome {
            AcquireOutcome::Acquired { image_index, .. } => image_index,
            AcquireOutcome::OutOfDate => {
                tracing::debug!("Swapchain out of date on acquire, recreating");
                self.recreate_swapchain(window, instance, surface)?;
                return Ok(None);
            }
        };

        self.tracker.begin(image_index);

        let command_buffer = self.command_buffers[image_index as usize];
        let begin_info = vk::CommandBufferBeginInfo::default();
        // SAFETY: the buffer's previous submission finished; the fence
        // wait in acquire_next_image and the per-image fence in
        // submit_and_present guarantee it.
        unsafe {
            self.device.handle().reset_command_buffer(
                command_buffer,
                vk::CommandBufferResetFlags::empty(),
            )?;
            self.device
                .handle()
                .begin_command_buffer(command_buffer, &begin_info)?;
        }

        Ok(Some(command_buffer))
    }

    /// Finish recording, submit, and present the current frame.
    ///
    /// Recreates the swapchain when presentation reports it stale or the
    /// window was resized since the last frame.
    ///
    /// # Panics
    /// Panics if no frame is in progress.
    pub fn end_frame(
        &mut self,
        window: &Window,
        instance: &Instance,
        surface: &Surface,
    ) -> RhiResult<()> {
        let image_index = self.tracker.end();
        let command_buffer = self.command_buffers[image_index as usize];

        // SAFETY: the buffer is in the recording state since begin_frame.
        unsafe {
            self.device.handle().end_command_buffer(command_buffer)?;
        }

        let outcome = self
            .swapchain
            .as_mut()
            .expect("swapchain missing")
            .submit_and_present(command_buffer, image_index)?;

        let stale = matches!(
            outcome,
            PresentOutcome::OutOfDate | PresentOutcome::Suboptimal
        );
        if stale || window.was_resized() {
            tracing::debug!(?outcome, resized = window.was_resized(), "Recreating swapchain");
            window.reset_resized();
            self.recreate_swapchain(window, instance, surface)?;
        }

        Ok(())
    }

    /// Begin the swapchain render pass on the current frame's command
    /// buffer, clearing color and depth and setting viewport and scissor.
    ///
    /// # Panics
    /// Panics if no frame is in progress or `command_buffer` is not the
    /// one returned by `begin_frame`.
    pub fn begin_render_pass(&self, command_buffer: vk::CommandBuffer) {
        let image_index = self.tracker.image_index();
        assert_eq!(
            command_buffer, self.command_buffers[image_index as usize],
            "render pass must target the current frame's command buffer"
        );

        let swapchain = self.swapchain();
        let extent = swapchain.extent();

        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: [0.01, 0.01, 0.01, 1.0],
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            },
        ];

        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(swapchain.render_pass())
            .framebuffer(swapchain.framebuffer(image_index))
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .clear_values(&clear_values);

        let viewport = vk::Viewport::default()
            .width(extent.width as f32)
            .height(extent.height as f32)
            .min_depth(0.0)
            .max_depth(1.0);
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };

        // SAFETY: the command buffer is recording and outside a render
        // pass.
        unsafe {
            self.device.handle().cmd_begin_render_pass(
                command_buffer,
                &begin_info,
                vk::SubpassContents::INLINE,
            );
            self.device
                .handle()
                .cmd_set_viewport(command_buffer, 0, &[viewport]);
            self.device
                .handle()
                .cmd_set_scissor(command_buffer, 0, &[scissor]);
        }
    }

    /// End the swapchain render pass.
    ///
    /// # Panics
    /// Panics if no frame is in progress or `command_buffer` is not the
    /// one returned by `begin_frame`.
    pub fn end_render_pass(&self, command_buffer: vk::CommandBuffer) {
        let image_index = self.tracker.image_index();
        assert_eq!(
            command_buffer, self.command_buffers[image_index as usize],
            "render pass must target the current frame's command buffer"
        );

        // SAFETY: the command buffer is recording inside a render pass.
        unsafe {
            self.device.handle().cmd_end_render_pass(command_buffer);
        }
    }

    fn recreate_swapchain(
        &mut self,
        window: &Window,
        instance: &Instance,
        surface: &Surface,
    ) -> RhiResult<()> {
        // A minimized window has no drawable area; wait until it comes
        // back before touching the swapchain. This relies on the backend
        // updating the inner size without the event loop pumping; on
        // backends that only refresh it during event dispatch the loop
        // would not see the window come back, so report a stuck wait.
        let mut polls = 0u32;
        while window.is_minimized() {
            std::thread::sleep(MINIMIZED_POLL_INTERVAL);
            polls += 1;
            if polls == MINIMIZED_WARN_POLLS {
                tracing::warn!(
                    "window drawable area still zero-sized after {:?}; \
                     waiting for the compositor to report a usable size",
                    MINIMIZED_POLL_INTERVAL * polls
                );
            }
        }

        self.device.wait_idle()?;

        let previous = self.swapchain.take().expect("swapchain missing");

        let swapchain = Swapchain::from_previous(
            instance.handle(),
            self.device.clone(),
            surface.loader(),
            surface.handle(),
            window.extent(),
            previous,
        )?;

        if must_reallocate_command_buffers(self.command_buffers.len(), swapchain.image_count()) {
            self.command_pool.free(&self.command_buffers);
            self.command_buffers = self.command_pool.allocate(swapchain.image_count() as u32)?;
        }

        self.swapchain = Some(swapchain);
        Ok(())
    }

    /// Render pass compatible with every swapchain this renderer creates.
    ///
    /// The recreation path rejects format changes, so pipelines built
    /// against this pass stay valid across resizes.
    pub fn render_pass(&self) -> vk::RenderPass {
        self.swapchain().render_pass()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.swapchain().aspect_ratio()
    }

    /// The sync-slot index of the frame being recorded, for selecting
    /// per-frame uniform buffers and descriptor sets.
    pub fn frame_index(&self) -> usize {
        self.swapchain().frame_index()
    }

    pub fn is_frame_in_progress(&self) -> bool {
        self.tracker.is_recording()
    }

    /// The command buffer of the frame being recorded.
    ///
    /// # Panics
    /// Panics if no frame is in progress.
    pub fn current_command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffers[self.tracker.image_index() as usize]
    }

    /// Block until the GPU is idle, typically before teardown.
    pub fn wait_idle(&self) -> RhiResult<()> {
        self.device.wait_idle()
    }
}

/// Whether the per-image command buffer batch must be freed and
/// reallocated for a swapchain holding `image_count` images. A batch of
/// the right size is reused across recreation.
fn must_reallocate_command_buffers(allocated: usize, image_count: usize) -> bool {
    allocated != image_count
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            tracing::warn!("wait_idle failed during renderer teardown: {}", e);
        }
        self.command_pool.free(&self.command_buffers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconcile(allocated: &mut usize, image_count: usize) -> bool {
        let reallocated = must_reallocate_command_buffers(*allocated, image_count);
        if reallocated {
            *allocated = image_count;
        }
        reallocated
    }

    #[test]
    fn batch_reused_when_image_count_is_stable() {
        let mut allocated = 3;
        assert!(!reconcile(&mut allocated, 3));
        assert_eq!(allocated, 3);
    }

    #[test]
    fn batch_reallocated_when_image_count_changes() {
        let mut allocated = 3;
        assert!(reconcile(&mut allocated, 4));
        assert_eq!(allocated, 4);
        assert!(reconcile(&mut allocated, 2));
        assert_eq!(allocated, 2);
    }

    #[test]
    fn resize_through_zero_extent_keeps_batch_in_sync() {
        // 800x600 -> minimized -> 400x300: the rebuild after the window
        // comes back usually reports the same image count, so the batch
        // is reused; a changed count forces one reallocation. Either way
        // the batch size tracks the image count exactly.
        let mut allocated = 3;
        for image_count in [3, 3, 4, 4, 3] {
            reconcile(&mut allocated, image_count);
            assert_eq!(allocated, image_count);
        }
    }
}
