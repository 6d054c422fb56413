//! Command pool and command buffer helpers.

use std::sync::Arc;

use ash::vk;

use crate::device::Device;
use crate::error::RhiResult;

/// RAII wrapper for a command pool on the graphics queue family.
pub struct CommandPool {
    device: Arc<Device>,
    handle: vk::CommandPool,
}

impl CommandPool {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let info = vk::CommandPoolCreateInfo::default()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(device.queue_families().graphics);

        // SAFETY: device is valid; the pool is destroyed in Drop.
        let handle = unsafe { device.handle().create_command_pool(&info, None)? };

        Ok(Self { device, handle })
    }

    #[inline]
    pub fn handle(&self) -> vk::CommandPool {
        self.handle
    }

    /// Allocate `count` primary command buffers from this pool.
    pub fn allocate(&self, count: u32) -> RhiResult<Vec<vk::CommandBuffer>> {
        let info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.handle)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        // SAFETY: the pool is owned by self and lives as long as the
        // returned buffers are in use.
        let buffers = unsafe { self.device.handle().allocate_command_buffers(&info)? };
        Ok(buffers)
    }

    /// Return command buffers to the pool.
    ///
    /// The caller must ensure none of them are pending on the GPU.
    pub fn free(&self, buffers: &[vk::CommandBuffer]) {
        if buffers.is_empty() {
            return;
        }
        // SAFETY: the buffers were allocated from this pool.
        unsafe {
            self.device
                .handle()
                .free_command_buffers(self.handle, buffers);
        }
    }

    /// Record and submit a one-off command buffer, then wait for it.
    ///
    /// Used for staging copies during resource upload.
    pub fn submit_once(
        &self,
        record: impl FnOnce(&ash::Device, vk::CommandBuffer),
    ) -> RhiResult<()> {
        let command_buffer = self.allocate(1)?[0];
        let device = self.device.handle();

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        // SAFETY: the buffer was just allocated and is recorded exactly
        // once before submission.
        unsafe {
            device.begin_command_buffer(command_buffer, &begin_info)?;
            record(device, command_buffer);
            device.end_command_buffer(command_buffer)?;

            let command_buffers = [command_buffer];
            let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
            device.queue_submit(
                self.device.graphics_queue(),
                &[submit_info],
                vk::Fence::null(),
            )?;
            device.queue_wait_idle(self.device.graphics_queue())?;
        }

        self.free(&[command_buffer]);
        Ok(())
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        // SAFETY: destroying the pool frees all buffers allocated from it;
        // the caller has waited for the device to go idle.
        unsafe {
            self.device.handle().destroy_command_pool(self.handle, None);
        }
        tracing::debug!("Command pool destroyed");
    }
}
