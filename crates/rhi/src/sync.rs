//! Synchronization primitives for the frame loop.

use std::sync::Arc;

use ash::vk;

use crate::device::Device;
use crate::error::RhiResult;

/// Number of frames that may be recorded concurrently on the CPU while the
/// GPU works on earlier ones.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// RAII wrapper for a binary semaphore.
pub struct Semaphore {
    device: Arc<Device>,
    handle: vk::Semaphore,
}

impl Semaphore {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let info = vk::SemaphoreCreateInfo::default();
        // SAFETY: device is valid; the semaphore is destroyed in Drop.
        let handle = unsafe { device.handle().create_semaphore(&info, None)? };
        Ok(Self { device, handle })
    }

    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.handle
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        // SAFETY: the handle was created from this device and is not null.
        unsafe {
            self.device.handle().destroy_semaphore(self.handle, None);
        }
    }
}

/// RAII wrapper for a fence.
pub struct Fence {
    device: Arc<Device>,
    handle: vk::Fence,
}

impl Fence {
    /// Create a fence, optionally in the signaled state.
    ///
    /// Frame fences start signaled so the first wait on each sync slot
    /// returns immediately.
    pub fn new(device: Arc<Device>, signaled: bool) -> RhiResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let info = vk::FenceCreateInfo::default().flags(flags);
        // SAFETY: device is valid; the fence is destroyed in Drop.
        let handle = unsafe { device.handle().create_fence(&info, None)? };
        Ok(Self { device, handle })
    }

    #[inline]
    pub fn handle(&self) -> vk::Fence {
        self.handle
    }

    /// Block until the fence signals. No timeout; a hung GPU surfaces here
    /// rather than being papered over.
    pub fn wait(&self) -> RhiResult<()> {
        // SAFETY: the fence belongs to this device.
        unsafe {
            self.device
                .handle()
                .wait_for_fences(&[self.handle], true, u64::MAX)?;
        }
        Ok(())
    }

    pub fn reset(&self) -> RhiResult<()> {
        // SAFETY: the fence belongs to this device.
        unsafe { self.device.handle().reset_fences(&[self.handle])? };
        Ok(())
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        // SAFETY: the handle was created from this device and is not null.
        unsafe {
            self.device.handle().destroy_fence(self.handle, None);
        }
    }
}

/// Per-slot synchronization objects for one frame in flight.
pub struct FrameSync {
    /// Signaled by the presentation engine when the acquired image is
    /// ready to be rendered to.
    pub image_available: Semaphore,
    /// Signaled by the graphics queue when rendering completes; waited on
    /// by the present operation.
    pub render_finished: Semaphore,
    /// Signaled when the GPU finishes the work submitted for this slot.
    pub in_flight: Fence,
}

impl FrameSync {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        Ok(Self {
            image_available: Semaphore::new(device.clone())?,
            render_finished: Semaphore::new(device.clone())?,
            in_flight: Fence::new(device, true)?,
        })
    }
}

/// Advance a frame index through the in-flight ring.
#[inline]
pub fn next_frame_index(current: usize) -> usize {
    (current + 1) % MAX_FRAMES_IN_FLIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_wraps() {
        let mut index = 0;
        index = next_frame_index(index);
        assert_eq!(index, 1);
        index = next_frame_index(index);
        assert_eq!(index, 0);
    }

    #[test]
    fn frame_index_stays_in_range() {
        let mut index = 0;
        for _ in 0..100 {
            index = next_frame_index(index);
            assert!(index < MAX_FRAMES_IN_FLIGHT);
        }
    }
}
