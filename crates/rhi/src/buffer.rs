//! GPU buffer wrapper over gpu-allocator.

use std::sync::Arc;

use ash::vk;
use bytemuck::Pod;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;

use crate::command::CommandPool;
use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// A Vulkan buffer with its backing allocation.
pub struct Buffer {
    device: Arc<Device>,
    handle: vk::Buffer,
    allocation: Option<Allocation>,
    size: vk::DeviceSize,
}

impl Buffer {
    pub fn new(
        device: Arc<Device>,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        location: MemoryLocation,
        name: &str,
    ) -> RhiResult<Self> {
        assert!(size > 0, "cannot create a zero-sized buffer");

        let info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        // SAFETY: device is valid; the buffer is destroyed in Drop.
        let handle = unsafe { device.handle().create_buffer(&info, None)? };
        // SAFETY: handle was just created from this device.
        let requirements = unsafe { device.handle().get_buffer_memory_requirements(handle) };

        let allocation = device.with_allocator(|allocator| {
            allocator.allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear: true,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
        })?;

        // SAFETY: the allocation satisfies the buffer's requirements.
        unsafe {
            device
                .handle()
                .bind_buffer_memory(handle, allocation.memory(), allocation.offset())?;
        }

        Ok(Self {
            device,
            handle,
            allocation: Some(allocation),
            size,
        })
    }

    /// Create a host-visible uniform buffer sized for `T`.
    pub fn uniform<T: Pod>(device: Arc<Device>, name: &str) -> RhiResult<Self> {
        Self::new(
            device,
            std::mem::size_of::<T>() as vk::DeviceSize,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            MemoryLocation::CpuToGpu,
            name,
        )
    }

    /// Create a device-local buffer and fill it through a staging copy.
    pub fn device_local<T: Pod>(
        device: Arc<Device>,
        command_pool: &CommandPool,
        usage: vk::BufferUsageFlags,
        data: &[T],
        name: &str,
    ) -> RhiResult<Self> {
        let size = std::mem::size_of_val(data) as vk::DeviceSize;

        let mut staging = Self::new(
            device.clone(),
            size,
            vk::BufferUsageFlags::TRANSFER_SRC,
            MemoryLocation::CpuToGpu,
            "staging",
        )?;
        staging.write(data)?;

        let buffer = Self::new(
            device,
            size,
            usage | vk::BufferUsageFlags::TRANSFER_DST,
            MemoryLocation::GpuOnly,
            name,
        )?;

        command_pool.submit_once(|dev, cmd| {
            let region = vk::BufferCopy::default().size(size);
            // SAFETY: both buffers are at least `size` bytes.
            unsafe {
                dev.cmd_copy_buffer(cmd, staging.handle, buffer.handle, &[region]);
            }
        })?;

        Ok(buffer)
    }

    /// Copy `data` into the mapped allocation.
    ///
    /// # Errors
    /// Fails if the buffer is not host-visible or the data does not fit.
    pub fn write<T: Pod>(&mut self, data: &[T]) -> RhiResult<()> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        assert!(
            bytes.len() as vk::DeviceSize <= self.size,
            "write exceeds buffer size"
        );

        let allocation = self
            .allocation
            .as_mut()
            .ok_or_else(|| RhiError::InvalidHandle("buffer allocation freed".into()))?;
        let mapped = allocation
            .mapped_slice_mut()
            .ok_or_else(|| RhiError::InvalidHandle("buffer is not host-visible".into()))?;
        mapped[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    #[inline]
    pub fn handle(&self) -> vk::Buffer {
        self.handle
    }

    #[inline]
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        // SAFETY: the buffer was created from this device.
        unsafe {
            self.device.handle().destroy_buffer(self.handle, None);
        }
        if let Some(allocation) = self.allocation.take() {
            self.device.with_allocator(|allocator| {
                if let Err(e) = allocator.free(allocation) {
                    tracing::warn!("Failed to free buffer allocation: {}", e);
                }
            });
        }
    }
}
