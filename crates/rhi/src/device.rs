//! Logical device creation and queue access.

use std::sync::Mutex;

use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use gpu_allocator::AllocationSizes;

use crate::error::RhiResult;
use crate::physical_device::QueueFamilyIndices;

/// The logical device, its queues, and the GPU memory allocator.
///
/// Shared across the renderer behind an `Arc`; the allocator sits behind a
/// `Mutex` because gpu-allocator requires exclusive access for
/// allocate/free.
pub struct Device {
    physical_device: vk::PhysicalDevice,
    device: ash::Device,
    queue_families: QueueFamilyIndices,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    allocator: Mutex<Option<Allocator>>,
}

impl Device {
    pub fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        queue_families: QueueFamilyIndices,
    ) -> RhiResult<Self> {
        let mut unique_families = vec![queue_families.graphics];
        if !queue_families.same_family() {
            unique_families.push(queue_families.present);
        }

        let priorities = [1.0f32];
        let queue_infos: Vec<_> = unique_families
            .iter()
            .map(|&family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family)
                    .queue_priorities(&priorities)
            })
            .collect();

        let extensions = [ash::khr::swapchain::NAME.as_ptr()];
        let features = vk::PhysicalDeviceFeatures::default();

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extensions)
            .enabled_features(&features);

        // SAFETY: physical_device came from this instance and the create
        // info references data that outlives this call.
        let device = unsafe { instance.create_device(physical_device, &create_info, None)? };

        // SAFETY: the queues were requested in the create info above.
        let graphics_queue = unsafe { device.get_device_queue(queue_families.graphics, 0) };
        let present_queue = unsafe { device.get_device_queue(queue_families.present, 0) };

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: AllocationSizes::default(),
        })?;

        tracing::info!("Logical device created");

        Ok(Self {
            physical_device,
            device,
            queue_families,
            graphics_queue,
            present_queue,
            allocator: Mutex::new(Some(allocator)),
        })
    }

    #[inline]
    pub fn handle(&self) -> &ash::Device {
        &self.device
    }

    #[inline]
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    #[inline]
    pub fn queue_families(&self) -> QueueFamilyIndices {
        self.queue_families
    }

    #[inline]
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    #[inline]
    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    /// Run a closure with exclusive access to the allocator.
    pub fn with_allocator<R>(&self, f: impl FnOnce(&mut Allocator) -> R) -> R {
        let mut guard = self.allocator.lock().expect("allocator mutex poisoned");
        let allocator = guard.as_mut().expect("allocator already destroyed");
        f(allocator)
    }

    /// Block until the device has finished all submitted work.
    pub fn wait_idle(&self) -> RhiResult<()> {
        // SAFETY: the device handle is valid for the lifetime of self.
        unsafe { self.device.device_wait_idle()? };
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        // The allocator must be dropped before the device it was created
        // from.
        if let Ok(mut guard) = self.allocator.lock() {
            guard.take();
        }
        // SAFETY: all child objects must already be destroyed by their
        // owners; wait_idle guards against in-flight work.
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
        tracing::debug!("Logical device destroyed");
    }
}
