//! Descriptor set layouts, pools, and writes.

use std::sync::Arc;

use ash::vk;

use crate::buffer::Buffer;
use crate::device::Device;
use crate::error::RhiResult;

/// RAII wrapper for a descriptor set layout.
pub struct DescriptorSetLayout {
    device: Arc<Device>,
    handle: vk::DescriptorSetLayout,
}

impl DescriptorSetLayout {
    /// Layout with a single uniform buffer at binding 0, visible to all
    /// graphics stages.
    pub fn uniform(device: Arc<Device>) -> RhiResult<Self> {
        let binding = vk::DescriptorSetLayoutBinding::default()
            .binding(0)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::ALL_GRAPHICS);

        let bindings = [binding];
        let info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

        // SAFETY: device is valid; the layout is destroyed in Drop.
        let handle = unsafe { device.handle().create_descriptor_set_layout(&info, None)? };

        Ok(Self { device, handle })
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.handle
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        // SAFETY: the layout was created from this device.
        unsafe {
            self.device
                .handle()
                .destroy_descriptor_set_layout(self.handle, None);
        }
    }
}

/// RAII wrapper for a descriptor pool.
pub struct DescriptorPool {
    device: Arc<Device>,
    handle: vk::DescriptorPool,
}

impl DescriptorPool {
    /// Pool sized for `max_sets` uniform-buffer descriptor sets.
    pub fn uniform(device: Arc<Device>, max_sets: u32) -> RhiResult<Self> {
        let pool_size = vk::DescriptorPoolSize::default()
            .ty(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(max_sets);

        let pool_sizes = [pool_size];
        let info = vk::DescriptorPoolCreateInfo::default()
            .max_sets(max_sets)
            .pool_sizes(&pool_sizes);

        // SAFETY: device is valid; the pool is destroyed in Drop.
        let handle = unsafe { device.handle().create_descriptor_pool(&info, None)? };

        Ok(Self { device, handle })
    }

    /// Allocate one set per layout in `layouts`.
    pub fn allocate(
        &self,
        layouts: &[vk::DescriptorSetLayout],
    ) -> RhiResult<Vec<vk::DescriptorSet>> {
        let info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.handle)
            .set_layouts(layouts);

        // SAFETY: the pool is owned by self; sets are freed with the pool.
        let sets = unsafe { self.device.handle().allocate_descriptor_sets(&info)? };
        Ok(sets)
    }

    /// Point binding 0 of `set` at the whole of `buffer`.
    pub fn write_uniform(&self, set: vk::DescriptorSet, buffer: &Buffer) {
        let buffer_info = vk::DescriptorBufferInfo::default()
            .buffer(buffer.handle())
            .offset(0)
            .range(buffer.size());

        let buffer_infos = [buffer_info];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(set)
            .dst_binding(0)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .buffer_info(&buffer_infos);

        // SAFETY: the set was allocated from this pool and the buffer is
        // live.
        unsafe {
            self.device.handle().update_descriptor_sets(&[write], &[]);
        }
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        // SAFETY: destroying the pool frees all sets allocated from it.
        unsafe {
            self.device
                .handle()
                .destroy_descriptor_pool(self.handle, None);
        }
    }
}
