//! Swapchain ownership and the per-frame acquire/present protocol.
//!
//! The [`Swapchain`] owns everything whose lifetime is tied to the
//! presentation surface: the swapchain images and views, one depth image
//! per swapchain image, the render pass, the framebuffers, and the ring of
//! per-frame synchronization objects. Acquire and present report surface
//! loss through [`AcquireOutcome`] and [`PresentOutcome`] instead of
//! errors, so the caller can drive recreation.

use std::sync::Arc;

use ash::vk;

use crate::depth::{find_depth_format, DepthImage};
use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::sync::{next_frame_index, FrameSync, MAX_FRAMES_IN_FLIGHT};

/// Result of attempting to acquire the next swapchain image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image was acquired and may be rendered to. `suboptimal` means
    /// the surface no longer matches exactly but presentation still works.
    Acquired { image_index: u32, suboptimal: bool },
    /// The swapchain can no longer present; it must be recreated before
    /// any rendering happens.
    OutOfDate,
}

/// Result of submitting and presenting a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Optimal,
    Suboptimal,
    OutOfDate,
}

/// Surface capabilities, formats, and present modes for a device/surface
/// pair.
pub struct SwapchainSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    pub fn query(
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        physical_device: vk::PhysicalDevice,
    ) -> RhiResult<Self> {
        // SAFETY: both handles come from the same instance and are live.
        unsafe {
            Ok(Self {
                capabilities: surface_loader
                    .get_physical_device_surface_capabilities(physical_device, surface)?,
                formats: surface_loader
                    .get_physical_device_surface_formats(physical_device, surface)?,
                present_modes: surface_loader
                    .get_physical_device_surface_present_modes(physical_device, surface)?,
            })
        }
    }
}

pub struct Swapchain {
    device: Arc<Device>,
    loader: ash::khr::swapchain::Device,
    handle: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    depth_images: Vec<DepthImage>,
    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,
    format: vk::SurfaceFormatKHR,
    depth_format: vk::Format,
    extent: vk::Extent2D,
    /// One sync slot per frame in flight, indexed by `frame_index`.
    frame_sync: Vec<FrameSync>,
    /// Fence of the frame that last rendered to each image, null if none.
    images_in_flight: Vec<vk::Fence>,
    frame_index: usize,
}

impl Swapchain {
    /// Build a fresh swapchain with new synchronization objects.
    pub fn new(
        instance: &ash::Instance,
        device: Arc<Device>,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        window_extent: vk::Extent2D,
    ) -> RhiResult<Self> {
        let frame_sync = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| FrameSync::new(device.clone()))
            .collect::<RhiResult<Vec<_>>>()?;

        Self::create(
            instance,
            device,
            surface_loader,
            surface,
            window_extent,
            vk::SwapchainKHR::null(),
            frame_sync,
            0,
        )
    }

    /// Build a replacement swapchain, handing the retired chain's handle
    /// to the driver so in-flight presentation can finish.
    ///
    /// The synchronization ring and frame counter move from `previous`
    /// into the new chain, so frames already in flight keep their sync
    /// slots. `previous` is destroyed when this function returns.
    pub fn from_previous(
        instance: &ash::Instance,
        device: Arc<Device>,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        window_extent: vk::Extent2D,
        mut previous: Swapchain,
    ) -> RhiResult<Self> {
        let frame_sync = std::mem::take(&mut previous.frame_sync);
        let frame_index = previous.frame_index;

        let swapchain = Self::create(
            instance,
            device,
            surface_loader,
            surface,
            window_extent,
            previous.handle,
            frame_sync,
            frame_index,
        )?;

        if !swapchain.has_compatible_formats(&previous) {
            return Err(RhiError::Swapchain(
                "surface format changed during recreation".into(),
            ));
        }

        Ok(swapchain)
    }

    #[allow(clippy::too_many_arguments)]
    fn create(
        instance: &ash::Instance,
        device: Arc<Device>,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        window_extent: vk::Extent2D,
        old_swapchain: vk::SwapchainKHR,
        frame_sync: Vec<FrameSync>,
        frame_index: usize,
    ) -> RhiResult<Self> {
        assert!(
            window_extent.width > 0 && window_extent.height > 0,
            "cannot create a swapchain with a degenerate extent"
        );

        let support = SwapchainSupport::query(surface_loader, surface, device.physical_device())?;
        let format = choose_surface_format(&support.formats);
        let present_mode = choose_present_mode(&support.present_modes);
        let extent = choose_extent(&support.capabilities, window_extent);
        let image_count = determine_image_count(&support.capabilities);

        let families = device.queue_families();
        let family_indices = [families.graphics, families.present];

        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        if families.same_family() {
            create_info = create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE);
        } else {
            create_info = create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&family_indices);
        }

        let loader = ash::khr::swapchain::Device::new(instance, device.handle());
        // SAFETY: surface and old_swapchain are valid (or null) handles;
        // create_info references data that outlives this call.
        let handle = unsafe { loader.create_swapchain(&create_info, None)? };

        // SAFETY: handle was just created from this loader.
        let images = unsafe { loader.get_swapchain_images(handle)? };
        let image_views = create_image_views(&device, &images, format.format)?;

        let depth_format = find_depth_format(instance, device.physical_device())?;
        let depth_images = images
            .iter()
            .map(|_| DepthImage::new(device.clone(), depth_format, extent))
            .collect::<RhiResult<Vec<_>>>()?;

        let render_pass = create_render_pass(&device, format.format, depth_format)?;
        let framebuffers =
            create_framebuffers(&device, render_pass, &image_views, &depth_images, extent)?;

        let images_in_flight = vec![vk::Fence::null(); images.len()];

        tracing::info!(
            "Swapchain created: {}x{}, {} images, {:?}, {:?}",
            extent.width,
            extent.height,
            images.len(),
            format.format,
            present_mode
        );

        Ok(Self {
            device,
            loader,
            handle,
            images,
            image_views,
            depth_images,
            render_pass,
            framebuffers,
            format,
            depth_format,
            extent,
            frame_sync,
            images_in_flight,
            frame_index,
        })
    }

    /// Wait for the current frame slot's GPU work, then acquire the next
    /// presentable image.
    ///
    /// Does not advance the frame index; that happens in
    /// [`submit_and_present`](Self::submit_and_present).
    pub fn acquire_next_image(&mut self) -> RhiResult<AcquireOutcome> {
        let sync = &self.frame_sync[self.frame_index];
        sync.in_flight.wait()?;

        // SAFETY: the swapchain and semaphore are live handles owned by
        // self.
        let result = unsafe {
            self.loader.acquire_next_image(
                self.handle,
                u64::MAX,
                sync.image_available.handle(),
                vk::Fence::null(),
            )
        };

        match result {
            Ok((image_index, suboptimal)) => Ok(AcquireOutcome::Acquired {
                image_index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(e.into()),
        }
    }

    /// Submit a recorded command buffer for the given image and queue it
    /// for presentation.
    ///
    /// The frame index advances to the next sync slot regardless of the
    /// outcome, so a failed present never stalls the ring.
    pub fn submit_and_present(
        &mut self,
        command_buffer: vk::CommandBuffer,
        image_index: u32,
    ) -> RhiResult<PresentOutcome> {
        let image_index = image_index as usize;
        assert!(image_index < self.images.len(), "image index out of range");

        // If an earlier frame is still rendering to this image, wait for
        // it before reusing the image.
        let prior_fence = self.images_in_flight[image_index];
        if prior_fence != vk::Fence::null() {
            // SAFETY: the fence handle belongs to one of our sync slots.
            unsafe {
                self.device
                    .handle()
                    .wait_for_fences(&[prior_fence], true, u64::MAX)?;
            }
        }
        let sync = &self.frame_sync[self.frame_index];
        self.images_in_flight[image_index] = sync.in_flight.handle();

        sync.in_flight.reset()?;

        let wait_semaphores = [sync.image_available.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [sync.render_finished.handle()];
        let command_buffers = [command_buffer];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        // SAFETY: the command buffer is fully recorded and the semaphores
        // and fence belong to the current sync slot.
        unsafe {
            self.device.handle().queue_submit(
                self.device.graphics_queue(),
                &[submit_info],
                sync.in_flight.handle(),
            )?;
        }

        let swapchains = [self.handle];
        let image_indices = [image_index as u32];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        // SAFETY: the swapchain is live and the image index was acquired
        // from it.
        let result = unsafe {
            self.loader
                .queue_present(self.device.present_queue(), &present_info)
        };

        self.frame_index = next_frame_index(self.frame_index);

        match result {
            Ok(false) => Ok(PresentOutcome::Optimal),
            Ok(true) => Ok(PresentOutcome::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether this chain's color and depth formats match another's.
    ///
    /// A recreated chain with different formats would invalidate every
    /// pipeline built against the old render pass.
    pub fn has_compatible_formats(&self, other: &Swapchain) -> bool {
        self.format.format == other.format.format && self.depth_format == other.depth_format
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.extent.width as f32 / self.extent.height as f32
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    #[inline]
    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize]
    }

    #[inline]
    pub fn format(&self) -> vk::Format {
        self.format.format
    }

    #[inline]
    pub fn depth_format(&self) -> vk::Format {
        self.depth_format
    }

    #[inline]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        // SAFETY: all handles were created from this device/loader and
        // the caller has waited for the device to go idle.
        unsafe {
            for &framebuffer in &self.framebuffers {
                self.device.handle().destroy_framebuffer(framebuffer, None);
            }
            self.device.handle().destroy_render_pass(self.render_pass, None);
            for &view in &self.image_views {
                self.device.handle().destroy_image_view(view, None);
            }
            self.depth_images.clear();
            self.loader.destroy_swapchain(self.handle, None);
        }
        tracing::debug!("Swapchain destroyed");
    }
}

fn create_image_views(
    device: &Device,
    images: &[vk::Image],
    format: vk::Format,
) -> RhiResult<Vec<vk::ImageView>> {
    images
        .iter()
        .map(|&image| {
            let info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .subresource_range(
                    vk::ImageSubresourceRange::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1),
                );
            // SAFETY: the image belongs to the swapchain being built.
            unsafe { Ok(device.handle().create_image_view(&info, None)?) }
        })
        .collect()
}

fn create_render_pass(
    device: &Device,
    color_format: vk::Format,
    depth_format: vk::Format,
) -> RhiResult<vk::RenderPass> {
    let color_attachment = vk::AttachmentDescription::default()
        .format(color_format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);

    let depth_attachment = vk::AttachmentDescription::default()
        .format(depth_format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::DONT_CARE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

    let color_ref = vk::AttachmentReference::default()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
    let depth_ref = vk::AttachmentReference::default()
        .attachment(1)
        .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

    let color_refs = [color_ref];
    let subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_refs)
        .depth_stencil_attachment(&depth_ref);

    let dependency = vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
        )
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
        )
        .dst_access_mask(
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        );

    let attachments = [color_attachment, depth_attachment];
    let subpasses = [subpass];
    let dependencies = [dependency];
    let info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);

    // SAFETY: the create info references stack data valid for this call.
    unsafe { Ok(device.handle().create_render_pass(&info, None)?) }
}

fn create_framebuffers(
    device: &Device,
    render_pass: vk::RenderPass,
    image_views: &[vk::ImageView],
    depth_images: &[DepthImage],
    extent: vk::Extent2D,
) -> RhiResult<Vec<vk::Framebuffer>> {
    image_views
        .iter()
        .zip(depth_images)
        .map(|(&view, depth)| {
            let attachments = [view, depth.view()];
            let info = vk::FramebufferCreateInfo::default()
                .render_pass(render_pass)
                .attachments(&attachments)
                .width(extent.width)
                .height(extent.height)
                .layers(1);
            // SAFETY: all attachment views are live and match the render
            // pass formats.
            unsafe { Ok(device.handle().create_framebuffer(&info, None)?) }
        })
        .collect()
}

fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .copied()
        .unwrap_or(formats[0])
}

fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        // FIFO is the only mode Vulkan guarantees support for.
        vk::PresentModeKHR::FIFO
    }
}

fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    window_extent: vk::Extent2D,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }
    vk::Extent2D {
        width: window_extent.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: window_extent.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

fn determine_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = capabilities.min_image_count + 1;
    // max_image_count of 0 means no upper bound.
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        count = capabilities.max_image_count;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    #[test]
    fn prefers_bgra_srgb() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [format(
            vk::Format::R8G8B8A8_UNORM,
            vk::ColorSpaceKHR::SRGB_NONLINEAR,
        )];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn prefers_mailbox_present_mode() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn falls_back_to_fifo() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
        assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn extent_uses_surface_extent_when_fixed() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 1920,
                height: 1080,
            },
            ..Default::default()
        };
        let extent = choose_extent(
            &capabilities,
            vk::Extent2D {
                width: 800,
                height: 600,
            },
        );
        assert_eq!(extent.width, 1920);
        assert_eq!(extent.height, 1080);
    }

    #[test]
    fn extent_clamps_window_size() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 640,
                height: 480,
            },
            max_image_extent: vk::Extent2D {
                width: 1280,
                height: 720,
            },
            ..Default::default()
        };
        let extent = choose_extent(
            &capabilities,
            vk::Extent2D {
                width: 4096,
                height: 100,
            },
        );
        assert_eq!(extent.width, 1280);
        assert_eq!(extent.height, 480);
    }

    #[test]
    fn image_count_is_min_plus_one() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&capabilities), 3);
    }

    #[test]
    fn image_count_respects_maximum() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 3,
            max_image_count: 3,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&capabilities), 3);
    }

    #[test]
    fn image_count_unbounded_maximum() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&capabilities), 3);
    }
}
