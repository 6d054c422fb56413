//! Physical device selection.

use std::ffi::CStr;

use ash::vk;

use crate::error::{RhiError, RhiResult};

/// Queue family indices for graphics and presentation.
///
/// On most hardware both point at the same family, but the swapchain setup
/// handles the split case with concurrent sharing.
#[derive(Debug, Clone, Copy)]
pub struct QueueFamilyIndices {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilyIndices {
    pub fn same_family(&self) -> bool {
        self.graphics == self.present
    }
}

struct Candidate {
    device: vk::PhysicalDevice,
    indices: QueueFamilyIndices,
    score: u32,
}

/// Pick the best physical device that supports graphics, presentation to
/// the given surface, and the swapchain extension.
///
/// Discrete GPUs are preferred over integrated ones.
pub fn select_physical_device(
    instance: &ash::Instance,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
) -> RhiResult<(vk::PhysicalDevice, QueueFamilyIndices)> {
    // SAFETY: instance is valid for the duration of this call.
    let devices = unsafe { instance.enumerate_physical_devices()? };
    if devices.is_empty() {
        return Err(RhiError::NoSuitableGpu);
    }
    tracing::debug!("Found {} physical device(s)", devices.len());

    let mut best: Option<Candidate> = None;
    for device in devices {
        let Some(indices) = find_queue_families(instance, surface_loader, surface, device)? else {
            continue;
        };
        if !supports_swapchain_extension(instance, device)? {
            continue;
        }
        if !swapchain_adequate(surface_loader, surface, device)? {
            continue;
        }

        let score = score_device(instance, device);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(Candidate {
                device,
                indices,
                score,
            });
        }
    }

    let candidate = best.ok_or(RhiError::NoSuitableGpu)?;

    // SAFETY: the device handle came from enumerate_physical_devices.
    let props = unsafe { instance.get_physical_device_properties(candidate.device) };
    let name = props
        .device_name_as_c_str()
        .unwrap_or(c"<unknown>")
        .to_string_lossy();
    tracing::info!(
        "Selected GPU: {} (graphics family {}, present family {})",
        name,
        candidate.indices.graphics,
        candidate.indices.present
    );

    Ok((candidate.device, candidate.indices))
}

fn find_queue_families(
    instance: &ash::Instance,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    device: vk::PhysicalDevice,
) -> RhiResult<Option<QueueFamilyIndices>> {
    // SAFETY: device and surface are valid handles from the same instance.
    let families = unsafe { instance.get_physical_device_queue_family_properties(device) };

    let mut graphics = None;
    let mut present = None;

    for (index, family) in families.iter().enumerate() {
        let index = index as u32;
        if family.queue_flags.contains(vk::QueueFlags::GRAPHICS) && graphics.is_none() {
            graphics = Some(index);
        }
        // SAFETY: same as above.
        let supports_present =
            unsafe { surface_loader.get_physical_device_surface_support(device, index, surface)? };
        if supports_present && present.is_none() {
            present = Some(index);
        }
        if graphics.is_some() && present.is_some() {
            break;
        }
    }

    Ok(match (graphics, present) {
        (Some(graphics), Some(present)) => Some(QueueFamilyIndices { graphics, present }),
        _ => None,
    })
}

fn supports_swapchain_extension(
    instance: &ash::Instance,
    device: vk::PhysicalDevice,
) -> RhiResult<bool> {
    // SAFETY: device is a valid handle from this instance.
    let extensions = unsafe { instance.enumerate_device_extension_properties(device)? };
    Ok(extensions.iter().any(|ext| {
        // SAFETY: extension_name is NUL-terminated per the Vulkan spec.
        let name = unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) };
        name == ash::khr::swapchain::NAME
    }))
}

fn swapchain_adequate(
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    device: vk::PhysicalDevice,
) -> RhiResult<bool> {
    // SAFETY: device and surface are valid handles.
    let formats =
        unsafe { surface_loader.get_physical_device_surface_formats(device, surface)? };
    let present_modes =
        unsafe { surface_loader.get_physical_device_surface_present_modes(device, surface)? };
    Ok(!formats.is_empty() && !present_modes.is_empty())
}

fn score_device(instance: &ash::Instance, device: vk::PhysicalDevice) -> u32 {
    // SAFETY: device is a valid handle from this instance.
    let props = unsafe { instance.get_physical_device_properties(device) };
    match props.device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 1000,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 100,
        vk::PhysicalDeviceType::VIRTUAL_GPU => 50,
        _ => 10,
    }
}
