//! Vulkan instance creation with optional validation layers.

use std::ffi::{c_char, CStr, CString};

use ash::vk;

use crate::error::{RhiError, RhiResult};

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Whether validation layers are requested. Enabled in debug builds only.
pub const ENABLE_VALIDATION: bool = cfg!(debug_assertions);

/// Owns the Vulkan entry point, instance, and debug messenger.
pub struct Instance {
    entry: ash::Entry,
    instance: ash::Instance,
    debug_utils: Option<ash::ext::debug_utils::Instance>,
    debug_messenger: vk::DebugUtilsMessengerEXT,
}

impl Instance {
    /// Create a Vulkan instance.
    ///
    /// `surface_extensions` are the platform-specific extensions required
    /// for presentation, obtained from the windowing layer.
    pub fn new(app_name: &str, surface_extensions: &[*const c_char]) -> RhiResult<Self> {
        // SAFETY: loads the system Vulkan library; failure is reported as
        // an error.
        let entry = unsafe { ash::Entry::load()? };

        let app_name = CString::new(app_name)
            .map_err(|_| RhiError::InvalidHandle("app name contains NUL".into()))?;
        let engine_name = c"lantern";

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(engine_name)
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_2);

        let mut extension_names: Vec<*const c_char> = surface_extensions.to_vec();
        let mut layer_names: Vec<*const c_char> = Vec::new();

        let validation = ENABLE_VALIDATION && Self::validation_layer_available(&entry)?;
        if validation {
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            layer_names.push(VALIDATION_LAYER.as_ptr());
            tracing::debug!("Validation layers enabled");
        }

        let mut debug_info = debug_messenger_create_info();

        let mut create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extension_names)
            .enabled_layer_names(&layer_names);
        if validation {
            create_info = create_info.push_next(&mut debug_info);
        }

        // SAFETY: create_info references data that outlives this call.
        let instance = unsafe { entry.create_instance(&create_info, None)? };
        tracing::info!("Vulkan instance created (API 1.2)");

        let (debug_utils, debug_messenger) = if validation {
            let loader = ash::ext::debug_utils::Instance::new(&entry, &instance);
            let info = debug_messenger_create_info();
            // SAFETY: the loader was created from this instance.
            let messenger = unsafe { loader.create_debug_utils_messenger(&info, None)? };
            (Some(loader), messenger)
        } else {
            (None, vk::DebugUtilsMessengerEXT::null())
        };

        Ok(Self {
            entry,
            instance,
            debug_utils,
            debug_messenger,
        })
    }

    fn validation_layer_available(entry: &ash::Entry) -> RhiResult<bool> {
        // SAFETY: entry is a valid loaded Vulkan entry point.
        let layers = unsafe { entry.enumerate_instance_layer_properties()? };
        let found = layers.iter().any(|layer| {
            // SAFETY: layer_name is a NUL-terminated array per the Vulkan spec.
            let name = unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) };
            name == VALIDATION_LAYER
        });
        if !found {
            tracing::warn!("Validation layer requested but not available");
        }
        Ok(found)
    }

    #[inline]
    pub fn entry(&self) -> &ash::Entry {
        &self.entry
    }

    #[inline]
    pub fn handle(&self) -> &ash::Instance {
        &self.instance
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        // SAFETY: all objects created from this instance must already be
        // destroyed; destruction order is enforced by ownership.
        unsafe {
            if let Some(loader) = &self.debug_utils {
                loader.destroy_debug_utils_messenger(self.debug_messenger, None);
            }
            self.instance.destroy_instance(None);
        }
        tracing::debug!("Vulkan instance destroyed");
    }
}

fn debug_messenger_create_info<'a>() -> vk::DebugUtilsMessengerCreateInfoEXT<'a> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback))
}

unsafe extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = if callback_data.is_null() {
        std::borrow::Cow::from("<no message>")
    } else {
        let data = *callback_data;
        if data.p_message.is_null() {
            std::borrow::Cow::from("<no message>")
        } else {
            CStr::from_ptr(data.p_message).to_string_lossy()
        }
    };

    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        tracing::error!(target: "vulkan", "{}", message);
    } else {
        tracing::warn!(target: "vulkan", "{}", message);
    }

    vk::FALSE
}
