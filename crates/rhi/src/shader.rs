//! SPIR-V shader module loading.

use std::path::Path;
use std::sync::Arc;

use ash::vk;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// RAII wrapper for a shader module.
pub struct ShaderModule {
    device: Arc<Device>,
    handle: vk::ShaderModule,
}

impl ShaderModule {
    /// Load a SPIR-V binary from disk.
    pub fn from_file(device: Arc<Device>, path: impl AsRef<Path>) -> RhiResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            RhiError::Shader(format!("failed to read {}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded shader: {}", path.display());
        Self::from_bytes(device, &bytes)
    }

    /// Create a shader module from SPIR-V bytes.
    ///
    /// # Errors
    /// Fails if the byte length is not a multiple of four or the data is
    /// misaligned for u32 words.
    pub fn from_bytes(device: Arc<Device>, bytes: &[u8]) -> RhiResult<Self> {
        if bytes.len() % 4 != 0 {
            return Err(RhiError::Shader(
                "SPIR-V length is not a multiple of 4".into(),
            ));
        }

        let (prefix, words, suffix) = unsafe { bytes.align_to::<u32>() };
        if !prefix.is_empty() || !suffix.is_empty() {
            return Err(RhiError::Shader("SPIR-V data is misaligned".into()));
        }

        let info = vk::ShaderModuleCreateInfo::default().code(words);
        // SAFETY: words is valid SPIR-V-sized data; the module is
        // destroyed in Drop.
        let handle = unsafe { device.handle().create_shader_module(&info, None)? };

        Ok(Self { device, handle })
    }

    #[inline]
    pub fn handle(&self) -> vk::ShaderModule {
        self.handle
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        // SAFETY: the module was created from this device.
        unsafe {
            self.device.handle().destroy_shader_module(self.handle, None);
        }
    }
}
