//! Graphics pipeline construction.

use std::sync::Arc;

use ash::vk;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::shader::ShaderModule;
use crate::vertex::Vertex;

/// RAII wrapper for a pipeline layout.
pub struct PipelineLayout {
    device: Arc<Device>,
    handle: vk::PipelineLayout,
}

impl PipelineLayout {
    /// Layout from descriptor set layouts and an optional push constant
    /// block visible to vertex and fragment stages.
    pub fn new(
        device: Arc<Device>,
        set_layouts: &[vk::DescriptorSetLayout],
        push_constant_size: Option<u32>,
    ) -> RhiResult<Self> {
        let push_ranges: Vec<vk::PushConstantRange> = push_constant_size
            .map(|size| {
                vec![vk::PushConstantRange::default()
                    .stage_flags(
                        vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                    )
                    .offset(0)
                    .size(size)]
            })
            .unwrap_or_default();

        let info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(set_layouts)
            .push_constant_ranges(&push_ranges);

        // SAFETY: device is valid; the layout is destroyed in Drop.
        let handle = unsafe { device.handle().create_pipeline_layout(&info, None)? };

        Ok(Self { device, handle })
    }

    #[inline]
    pub fn handle(&self) -> vk::PipelineLayout {
        self.handle
    }
}

impl Drop for PipelineLayout {
    fn drop(&mut self) {
        // SAFETY: the layout was created from this device.
        unsafe {
            self.device
                .handle()
                .destroy_pipeline_layout(self.handle, None);
        }
    }
}

/// Builder for graphics pipelines targeting a render pass subpass.
///
/// Viewport and scissor are dynamic state, so pipelines survive swapchain
/// recreation as long as the render pass formats do not change.
pub struct GraphicsPipelineBuilder<'a> {
    device: Arc<Device>,
    vertex_shader: &'a ShaderModule,
    fragment_shader: &'a ShaderModule,
    layout: vk::PipelineLayout,
    render_pass: vk::RenderPass,
    subpass: u32,
    vertex_input: bool,
    topology: vk::PrimitiveTopology,
    cull_mode: vk::CullModeFlags,
    depth_test: bool,
}

impl<'a> GraphicsPipelineBuilder<'a> {
    pub fn new(
        device: Arc<Device>,
        vertex_shader: &'a ShaderModule,
        fragment_shader: &'a ShaderModule,
        layout: vk::PipelineLayout,
    ) -> Self {
        Self {
            device,
            vertex_shader,
            fragment_shader,
            layout,
            render_pass: vk::RenderPass::null(),
            subpass: 0,
            vertex_input: true,
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            cull_mode: vk::CullModeFlags::BACK,
            depth_test: true,
        }
    }

    pub fn render_pass(mut self, render_pass: vk::RenderPass) -> Self {
        self.render_pass = render_pass;
        self
    }

    pub fn subpass(mut self, subpass: u32) -> Self {
        self.subpass = subpass;
        self
    }

    /// Disable the vertex input stage for pipelines that generate geometry
    /// in the vertex shader.
    pub fn no_vertex_input(mut self) -> Self {
        self.vertex_input = false;
        self
    }

    pub fn cull_mode(mut self, cull_mode: vk::CullModeFlags) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    pub fn build(self) -> RhiResult<GraphicsPipeline> {
        assert!(
            self.render_pass != vk::RenderPass::null(),
            "pipeline requires a render pass"
        );

        let entry = c"main";
        let stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(self.vertex_shader.handle())
                .name(entry),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(self.fragment_shader.handle())
                .name(entry),
        ];

        let binding_descriptions;
        let attribute_descriptions;
        let vertex_input_state = if self.vertex_input {
            binding_descriptions = Vertex::binding_descriptions();
            attribute_descriptions = Vertex::attribute_descriptions();
            vk::PipelineVertexInputStateCreateInfo::default()
                .vertex_binding_descriptions(&binding_descriptions)
                .vertex_attribute_descriptions(&attribute_descriptions)
        } else {
            vk::PipelineVertexInputStateCreateInfo::default()
        };

        let input_assembly =
            vk::PipelineInputAssemblyStateCreateInfo::default().topology(self.topology);

        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(self.cull_mode)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .line_width(1.0);

        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(self.depth_test)
            .depth_write_enable(self.depth_test)
            .depth_compare_op(vk::CompareOp::LESS);

        let color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(false);
        let color_blend_attachments = [color_blend_attachment];
        let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
            .attachments(&color_blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic_state)
            .layout(self.layout)
            .render_pass(self.render_pass)
            .subpass(self.subpass);

        // SAFETY: all referenced state lives until this call returns and
        // the shader modules outlive pipeline creation.
        let pipelines = unsafe {
            self.device
                .handle()
                .create_graphics_pipelines(vk::PipelineCache::null(), &[info], None)
                .map_err(|(_, e)| RhiError::Pipeline(format!("pipeline creation failed: {}", e)))?
        };

        Ok(GraphicsPipeline {
            device: self.device,
            handle: pipelines[0],
        })
    }
}

/// RAII wrapper for a graphics pipeline.
pub struct GraphicsPipeline {
    device: Arc<Device>,
    handle: vk::Pipeline,
}

impl GraphicsPipeline {
    #[inline]
    pub fn handle(&self) -> vk::Pipeline {
        self.handle
    }

    /// Bind this pipeline for graphics work.
    pub fn bind(&self, command_buffer: vk::CommandBuffer) {
        // SAFETY: the command buffer is in the recording state.
        unsafe {
            self.device.handle().cmd_bind_pipeline(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                self.handle,
            );
        }
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        // SAFETY: the pipeline was created from this device.
        unsafe {
            self.device.handle().destroy_pipeline(self.handle, None);
        }
    }
}
