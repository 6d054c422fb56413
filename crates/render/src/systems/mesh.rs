//! Renders every object carrying a model.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use lantern_rhi::{
    Device, GraphicsPipeline, GraphicsPipelineBuilder, PipelineLayout, RhiResult, ShaderModule,
};

use crate::frame::FrameInfo;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct MeshPushConstants {
    model_matrix: Mat4,
    normal_matrix: Mat4,
}

pub struct MeshRenderSystem {
    device: Arc<Device>,
    layout: PipelineLayout,
    pipeline: GraphicsPipeline,
}

impl MeshRenderSystem {
    pub fn new(
        device: Arc<Device>,
        render_pass: vk::RenderPass,
        global_set_layout: vk::DescriptorSetLayout,
        shader_dir: &Path,
    ) -> RhiResult<Self> {
        let layout = PipelineLayout::new(
            device.clone(),
            &[global_set_layout],
            Some(std::mem::size_of::<MeshPushConstants>() as u32),
        )?;

        let vert = ShaderModule::from_file(device.clone(), shader_dir.join("mesh.vert.spv"))?;
        let frag = ShaderModule::from_file(device.clone(), shader_dir.join("mesh.frag.spv"))?;

        let pipeline = GraphicsPipelineBuilder::new(device.clone(), &vert, &frag, layout.handle())
            .render_pass(render_pass)
            .build()?;

        Ok(Self {
            device,
            layout,
            pipeline,
        })
    }

    pub fn render(&self, frame_info: &mut FrameInfo<'_>) {
        self.pipeline.bind(frame_info.command_buffer);

        // SAFETY: the command buffer is recording inside the render pass
        // and the descriptor set matches the pipeline layout.
        unsafe {
            self.device.handle().cmd_bind_descriptor_sets(
                frame_info.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                self.layout.handle(),
                0,
                &[frame_info.global_descriptor_set],
                &[],
            );
        }

        for object in frame_info.game_objects.values() {
            let Some(model) = &object.model else {
                continue;
            };

            let push = MeshPushConstants {
                model_matrix: object.transform.matrix(),
                normal_matrix: Mat4::from_mat3(object.transform.normal_matrix()),
            };

            // SAFETY: the push constant range covers this struct for both
            // stages.
            unsafe {
                self.device.handle().cmd_push_constants(
                    frame_info.command_buffer,
                    self.layout.handle(),
                    vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                    0,
                    bytemuck::bytes_of(&push),
                );
            }

            model.bind(frame_info.command_buffer);
            model.draw(frame_info.command_buffer);
        }
    }
}
