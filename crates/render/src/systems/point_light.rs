//! Renders point lights as camera-facing billboards and animates them.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use lantern_rhi::{
    Device, GraphicsPipeline, GraphicsPipelineBuilder, PipelineLayout, RhiResult, ShaderModule,
};

use crate::frame::FrameInfo;
use crate::ubo::GlobalUbo;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct PointLightPushConstants {
    position: Vec4,
    color: Vec4,
    radius: f32,
    _pad: [f32; 3],
}

pub struct PointLightSystem {
    device: Arc<Device>,
    layout: PipelineLayout,
    pipeline: GraphicsPipeline,
}

impl PointLightSystem {
    pub fn new(
        device: Arc<Device>,
        render_pass: vk::RenderPass,
        global_set_layout: vk::DescriptorSetLayout,
        shader_dir: &Path,
    ) -> RhiResult<Self> {
        let layout = PipelineLayout::new(
            device.clone(),
            &[global_set_layout],
            Some(std::mem::size_of::<PointLightPushConstants>() as u32),
        )?;

        let vert =
            ShaderModule::from_file(device.clone(), shader_dir.join("point_light.vert.spv"))?;
        let frag =
            ShaderModule::from_file(device.clone(), shader_dir.join("point_light.frag.spv"))?;

        // The billboard quad is generated in the vertex shader.
        let pipeline = GraphicsPipelineBuilder::new(device.clone(), &vert, &frag, layout.handle())
            .render_pass(render_pass)
            .no_vertex_input()
            .cull_mode(vk::CullModeFlags::NONE)
            .build()?;

        Ok(Self {
            device,
            layout,
            pipeline,
        })
    }

    /// Orbit the lights around the scene origin and publish the first
    /// light into the global UBO.
    pub fn update(&self, frame_info: &mut FrameInfo<'_>, ubo: &mut GlobalUbo) {
        let rotation = Mat4::from_rotation_y(0.5 * frame_info.frame_time);

        let mut published = false;
        for object in frame_info.game_objects.values_mut() {
            let Some(light) = object.point_light else {
                continue;
            };

            object.transform.translation =
                (rotation * object.transform.translation.extend(1.0)).truncate();

            if !published {
                ubo.light_position = object.transform.translation.extend(0.0);
                ubo.light_color = object.color.extend(light.intensity);
                published = true;
            }
        }
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
            let Some(light) = object.point_light else {
                continue;
            };

            let push = PointLightPushConstants {
                position: object.transform.translation.extend(1.0),
                color: object.color.extend(light.intensity),
                radius: object.transform.scale.x,
                _pad: [0.0; 3],
            };

            // SAFETY: the push constant range covers this struct for both
            // stages; the draw emits the two billboard triangles.
            unsafe {
                self.device.handle().cmd_push_constants(
                    frame_info.command_buffer,
                    self.layout.handle(),
                    vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                    0,
                    bytemuck::bytes_of(&push),
                );
                self.device
                    .handle()
                    .cmd_draw(frame_info.command_buffer, 6, 1, 0, 0);
            }
        }
    }
}
