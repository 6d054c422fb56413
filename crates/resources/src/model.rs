//! Mesh data and GPU models.

use std::sync::Arc;

use ash::vk;
use glam::{vec2, vec3, Vec3};

use lantern_rhi::{Buffer, CommandPool, Device, RhiResult, Vertex};

/// CPU-side mesh geometry.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// A unit cube centered on the origin with a distinct color per face.
    pub fn cube() -> Self {
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        struct Face {
            normal: Vec3,
            tangent: Vec3,
            bitangent: Vec3,
            color: Vec3,
        }

        let faces = [
            // left, white
            Face {
                normal: vec3(-1.0, 0.0, 0.0),
                tangent: vec3(0.0, 0.0, 1.0),
                bitangent: vec3(0.0, 1.0, 0.0),
                color: vec3(0.9, 0.9, 0.9),
            },
            // right, yellow
            Face {
                normal: vec3(1.0, 0.0, 0.0),
                tangent: vec3(0.0, 0.0, -1.0),
                bitangent: vec3(0.0, 1.0, 0.0),
                color: vec3(0.8, 0.8, 0.1),
            },
            // top, orange (y points down)
            Face {
                normal: vec3(0.0, -1.0, 0.0),
                tangent: vec3(1.0, 0.0, 0.0),
                bitangent: vec3(0.0, 0.0, 1.0),
                color: vec3(0.9, 0.6, 0.1),
            },
            // bottom, red
            Face {
                normal: vec3(0.0, 1.0, 0.0),
                tangent: vec3(1.0, 0.0, 0.0),
                bitangent: vec3(0.0, 0.0, -1.0),
                color: vec3(0.8, 0.1, 0.1),
            },
            // front, blue
            Face {
                normal: vec3(0.0, 0.0, 1.0),
                tangent: vec3(1.0, 0.0, 0.0),
                bitangent: vec3(0.0, 1.0, 0.0),
                color: vec3(0.1, 0.1, 0.8),
            },
            // back, green
            Face {
                normal: vec3(0.0, 0.0, -1.0),
                tangent: vec3(-1.0, 0.0, 0.0),
                bitangent: vec3(0.0, 1.0, 0.0),
                color: vec3(0.1, 0.8, 0.1),
            },
        ];

        for face in faces {
            let base = vertices.len() as u32;
            let center = face.normal * 0.5;
            let corners = [
                (-0.5f32, -0.5f32, vec2(0.0, 0.0)),
                (0.5, -0.5, vec2(1.0, 0.0)),
                (0.5, 0.5, vec2(1.0, 1.0)),
                (-0.5, 0.5, vec2(0.0, 1.0)),
            ];
            for (u, v, uv) in corners {
                vertices.push(Vertex {
                    position: center + face.tangent * u + face.bitangent * v,
                    color: face.color,
                    normal: face.normal,
                    uv,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }
}

/// A mesh uploaded to device-local memory.
pub struct Model {
    device: Arc<Device>,
    vertex_buffer: Buffer,
    index_buffer: Option<Buffer>,
    vertex_count: u32,
    index_count: u32,
}

impl Model {
    pub fn new(device: Arc<Device>, command_pool: &CommandPool, mesh: &MeshData) -> RhiResult<Self> {
        assert!(
            mesh.vertices.len() >= 3,
            "a model needs at least one triangle"
        );

        let vertex_buffer = Buffer::device_local(
            device.clone(),
            command_pool,
            vk::BufferUsageFlags::VERTEX_BUFFER,
            &mesh.vertices,
            "vertex buffer",
        )?;

        let index_buffer = if mesh.indices.is_empty() {
            None
        } else {
            Some(Buffer::device_local(
                device.clone(),
                command_pool,
                vk::BufferUsageFlags::INDEX_BUFFER,
                &mesh.indices,
                "index buffer",
            )?)
        };

        tracing::debug!(
            "Model uploaded: {} vertices, {} indices",
            mesh.vertices.len(),
            mesh.indices.len()
        );

        Ok(Self {
            device,
            vertex_buffer,
            index_buffer,
            vertex_count: mesh.vertices.len() as u32,
            index_count: mesh.indices.len() as u32,
        })
    }

    /// Bind the vertex (and index) buffers.
    pub fn bind(&self, command_buffer: vk::CommandBuffer) {
        let buffers = [self.vertex_buffer.handle()];
        let offsets = [0];
        // SAFETY: the command buffer is recording and the buffers are
        // live.
        unsafe {
            self.device
                .handle()
                .cmd_bind_vertex_buffers(command_buffer, 0, &buffers, &offsets);
            if let Some(index_buffer) = &self.index_buffer {
                self.device.handle().cmd_bind_index_buffer(
                    command_buffer,
                    index_buffer.handle(),
                    0,
                    vk::IndexType::UINT32,
                );
            }
        }
    }

    /// Issue the draw call. [`bind`](Self::bind) must have been called on
    /// the same command buffer first.
    pub fn draw(&self, command_buffer: vk::CommandBuffer) {
        // SAFETY: the command buffer is recording inside a render pass.
        unsafe {
            if self.index_buffer.is_some() {
                self.device
                    .handle()
                    .cmd_draw_indexed(command_buffer, self.index_count, 1, 0, 0, 0);
            } else {
                self.device
                    .handle()
                    .cmd_draw(command_buffer, self.vertex_count, 1, 0, 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_faces() {
        let mesh = MeshData::cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn cube_indices_in_range() {
        let mesh = MeshData::cube();
        let max = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn cube_normals_are_unit_length() {
        let mesh = MeshData::cube();
        for vertex in &mesh.vertices {
            assert!((vertex.normal.length() - 1.0).abs() < 1e-6);
        }
    }
}
