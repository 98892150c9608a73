//! Instanced mesh for rendering many copies efficiently.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::core::Id;
use crate::geometry::GeometryData;
use crate::math::{Color, Matrix4};
use crate::objects::{Mesh, ModelUniform};

/// Per-instance data for GPU instancing.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct InstanceData {
    /// Model matrix (column-major).
    pub model_matrix: [[f32; 4]; 4],
}

impl Default for InstanceData {
    fn default() -> Self {
        Self {
            model_matrix: Matrix4::IDENTITY.to_cols_array_2d(),
        }
    }
}

impl InstanceData {
    /// Create instance data from a world matrix.
    pub fn from_matrix(matrix: &Matrix4) -> Self {
        Self {
            model_matrix: matrix.to_cols_array_2d(),
        }
    }

    /// Get the vertex buffer layout for instancing: the matrix is
    /// consumed as four vec4 attributes with an instance step mode.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x4,
        },
        wgpu::VertexAttribute {
            offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
            shader_location: 4,
            format: wgpu::VertexFormat::Float32x4,
        },
        wgpu::VertexAttribute {
            offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
            shader_location: 5,
            format: wgpu::VertexFormat::Float32x4,
        },
        wgpu::VertexAttribute {
            offset: std::mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
            shader_location: 6,
            format: wgpu::VertexFormat::Float32x4,
        },
    ];
}

/// An instanced mesh renders many copies of the same geometry with a
/// single draw call. The instance transforms are uploaded once at
/// creation; the demo scene's scattered fields never move.
pub struct InstancedMesh {
    /// Unique identifier.
    id: Id,
    /// Shared geometry.
    mesh: Mesh,
    /// Instance buffer (GPU side).
    instance_buffer: wgpu::Buffer,
    /// Number of instances.
    instance_count: u32,
    /// Model uniform bind group (identity matrix, per-mesh tint).
    model_bind_group: wgpu::BindGroup,
}

impl InstancedMesh {
    /// Upload an instanced mesh from geometry, instance transforms,
    /// and a tint color.
    pub fn new(
        device: &wgpu::Device,
        model_layout: &wgpu::BindGroupLayout,
        data: &GeometryData,
        matrices: &[Matrix4],
        color: Color,
    ) -> Self {
        let instances: Vec<InstanceData> =
            matrices.iter().map(InstanceData::from_matrix).collect();

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // The world transform comes from the instance attributes; the
        // model uniform only contributes the tint.
        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instanced Model Buffer"),
            contents: bytemuck::cast_slice(&[ModelUniform::new(&Matrix4::IDENTITY, color)]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Instanced Model Bind Group"),
            layout: model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });

        Self {
            id: Id::new(),
            mesh: Mesh::from_data(device, data),
            instance_buffer,
            instance_count: instances.len() as u32,
            model_bind_group,
        }
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the instance count.
    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Record the instanced draw call for the main pass (binds the
    /// model uniform at group 1).
    pub fn draw_main(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(1, &self.model_bind_group, &[]);
        self.draw(render_pass);
    }

    /// Record the instanced draw call with whatever bind groups the
    /// caller has set (used by the depth-only shadow pipelines).
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        self.mesh.draw_instanced(render_pass, self.instance_count);
    }
}

impl Mesh {
    /// Record an instanced draw over the given number of instances.
    pub(crate) fn draw_instanced(&self, render_pass: &mut wgpu::RenderPass<'_>, instances: u32) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer_slice());
        render_pass.set_index_buffer(self.index_buffer_slice(), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count(), 0, 0..instances);
    }
}
