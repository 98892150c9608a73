//! GPU mesh with uploaded vertex and index buffers.

use wgpu::util::DeviceExt;

use crate::core::Id;
use crate::geometry::{GeometryData, Vertex};
use crate::loaders::LoadedGeometry;

/// A renderable mesh: vertex and index buffers resident on the GPU.
pub struct Mesh {
    /// Unique identifier.
    id: Id,
    /// Vertex buffer.
    vertex_buffer: wgpu::Buffer,
    /// Index buffer.
    index_buffer: wgpu::Buffer,
    /// Number of indices to draw.
    index_count: u32,
}

impl Mesh {
    /// Upload a mesh from raw vertices and indices.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            id: Id::new(),
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Upload a mesh from generated primitive data.
    pub fn from_data(device: &wgpu::Device, data: &GeometryData) -> Self {
        Self::new(device, &data.vertices, &data.indices)
    }

    /// Upload a mesh from loaded geometry, interleaving the attribute
    /// streams.
    pub fn from_geometry(device: &wgpu::Device, geometry: &LoadedGeometry) -> Self {
        let vertices: Vec<Vertex> = geometry
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let normal = geometry.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]);
                let uv = geometry.uvs.get(i).copied().unwrap_or([0.0, 0.0]);
                Vertex::new(*position, normal, uv)
            })
            .collect();

        Self::new(device, &vertices, &geometry.indices)
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the index count.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Record the draw call. Bind groups must already be set.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    pub(crate) fn vertex_buffer_slice(&self) -> wgpu::BufferSlice<'_> {
        self.vertex_buffer.slice(..)
    }

    pub(crate) fn index_buffer_slice(&self) -> wgpu::BufferSlice<'_> {
        self.index_buffer.slice(..)
    }
}
