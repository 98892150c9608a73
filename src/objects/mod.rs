//! # Objects Module
//!
//! Renderable objects: single meshes and instanced meshes, plus the
//! model uniform they expose to draw shaders.

mod instanced_mesh;
mod mesh;

pub use instanced_mesh::{InstanceData, InstancedMesh};
pub use mesh::Mesh;

use crate::math::{Color, Matrix4};
use bytemuck::{Pod, Zeroable};

/// Per-draw model uniform: world matrix, normal matrix, base color.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct ModelUniform {
    /// World (model) matrix, column-major.
    pub model: [[f32; 4]; 4],
    /// Normal matrix (inverse transpose of the model's 3x3 block).
    pub normal: [[f32; 4]; 4],
    /// Base color (RGBA).
    pub color: [f32; 4],
}

impl ModelUniform {
    /// Build the uniform from a world matrix and base color.
    pub fn new(model: &Matrix4, color: Color) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.normal_matrix().to_cols_array_2d(),
            color: color.to_array4(1.0),
        }
    }
}

/// Create the bind group layout for the model uniform (group 1 in the
/// generic draw and shadow shaders).
pub fn model_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Model Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}
