//! # Camera Module
//!
//! Perspective camera and the per-frame camera uniform.

mod perspective;

pub use perspective::PerspectiveCamera;

use bytemuck::{Pod, Zeroable};

/// Per-frame camera uniform (group 0 in every render shader).
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world position (xyz).
    pub position: [f32; 4],
    /// Camera right vector (xyz), used for billboarding.
    pub right: [f32; 4],
    /// Camera up vector (xyz), used for billboarding.
    pub up: [f32; 4],
}

/// Create the bind group layout for the camera uniform.
pub fn camera_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Camera Bind Group Layout"),
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
