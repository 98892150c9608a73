//! Directional shadow map texture and light matrix.

use crate::core::DEPTH_FORMAT;
use crate::light::DirectionalLight;
use crate::math::{Matrix4, Vector3};

/// Half-extent of the orthographic shadow volume.
const ORTHO_EXTENT: f32 = 10.0;
/// Near plane of the light projection.
const NEAR: f32 = 1.0;
/// Far plane of the light projection.
const FAR: f32 = 20.0;
/// Distance of the virtual light eye from the scene origin.
const EYE_DISTANCE: f32 = 8.66;

/// A 2D depth map rendered from the directional light's view.
pub struct ShadowMap {
    /// Depth texture.
    texture: wgpu::Texture,
    /// Texture view for rendering and sampling.
    view: wgpu::TextureView,
    /// Resolution.
    resolution: u32,
    /// Light-space view-projection matrix.
    light_matrix: Matrix4,
}

impl ShadowMap {
    /// Create a new shadow map with the given resolution.
    pub fn new(device: &wgpu::Device, resolution: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            resolution,
            light_matrix: Matrix4::IDENTITY,
        }
    }

    /// Recompute the light-space matrix for the given light: an
    /// orthographic projection looking along the light direction at
    /// the scene origin.
    pub fn update(&mut self, light: &DirectionalLight) {
        let eye = light.shadow_eye(EYE_DISTANCE);
        let view = Matrix4::look_at(&eye, &Vector3::ZERO, &Vector3::UP);
        let projection = Matrix4::orthographic(
            -ORTHO_EXTENT,
            ORTHO_EXTENT,
            -ORTHO_EXTENT,
            ORTHO_EXTENT,
            NEAR,
            FAR,
        );
        self.light_matrix = projection.multiply(&view);
    }

    /// Get the texture view.
    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Get the underlying texture.
    #[inline]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Get the resolution.
    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Get the light-space matrix.
    #[inline]
    pub fn light_matrix(&self) -> &Matrix4 {
        &self.light_matrix
    }
}
