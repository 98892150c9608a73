//! Point light shadow map using a cube depth texture.

use crate::core::DEPTH_FORMAT;
use crate::math::{Matrix4, Vector3};

/// Face directions for cube shadow map rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CubeFace {
    /// Positive X (+X).
    PositiveX = 0,
    /// Negative X (-X).
    NegativeX = 1,
    /// Positive Y (+Y).
    PositiveY = 2,
    /// Negative Y (-Y).
    NegativeY = 3,
    /// Positive Z (+Z).
    PositiveZ = 4,
    /// Negative Z (-Z).
    NegativeZ = 5,
}

impl CubeFace {
    /// All cube faces in layer order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Get the view direction for this face.
    pub fn direction(&self) -> Vector3 {
        match self {
            CubeFace::PositiveX => Vector3::new(1.0, 0.0, 0.0),
            CubeFace::NegativeX => Vector3::new(-1.0, 0.0, 0.0),
            CubeFace::PositiveY => Vector3::new(0.0, 1.0, 0.0),
            CubeFace::NegativeY => Vector3::new(0.0, -1.0, 0.0),
            CubeFace::PositiveZ => Vector3::new(0.0, 0.0, 1.0),
            CubeFace::NegativeZ => Vector3::new(0.0, 0.0, -1.0),
        }
    }

    /// Get the up vector for this face.
    pub fn up(&self) -> Vector3 {
        match self {
            CubeFace::PositiveY => Vector3::new(0.0, 0.0, 1.0),
            CubeFace::NegativeY => Vector3::new(0.0, 0.0, -1.0),
            _ => Vector3::new(0.0, -1.0, 0.0),
        }
    }
}

/// Omnidirectional shadow map: a 6-layer cube depth texture with one
/// 90-degree view-projection per face.
pub struct PointShadowMap {
    /// Cube depth texture.
    texture: wgpu::Texture,
    /// Per-face views for rendering.
    face_views: [wgpu::TextureView; 6],
    /// Cube view for sampling.
    cube_view: wgpu::TextureView,
    /// Resolution of each face.
    resolution: u32,
    /// Light position.
    position: Vector3,
    /// Shadow far plane.
    range: f32,
    /// View-projection matrices per face.
    matrices: [Matrix4; 6],
}

impl PointShadowMap {
    /// Create a new point shadow map.
    pub fn new(device: &wgpu::Device, resolution: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Point Shadow Cube Map"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let face_views: [wgpu::TextureView; 6] = std::array::from_fn(|i| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some(&format!("Point Shadow Face {}", i)),
                format: Some(DEPTH_FORMAT),
                dimension: Some(wgpu::TextureViewDimension::D2),
                aspect: wgpu::TextureAspect::DepthOnly,
                base_mip_level: 0,
                mip_level_count: Some(1),
                base_array_layer: i as u32,
                array_layer_count: Some(1),
            })
        });

        let cube_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Point Shadow Cube View"),
            format: Some(DEPTH_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            aspect: wgpu::TextureAspect::DepthOnly,
            base_mip_level: 0,
            mip_level_count: Some(1),
            base_array_layer: 0,
            array_layer_count: Some(6),
        });

        Self {
            texture,
            face_views,
            cube_view,
            resolution,
            position: Vector3::ZERO,
            range: 25.0,
            matrices: [Matrix4::IDENTITY; 6],
        }
    }

    /// Update the face matrices for a light at `position` with the
    /// given shadow range.
    pub fn update(&mut self, position: Vector3, range: f32) {
        self.position = position;
        self.range = range;

        let projection = Matrix4::perspective(90.0, 1.0, 1.0, range);
        for (i, face) in CubeFace::ALL.iter().enumerate() {
            let target = position + face.direction();
            let view = Matrix4::look_at(&position, &target, &face.up());
            self.matrices[i] = projection.multiply(&view);
        }
    }

    /// Get the view for rendering one face.
    #[inline]
    pub fn face_view(&self, face: CubeFace) -> &wgpu::TextureView {
        &self.face_views[face as usize]
    }

    /// Get the cube view for sampling.
    #[inline]
    pub fn cube_view(&self) -> &wgpu::TextureView {
        &self.cube_view
    }

    /// Get the underlying texture.
    #[inline]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Get the per-face resolution.
    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Get the light position.
    #[inline]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Get the shadow far plane.
    #[inline]
    pub fn range(&self) -> f32 {
        self.range
    }

    /// Get the view-projection matrix for one face.
    #[inline]
    pub fn face_matrix(&self, face: CubeFace) -> &Matrix4 {
        &self.matrices[face as usize]
    }
}
