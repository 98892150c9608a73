//! # Light Module
//!
//! Light descriptions and the packed uniform consumed by the main
//! draw shaders.

use bytemuck::{Pod, Zeroable};

use crate::math::{Color, Vector3};

/// A directional (sun) light.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Light direction (from the light towards the scene).
    pub direction: Vector3,
    /// Ambient contribution.
    pub ambient: Color,
    /// Diffuse contribution.
    pub diffuse: Color,
    /// Specular contribution.
    pub specular: Color,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vector3::new(-1.0, -1.0, 1.0),
            ambient: Color::new(1.2, 1.0, 1.2),
            diffuse: Color::WHITE,
            specular: Color::gray(0.5),
        }
    }
}

impl DirectionalLight {
    /// Position used when rendering the directional shadow map: back
    /// along the light direction from the scene origin.
    pub fn shadow_eye(&self, distance: f32) -> Vector3 {
        -self.direction.normalized() * distance
    }
}

/// A point light with quadratic attenuation.
#[derive(Debug, Clone)]
pub struct PointLight {
    /// World position.
    pub position: Vector3,
    /// Ambient contribution.
    pub ambient: Color,
    /// Diffuse contribution.
    pub diffuse: Color,
    /// Specular contribution.
    pub specular: Color,
    /// Constant attenuation term.
    pub constant: f32,
    /// Linear attenuation term.
    pub linear: f32,
    /// Quadratic attenuation term.
    pub quadratic: f32,
    /// Shadow range (far plane of the cube shadow map).
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vector3::new(-0.2, 1.1, 0.05),
            ambient: Color::new(1.0, 1.0, 0.6),
            diffuse: Color::new(1.0, 1.0, 0.6),
            specular: Color::new(1.0, 1.0, 0.6),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            range: 25.0,
        }
    }
}

/// Packed light parameters for the main draw shaders. Attenuation
/// terms and the shadow far plane ride in the w components.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct LightUniform {
    /// Directional light direction (xyz).
    pub dir_direction: [f32; 4],
    /// Directional ambient color.
    pub dir_ambient: [f32; 4],
    /// Directional diffuse color.
    pub dir_diffuse: [f32; 4],
    /// Directional specular color.
    pub dir_specular: [f32; 4],
    /// Point light position (xyz) + constant attenuation (w).
    pub point_position: [f32; 4],
    /// Point ambient color (rgb) + linear attenuation (w).
    pub point_ambient: [f32; 4],
    /// Point diffuse color (rgb) + quadratic attenuation (w).
    pub point_diffuse: [f32; 4],
    /// Point specular color (rgb) + shadow far plane (w).
    pub point_specular: [f32; 4],
    /// Camera position (xyz).
    pub view_position: [f32; 4],
}

impl LightUniform {
    /// Pack the scene lights and camera position.
    pub fn new(
        directional: &DirectionalLight,
        point: &PointLight,
        view_position: Vector3,
    ) -> Self {
        Self {
            dir_direction: pack(directional.direction.normalized(), 0.0),
            dir_ambient: directional.ambient.to_array4(1.0),
            dir_diffuse: directional.diffuse.to_array4(1.0),
            dir_specular: directional.specular.to_array4(1.0),
            point_position: pack(point.position, point.constant),
            point_ambient: point.ambient.to_array4(point.linear),
            point_diffuse: point.diffuse.to_array4(point.quadratic),
            point_specular: point.specular.to_array4(point.range),
            view_position: pack(view_position, 1.0),
        }
    }
}

fn pack(v: Vector3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}
