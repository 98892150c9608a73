//! # Math Module
//!
//! 3D math types used throughout the engine: vectors, a column-major
//! 4x4 matrix, and an RGB color. Everything is plain `f32` data that
//! can be handed to the GPU directly.

mod color;
mod matrix4;
mod vector2;
mod vector3;
mod vector4;

pub use color::Color;
pub use matrix4::Matrix4;
pub use vector2::Vector2;
pub use vector3::Vector3;
pub use vector4::Vector4;

/// Convert degrees to radians.
#[inline]
pub fn to_radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Convert radians to degrees.
#[inline]
pub fn to_degrees(radians: f32) -> f32 {
    radians * 180.0 / std::f32::consts::PI
}
