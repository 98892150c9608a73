//! RGB color type.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// An RGB color with components in linear space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
}

impl Color {
    /// Pure white.
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };
    /// Pure black.
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };

    /// Create a new color.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a grayscale color.
    #[inline]
    pub const fn gray(v: f32) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Convert to an RGBA array with the given alpha.
    #[inline]
    pub const fn to_array4(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    /// Convert to an RGB array.
    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Multiply all components by a scalar (intensity scaling).
    #[inline]
    pub fn scale(&self, s: f32) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s)
    }
}
