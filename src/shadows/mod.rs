//! # Shadows Module
//!
//! Depth-map shadows: a single 2D map for the directional light and a
//! cube map for the point light. Both are rasterized by depth-only
//! pipelines before the main color pass reads them.

mod point_shadow;
mod shadow_map;
mod shadow_pass;

pub use point_shadow::{CubeFace, PointShadowMap};
pub use shadow_map::ShadowMap;
pub use shadow_pass::ShadowPass;
