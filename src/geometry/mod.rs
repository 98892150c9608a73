//! # Geometry Module
//!
//! Vertex types and hardcoded primitive generators used by the demo
//! scene.

mod primitives;
mod vertex;

pub use primitives::{cube, plane, uv_sphere, GeometryData};
pub use vertex::Vertex;
