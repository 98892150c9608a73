//! # Core Module
//!
//! Core engine functionality: wgpu context management, the per-frame
//! renderer, and timing utilities.

mod clock;
mod context;
mod engine;
mod id;
mod renderer;

pub use clock::Clock;
pub use context::{Context, ContextError};
pub use engine::{Engine, EngineBuilder};
pub use id::Id;
pub use renderer::{RenderInfo, Renderer};

/// Render configuration options.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Power preference for GPU selection.
    pub power_preference: wgpu::PowerPreference,
    /// Present mode (vsync).
    pub present_mode: wgpu::PresentMode,
    /// Shadow map resolution (both directional and cube faces).
    pub shadow_resolution: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::AutoVsync,
            shadow_resolution: 1024,
        }
    }
}

/// Texture format used for HDR intermediate targets.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Texture format used for depth targets.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
