//! # Ember - Real-Time 3D Rendering Demo
//!
//! Ember is a small rendering engine built with Rust on top of wgpu.
//! It demonstrates a hierarchical scene graph with lazy transform
//! propagation, a fully GPU-resident particle system driven by compute
//! passes, directional and omnidirectional shadow mapping, instanced
//! rendering, and an HDR bloom post-process.
//!
//! ## Features
//!
//! - **Math**: 3D math types (vectors, column-major matrices, colors)
//! - **Scene**: Entity tree with dirty-flag world-matrix caching
//! - **Particles**: compute-driven pool with an atomic freelist
//! - **Shadows**: 2D and cube depth maps consumed by the main pass
//! - **Postprocessing**: threshold + separable blur bloom pipeline
//!
//! ## Example
//!
//! ```ignore
//! use ember::prelude::*;
//!
//! let mut engine = Engine::new(window, 1920, 1080).await?;
//! let mut demo = ember::demo::Demo::build(&engine);
//! let mut camera = PerspectiveCamera::new(60.0, engine.aspect_ratio(), 0.1, 100.0);
//!
//! loop {
//!     let dt = engine.delta_time();
//!     demo.animate(dt);
//!     engine.render_scene(&mut demo.scene, &mut camera, dt)?;
//! }
//! ```

#![warn(missing_docs)]

pub mod math;
pub mod core;
pub mod scene;
pub mod camera;
pub mod geometry;
pub mod objects;
pub mod texture;
pub mod loaders;
pub mod light;
pub mod shadows;
pub mod particles;
pub mod postprocessing;
pub mod demo;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::math::*;
    pub use crate::core::*;
    pub use crate::scene::*;
    pub use crate::camera::*;
    pub use crate::geometry::*;
    pub use crate::objects::*;
    pub use crate::texture::*;
    pub use crate::loaders::*;
    pub use crate::light::*;
    pub use crate::shadows::*;
    pub use crate::particles::*;
    pub use crate::postprocessing::*;
}

/// Engine version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const NAME: &str = "Ember";
