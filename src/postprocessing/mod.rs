//! # Postprocessing Module
//!
//! Full-screen post-process passes applied after the scene and
//! particle passes have composited into the HDR target.

mod bloom_pass;
mod pass;

pub use bloom_pass::{BloomPass, BloomSettings};
pub use pass::{Pass, FullscreenVertex, FULLSCREEN_QUAD_VERTICES};
