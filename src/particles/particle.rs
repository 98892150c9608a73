//! Particle data structures for GPU storage.

use bytemuck::{Pod, Zeroable};

/// Particle state stored in the GPU pool (80 bytes per slot).
/// A slot with `position_life.w <= 0` is dead; dead slots keep their
/// index in the pool and are skipped by the update and render stages.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct ParticleGpu {
    /// Position in world space (xyz) + remaining life in seconds (w).
    pub position_life: [f32; 4],
    /// Velocity (xyz).
    pub velocity: [f32; 4],
    /// Acceleration (xyz).
    pub accel: [f32; 4],
    /// Color (rgba).
    pub color: [f32; 4],
    /// Billboard scale (xy).
    pub scale: [f32; 4],
}

impl Default for ParticleGpu {
    fn default() -> Self {
        // Zeroed life marks the slot dead.
        Self {
            position_life: [0.0; 4],
            velocity: [0.0; 4],
            accel: [0.0; 4],
            color: [0.0; 4],
            scale: [0.0; 4],
        }
    }
}

/// Emitter parameters uniform consumed by the spawn shader. Every
/// attribute range of the emitter is pushed before each spawn
/// dispatch; scalars ride in otherwise-unused w components.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct EmitterParams {
    /// Minimum spawn color (rgba).
    pub min_color: [f32; 4],
    /// Maximum spawn color (rgba).
    pub max_color: [f32; 4],
    /// Minimum spatial offset (xyz).
    pub min_offset: [f32; 4],
    /// Maximum spatial offset (xyz).
    pub max_offset: [f32; 4],
    /// Minimum initial velocity (xyz).
    pub min_velocity: [f32; 4],
    /// Maximum initial velocity (xyz).
    pub max_velocity: [f32; 4],
    /// Minimum acceleration (xyz).
    pub min_accel: [f32; 4],
    /// Maximum acceleration (xyz).
    pub max_accel: [f32; 4],
    /// Minimum billboard scale (xy).
    pub min_scale: [f32; 4],
    /// Maximum billboard scale (xy).
    pub max_scale: [f32; 4],
    /// Emitter world position (xyz) + per-dispatch random seed (w).
    pub position_seed: [f32; 4],
    /// Min life (x), max life (y), spawn count (z).
    pub life_spawn: [f32; 4],
}
