//! Emitter configuration and the host-side spawn timer.

use serde::{Deserialize, Serialize};

use super::particle::EmitterParams;
use crate::math::{Vector2, Vector3, Vector4};

/// Complete emitter configuration: attribute ranges sampled at spawn
/// time, the pool capacity, and the spawn accumulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Minimum spawn color.
    pub min_color: Vector4,
    /// Maximum spawn color.
    pub max_color: Vector4,
    /// Minimum spatial offset from the emitter position.
    pub min_offset: Vector3,
    /// Maximum spatial offset from the emitter position.
    pub max_offset: Vector3,
    /// Minimum initial velocity.
    pub min_velocity: Vector3,
    /// Maximum initial velocity.
    pub max_velocity: Vector3,
    /// Minimum acceleration.
    pub min_accel: Vector3,
    /// Maximum acceleration.
    pub max_accel: Vector3,
    /// Minimum billboard scale.
    pub min_scale: Vector2,
    /// Maximum billboard scale.
    pub max_scale: Vector2,
    /// Minimum lifetime in seconds.
    pub min_life: f32,
    /// Maximum lifetime in seconds.
    pub max_life: f32,
    /// Emitter world position.
    pub position: Vector3,
    /// Seconds of accumulated time per spawn credit.
    pub spawn_interval: f32,
    /// Accumulated elapsed time, kept in `[0, spawn_interval)` after
    /// each consumption.
    pub timer: f32,
    /// Fixed pool capacity.
    pub max_particles: u32,
    /// Sprite texture path for billboard rendering.
    pub sprite_path: String,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            min_color: Vector4::new(0.1, 0.1, 0.1, 1.0),
            max_color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            min_offset: Vector3::new(-0.15, 0.0, -0.15),
            max_offset: Vector3::new(0.15, 0.6, 0.15),
            min_velocity: Vector3::splat(-0.1),
            max_velocity: Vector3::splat(0.1),
            min_accel: Vector3::new(0.0, -0.02, 0.0),
            max_accel: Vector3::new(0.0, -0.01, 0.0),
            min_scale: Vector2::splat(0.01),
            max_scale: Vector2::splat(0.05),
            min_life: 15.0,
            max_life: 30.0,
            position: Vector3::new(0.0, 0.2, 0.0),
            spawn_interval: 2.0,
            timer: 0.0,
            max_particles: 50,
            sprite_path: String::from("res/textures/particle.png"),
        }
    }
}

impl EmitterConfig {
    /// Accumulate frame time and convert it into whole spawn credits.
    ///
    /// The fractional remainder is carried forward exactly, so
    /// irregular frame timing never loses or double-counts time.
    pub fn take_spawn_credits(&mut self, delta_time: f32) -> u32 {
        if self.spawn_interval <= 0.0 {
            return 0;
        }

        self.timer += delta_time;
        let credits = (self.timer / self.spawn_interval).floor();
        self.timer %= self.spawn_interval;
        credits as u32
    }

    /// Pack the uniform pushed to the spawn shader.
    pub fn to_emitter_params(&self, spawn_count: u32, seed: f32) -> EmitterParams {
        EmitterParams {
            min_color: self.min_color.to_array(),
            max_color: self.max_color.to_array(),
            min_offset: pad3(self.min_offset),
            max_offset: pad3(self.max_offset),
            min_velocity: pad3(self.min_velocity),
            max_velocity: pad3(self.max_velocity),
            min_accel: pad3(self.min_accel),
            max_accel: pad3(self.max_accel),
            min_scale: [self.min_scale.x, self.min_scale.y, 0.0, 0.0],
            max_scale: [self.max_scale.x, self.max_scale.y, 0.0, 0.0],
            position_seed: [self.position.x, self.position.y, self.position.z, seed],
            life_spawn: [self.min_life, self.max_life, spawn_count as f32, 0.0],
        }
    }
}

fn pad3(v: Vector3) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_carries_fractional_remainder() {
        let mut config = EmitterConfig {
            spawn_interval: 2.0,
            ..Default::default()
        };

        let mut total = 0;
        for dt in [0.5, 0.5, 0.5, 0.7] {
            total += config.take_spawn_credits(dt);
        }

        assert_eq!(total, 1);
        assert!((config.timer - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_large_delta_yields_multiple_credits() {
        let mut config = EmitterConfig {
            spawn_interval: 0.5,
            ..Default::default()
        };

        assert_eq!(config.take_spawn_credits(1.75), 3);
        assert!((config.timer - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_zero_delta_yields_nothing() {
        let mut config = EmitterConfig::default();
        assert_eq!(config.take_spawn_credits(0.0), 0);
        assert_eq!(config.timer, 0.0);
    }

    #[test]
    fn test_spawn_count_rides_in_uniform() {
        let config = EmitterConfig::default();
        let params = config.to_emitter_params(7, 0.25);
        assert_eq!(params.life_spawn[2], 7.0);
        assert_eq!(params.position_seed[3], 0.25);
    }
}
