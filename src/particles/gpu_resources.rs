//! GPU buffer management for the particle pool and freelist.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::particle::{EmitterParams, ParticleGpu};

/// Build the initial freelist buffer contents: the stack count
/// followed by every slot index exactly once.
pub fn initial_freelist_contents(max_particles: u32) -> Vec<u32> {
    let mut contents = Vec::with_capacity(max_particles as usize + 1);
    contents.push(max_particles);
    contents.extend(0..max_particles);
    contents
}

/// Per-dispatch simulation uniform.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct SimParams {
    /// Frame delta time in seconds (x).
    pub delta: [f32; 4],
}

/// GPU buffers for the particle simulation.
///
/// The freelist buffer holds one atomic counter followed by
/// `max_particles` slot indices. While no compute work is in flight
/// the counter equals the number of free slots and the prefix of the
/// index array holds each free slot exactly once, disjoint from the
/// live slots in the pool.
pub struct ParticleGpuResources {
    /// Storage buffer holding the fixed particle pool.
    pub particle_buffer: wgpu::Buffer,
    /// Storage buffer holding the atomic freelist.
    pub freelist_buffer: wgpu::Buffer,
    /// Emitter parameters uniform.
    pub emitter_buffer: wgpu::Buffer,
    /// Simulation uniform (delta time).
    pub sim_buffer: wgpu::Buffer,
    /// Pool capacity.
    pub max_particles: u32,
}

impl ParticleGpuResources {
    /// Create the GPU buffers for a pool of `max_particles` slots.
    pub fn new(device: &wgpu::Device, max_particles: u32) -> Self {
        // Zero-initialized pool: life 0 marks every slot dead.
        let particle_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Pool Buffer"),
            size: (max_particles as usize * std::mem::size_of::<ParticleGpu>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let freelist_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Freelist Buffer"),
            contents: bytemuck::cast_slice(&initial_freelist_contents(max_particles)),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });

        let emitter_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Emitter Params Buffer"),
            size: std::mem::size_of::<EmitterParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sim_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Sim Buffer"),
            size: std::mem::size_of::<SimParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            particle_buffer,
            freelist_buffer,
            emitter_buffer,
            sim_buffer,
            max_particles,
        }
    }

    /// Kill every particle and restore the full freelist.
    pub fn reset(&self, queue: &wgpu::Queue) {
        let dead = vec![ParticleGpu::default(); self.max_particles as usize];
        queue.write_buffer(&self.particle_buffer, 0, bytemuck::cast_slice(&dead));
        queue.write_buffer(
            &self.freelist_buffer,
            0,
            bytemuck::cast_slice(&initial_freelist_contents(self.max_particles)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_initial_freelist_holds_every_slot_once() {
        let contents = initial_freelist_contents(50);
        assert_eq!(contents.len(), 51);
        assert_eq!(contents[0], 50);

        let unique: HashSet<u32> = contents[1..].iter().copied().collect();
        assert_eq!(unique.len(), 50);
        assert!(unique.iter().all(|&i| i < 50));
    }

    /// CPU mirror of the compute shaders' freelist discipline, used to
    /// validate the allocation contract without a GPU. `pop` follows
    /// the spawn shader (guarded decrement, undo on exhaustion);
    /// `push` follows the update shader (increment reserves a cell,
    /// then the index is stored there).
    struct FreelistModel {
        count: i32,
        indices: Vec<u32>,
    }

    impl FreelistModel {
        fn new(max: u32) -> Self {
            let contents = initial_freelist_contents(max);
            Self {
                count: contents[0] as i32,
                indices: contents[1..].to_vec(),
            }
        }

        fn pop(&mut self) -> Option<u32> {
            let top = self.count;
            self.count -= 1;
            if top <= 0 {
                self.count += 1;
                return None;
            }
            Some(self.indices[(top - 1) as usize])
        }

        fn push(&mut self, slot: u32) {
            let top = self.count;
            self.count += 1;
            self.indices[top as usize] = slot;
        }
    }

    /// Update-stage mirror: integrate life, free exactly on the
    /// alive -> dead transition.
    fn update_step(lives: &mut [f32], freelist: &mut FreelistModel, dt: f32) {
        for (slot, life) in lives.iter_mut().enumerate() {
            if *life <= 0.0 {
                continue;
            }
            *life -= dt;
            if *life <= 0.0 {
                freelist.push(slot as u32);
            }
        }
    }

    #[test]
    fn test_exhaustion_drops_excess_spawns() {
        let mut freelist = FreelistModel::new(4);

        let granted: Vec<u32> = (0..7).filter_map(|_| freelist.pop()).collect();
        assert_eq!(granted.len(), 4);
        assert_eq!(freelist.count, 0);

        // Every granted index is unique.
        let unique: HashSet<u32> = granted.iter().copied().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_conservation_across_spawn_and_expiry() {
        const MAX: usize = 8;
        let mut freelist = FreelistModel::new(MAX as u32);
        let mut lives = [0.0f32; MAX];

        // Spawn five particles with staggered lifetimes.
        for life in [1.0, 2.0, 3.0, 4.0, 5.0] {
            let slot = freelist.pop().unwrap();
            lives[slot as usize] = life;
        }

        for _ in 0..6 {
            update_step(&mut lives, &mut freelist, 1.0);

            let live = lives.iter().filter(|l| **l > 0.0).count();
            assert_eq!(live + freelist.count as usize, MAX);

            // Free indices and live slots never alias.
            let free: HashSet<u32> = freelist.indices[..freelist.count as usize]
                .iter()
                .copied()
                .collect();
            assert_eq!(free.len(), freelist.count as usize);
            for (slot, life) in lives.iter().enumerate() {
                assert_eq!(*life > 0.0, !free.contains(&(slot as u32)));
            }
        }
    }

    #[test]
    fn test_expiry_frees_exactly_once() {
        let mut freelist = FreelistModel::new(4);
        let mut lives = [0.0f32; 4];

        let slot = freelist.pop().unwrap();
        lives[slot as usize] = 0.5;
        assert_eq!(freelist.count, 3);

        // The crossing frees the slot; further updates must not.
        update_step(&mut lives, &mut freelist, 1.0);
        assert_eq!(freelist.count, 4);
        update_step(&mut lives, &mut freelist, 1.0);
        update_step(&mut lives, &mut freelist, 1.0);
        assert_eq!(freelist.count, 4);
    }
}
