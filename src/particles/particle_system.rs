//! Particle system: compute pipelines, render pipeline, and per-frame
//! pass encoding.

use super::emitter::EmitterConfig;
use super::gpu_resources::{ParticleGpuResources, SimParams};
use super::PARTICLE_WORKGROUP_SIZE;
use crate::core::{Id, DEPTH_FORMAT, HDR_FORMAT};
use crate::loaders;
use crate::texture::{linear_sampler, Texture2D};

/// GPU particle system.
///
/// Each frame runs three decoupled stages over the shared pool and
/// freelist: spawn (allocates slots, writes fresh particles), update
/// (integrates motion, returns expired slots), and render (instanced
/// billboards over the whole pool). The stages are encoded as
/// separate passes; wgpu makes the storage writes of each pass
/// visible to everything encoded after it, which is the ordering the
/// allocator's atomics rely on. No stage may be reordered or fused.
pub struct ParticleSystem {
    /// Unique identifier.
    id: Id,
    /// Emitter configuration (owns the spawn timer).
    pub config: EmitterConfig,
    /// GPU buffers.
    gpu: ParticleGpuResources,
    /// Billboard sprite.
    sprite: Texture2D,

    // Compute pipelines
    spawn_pipeline: wgpu::ComputePipeline,
    update_pipeline: wgpu::ComputePipeline,
    // Render pipeline
    render_pipeline: wgpu::RenderPipeline,

    // Bind groups
    storage_bind_group: wgpu::BindGroup,
    uniform_bind_group: wgpu::BindGroup,
    render_bind_group: wgpu::BindGroup,

    /// Frame counter folded into the GPU random seed.
    frame_index: u32,
}

impl ParticleSystem {
    /// Create a particle system with the given configuration.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera_layout: &wgpu::BindGroupLayout,
        config: EmitterConfig,
    ) -> Self {
        let gpu = ParticleGpuResources::new(device, config.max_particles);
        let sprite = loaders::load_texture_or_white(device, queue, &config.sprite_path);
        let sampler = linear_sampler(device);

        // Pool at binding 0, freelist at binding 1; both stay bound
        // for the duration of all three stages.
        let storage_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Storage Layout"),
            entries: &[storage_entry(0), storage_entry(1)],
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Uniform Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::COMPUTE),
                uniform_entry(1, wgpu::ShaderStages::COMPUTE),
            ],
        });

        // The render stage keeps the same pool/freelist bindings 0 and
        // 1 as the compute stages (read-only here); the billboard
        // shader only pulls from the pool.
        let render_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Render Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let spawn_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Spawn Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../shaders/particle_spawn.wgsl").into(),
            ),
        });
        let update_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Update Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../shaders/particle_update.wgsl").into(),
            ),
        });
        let render_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Render Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../shaders/particle_render.wgsl").into(),
            ),
        });

        let compute_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle Compute Pipeline Layout"),
                bind_group_layouts: &[&storage_layout, &uniform_layout],
                push_constant_ranges: &[],
            });

        let spawn_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Particle Spawn Pipeline"),
            layout: Some(&compute_pipeline_layout),
            module: &spawn_shader,
            entry_point: Some("spawn_main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let update_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Particle Update Pipeline"),
            layout: Some(&compute_pipeline_layout),
            module: &update_shader,
            entry_point: Some("update_main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle Render Pipeline Layout"),
                bind_group_layouts: &[camera_layout, &render_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &render_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &render_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::SrcAlpha,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let storage_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Storage Bind Group"),
            layout: &storage_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: gpu.particle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: gpu.freelist_buffer.as_entire_binding(),
                },
            ],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: gpu.emitter_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: gpu.sim_buffer.as_entire_binding(),
                },
            ],
        });

        let render_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Render Bind Group"),
            layout: &render_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: gpu.particle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: gpu.freelist_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(sprite.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            id: Id::new(),
            config,
            gpu,
            sprite,
            spawn_pipeline,
            update_pipeline,
            render_pipeline,
            storage_bind_group,
            uniform_bind_group,
            render_bind_group,
            frame_index: 0,
        }
    }

    /// Get the system ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the sprite texture.
    #[inline]
    pub fn sprite(&self) -> &Texture2D {
        &self.sprite
    }

    /// Kill every particle and restore the full freelist.
    pub fn reset(&mut self, queue: &wgpu::Queue) {
        self.gpu.reset(queue);
        self.config.timer = 0.0;
    }

    /// Encode the spawn and update stages for one frame.
    ///
    /// The spawn pass runs one thread per spawn credit and is skipped
    /// entirely when no credit accrued; the update pass always runs
    /// over every pool slot (dead slots are cheap no-ops). Encoding
    /// them as two passes orders the freelist traffic: all spawn-side
    /// pops complete before any update-side push.
    pub fn encode_simulation(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        delta_time: f32,
    ) {
        let spawn_count = self.config.take_spawn_credits(delta_time);

        self.frame_index = self.frame_index.wrapping_add(1);
        let seed = (self.frame_index % 0xffff) as f32 + 0.5;

        let params = self.config.to_emitter_params(spawn_count, seed);
        queue.write_buffer(&self.gpu.emitter_buffer, 0, bytemuck::cast_slice(&[params]));
        queue.write_buffer(
            &self.gpu.sim_buffer,
            0,
            bytemuck::cast_slice(&[SimParams {
                delta: [delta_time, 0.0, 0.0, 0.0],
            }]),
        );

        if spawn_count > 0 {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Particle Spawn Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.spawn_pipeline);
            pass.set_bind_group(0, &self.storage_bind_group, &[]);
            pass.set_bind_group(1, &self.uniform_bind_group, &[]);
            pass.dispatch_workgroups(spawn_count.div_ceil(PARTICLE_WORKGROUP_SIZE), 1, 1);
        }

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Particle Update Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.update_pipeline);
            pass.set_bind_group(0, &self.storage_bind_group, &[]);
            pass.set_bind_group(1, &self.uniform_bind_group, &[]);
            pass.dispatch_workgroups(
                self.gpu.max_particles.div_ceil(PARTICLE_WORKGROUP_SIZE),
                1,
                1,
            );
        }
    }

    /// Record the instanced billboard draw over the whole pool. The
    /// pool is not compacted; the vertex shader collapses dead slots.
    pub fn render(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.render_bind_group, &[]);
        render_pass.draw(0..4, 0..self.gpu.max_particles);
    }
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: false },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
