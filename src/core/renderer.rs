//! Per-frame render orchestration.
//!
//! Pass order within a frame is fixed: both shadow maps are rasterized
//! first, the main color pass draws scene geometry into the HDR target
//! with the shadow maps bound read-only, the particle pipeline runs its
//! spawn/update/render stages, and bloom consumes the fully composited
//! HDR buffer to produce the final surface image. The frontend draws
//! any UI overlay onto the surface after this returns.

use bytemuck::{Pod, Zeroable};

use super::{Context, RenderConfig, DEPTH_FORMAT, HDR_FORMAT};
use crate::camera::{camera_bind_group_layout, CameraUniform, PerspectiveCamera};
use crate::geometry::Vertex;
use crate::light::LightUniform;
use crate::objects::{model_bind_group_layout, InstanceData};
use crate::postprocessing::{BloomPass, Pass};
use crate::scene::{draw_subtree, Scene};
use crate::shadows::{PointShadowMap, ShadowMap, ShadowPass};
use crate::texture::{shadow_sampler, Texture2D};

/// Render statistics for the current frame.
#[derive(Debug, Clone, Default)]
pub struct RenderInfo {
    /// Number of draw calls recorded.
    pub draw_calls: u32,
    /// Frame number.
    pub frame: u64,
}

impl RenderInfo {
    /// Reset the per-frame statistics.
    pub fn reset(&mut self) {
        self.draw_calls = 0;
    }
}

/// Scene-wide uniform for the main pass: the directional light's
/// clip-space matrix plus the packed lights.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct SceneUniform {
    light_space: [[f32; 4]; 4],
    lights: LightUniform,
}

/// The main renderer.
pub struct Renderer {
    /// Render configuration.
    config: RenderConfig,
    /// Render statistics.
    info: RenderInfo,

    // Shared bind group layouts
    camera_layout: wgpu::BindGroupLayout,
    model_layout: wgpu::BindGroupLayout,

    // Frame targets
    hdr_target: Texture2D,
    depth_view: wgpu::TextureView,

    // Per-frame uniforms
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,

    // Main pass pipelines
    object_pipeline: wgpu::RenderPipeline,
    instanced_pipeline: wgpu::RenderPipeline,

    // Shadow subsystem
    shadow_map: ShadowMap,
    point_shadow: PointShadowMap,
    shadow_pass: ShadowPass,

    // Post-processing
    bloom: BloomPass,
}

impl Renderer {
    /// Create a new renderer.
    pub fn new(ctx: &Context, config: RenderConfig) -> Self {
        let device = &ctx.device;

        let camera_layout = camera_bind_group_layout(device);
        let model_layout = model_bind_group_layout(device);

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let shadow_map = ShadowMap::new(device, config.shadow_resolution);
        let point_shadow = PointShadowMap::new(device, config.shadow_resolution);
        let shadow_pass = ShadowPass::new(device, &model_layout);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Buffer"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let comparison_sampler = shadow_sampler(device);
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow_map.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&comparison_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(point_shadow.cube_view()),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Object Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/object.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Object Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &model_layout, &scene_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str,
                             vs_entry: &str,
                             buffers: &[wgpu::VertexBufferLayout<'_>]| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(vs_entry),
                    buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: HDR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let object_pipeline = make_pipeline("Object Pipeline", "vs_main", &[Vertex::layout()]);
        let instanced_pipeline = make_pipeline(
            "Object Instanced Pipeline",
            "vs_instanced",
            &[Vertex::layout(), InstanceData::layout()],
        );

        let hdr_target = Texture2D::render_target(
            device,
            ctx.width,
            ctx.height,
            HDR_FORMAT,
            Some("HDR Target"),
        );
        let depth_view = ctx
            .create_depth_texture()
            .create_view(&wgpu::TextureViewDescriptor::default());

        let bloom = BloomPass::new(device, ctx.surface_format, ctx.width, ctx.height);

        Self {
            config,
            info: RenderInfo::default(),
            camera_layout,
            model_layout,
            hdr_target,
            depth_view,
            camera_buffer,
            camera_bind_group,
            scene_buffer,
            scene_bind_group,
            object_pipeline,
            instanced_pipeline,
            shadow_map,
            point_shadow,
            shadow_pass,
            bloom,
        }
    }

    /// Get render info.
    #[inline]
    pub fn info(&self) -> &RenderInfo {
        &self.info
    }

    /// Get the render configuration.
    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Get the shared camera bind group layout.
    #[inline]
    pub fn camera_layout(&self) -> &wgpu::BindGroupLayout {
        &self.camera_layout
    }

    /// Get the shared model bind group layout.
    #[inline]
    pub fn model_layout(&self) -> &wgpu::BindGroupLayout {
        &self.model_layout
    }

    /// Get the bloom pass.
    #[inline]
    pub fn bloom(&self) -> &BloomPass {
        &self.bloom
    }

    /// Get mutable access to the bloom pass.
    #[inline]
    pub fn bloom_mut(&mut self) -> &mut BloomPass {
        &mut self.bloom
    }

    /// Handle resize: recreate the full-resolution targets.
    pub fn resize(&mut self, ctx: &Context) {
        self.hdr_target = Texture2D::render_target(
            &ctx.device,
            ctx.width,
            ctx.height,
            HDR_FORMAT,
            Some("HDR Target"),
        );
        self.depth_view = ctx
            .create_depth_texture()
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.bloom.resize(ctx.width, ctx.height, &ctx.device);
    }

    /// Render a full frame.
    pub fn render(
        &mut self,
        ctx: &Context,
        scene: &mut Scene,
        camera: &mut PerspectiveCamera,
        delta_time: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        self.render_with_overlay(ctx, scene, camera, delta_time, |_, _| {})
    }

    /// Render a full frame, then hand the encoder and surface view to
    /// `overlay` before submission. This is the hook an external UI
    /// layer uses to draw on top of the composited image.
    pub fn render_with_overlay<F>(
        &mut self,
        ctx: &Context,
        scene: &mut Scene,
        camera: &mut PerspectiveCamera,
        delta_time: f32,
        overlay: F,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.info.reset();
        self.info.frame += 1;

        // Root-driven transform refresh keeps every draw below
        // consistent with this frame's mutations.
        scene.update_transforms();

        // Per-frame uniforms
        let camera_uniform = camera.uniform();
        ctx.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera_uniform]));

        self.shadow_map.update(&scene.directional_light);
        self.point_shadow
            .update(scene.point_light.position, scene.point_light.range);
        self.shadow_pass
            .update(&ctx.queue, &self.shadow_map, &self.point_shadow);

        let scene_uniform = SceneUniform {
            light_space: self.shadow_map.light_matrix().to_cols_array_2d(),
            lights: LightUniform::new(
                &scene.directional_light,
                &scene.point_light,
                camera.position(),
            ),
        };
        ctx.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[scene_uniform]));

        let output = ctx.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx.create_command_encoder();

        // 1. Shadow passes: depth targets must be complete before the
        //    main pass samples them.
        self.shadow_pass
            .encode_directional(&mut encoder, &ctx.queue, &self.shadow_map, scene);
        self.shadow_pass
            .encode_point(&mut encoder, &ctx.queue, &self.point_shadow, scene);

        // 2. Main color pass into the HDR target.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.hdr_target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: scene.background.r as f64,
                            g: scene.background.g as f64,
                            b: scene.background.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.object_pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_bind_group(2, &self.scene_bind_group, &[]);
            for root in &scene.roots {
                draw_subtree(root, &mut pass, &ctx.queue);
                self.info.draw_calls += 1;
            }

            pass.set_pipeline(&self.instanced_pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_bind_group(2, &self.scene_bind_group, &[]);
            for instanced in &scene.instanced {
                instanced.draw_main(&mut pass);
                self.info.draw_calls += 1;
            }
        }

        // 3. Particle pipeline: spawn -> update compute stages, then
        //    the billboard pass into the same HDR target.
        if let Some(particles) = scene.particles.as_mut() {
            particles.encode_simulation(&mut encoder, &ctx.queue, delta_time);

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.hdr_target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            particles.render(&mut pass, &self.camera_bind_group);
            self.info.draw_calls += 1;
        }

        // 4. Bloom consumes the composited HDR buffer and writes the
        //    tone-mapped result to the surface.
        self.bloom.render(
            &mut encoder,
            self.hdr_target.view(),
            &surface_view,
            &ctx.device,
            &ctx.queue,
        );

        // 5. UI overlay on the final surface image.
        overlay(&mut encoder, &surface_view);

        ctx.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
