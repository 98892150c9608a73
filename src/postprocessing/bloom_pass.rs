//! Bloom post-processing effect.
//!
//! Bright pixels are extracted into a half-resolution target, blurred
//! with a separable Gaussian ping-pong, and composited over the HDR
//! scene with exposure tone mapping into the final output.

use serde::{Deserialize, Serialize};
use wgpu::util::DeviceExt;

use super::pass::{FullscreenVertex, Pass, FULLSCREEN_QUAD_VERTICES};
use crate::core::HDR_FORMAT;
use crate::texture::{linear_sampler, Texture2D};

/// Bloom effect settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloomSettings {
    /// Bloom intensity applied at composite time.
    pub intensity: f32,
    /// Brightness threshold for the bright-pass.
    pub threshold: f32,
    /// Soft knee for the threshold.
    pub soft_threshold: f32,
    /// Number of blur iterations (each is one vertical + one
    /// horizontal tap sweep).
    pub blur_iterations: u32,
    /// Exposure applied during tone mapping.
    pub exposure: f32,
    /// Whether the blurred brights are added at all. Tone mapping
    /// still runs when disabled.
    pub bloom: bool,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            threshold: 1.0,
            soft_threshold: 0.5,
            blur_iterations: 5,
            exposure: 1.0,
            bloom: true,
        }
    }
}

/// Bloom uniform data.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BloomUniform {
    threshold: f32,
    soft_threshold: f32,
    intensity: f32,
    exposure: f32,
    resolution: [f32; 4],
    // x = bloom enabled
    flags: [f32; 4],
}

/// Bloom post-processing pass.
pub struct BloomPass {
    enabled: bool,
    settings: BloomSettings,
    width: u32,
    height: u32,
    // Pipelines
    threshold_pipeline: wgpu::RenderPipeline,
    blur_h_pipeline: wgpu::RenderPipeline,
    blur_v_pipeline: wgpu::RenderPipeline,
    combine_pipeline: wgpu::RenderPipeline,
    // Layouts
    single_input_layout: wgpu::BindGroupLayout,
    combine_layout: wgpu::BindGroupLayout,
    // Intermediate targets (half resolution)
    bright: Texture2D,
    blur_targets: [Texture2D; 2],
    // Buffers
    uniform_buffer: wgpu::Buffer,
    quad_buffer: wgpu::Buffer,
    // Sampler
    sampler: wgpu::Sampler,
}

impl BloomPass {
    /// Create the bloom pass. `output_format` is the swapchain format
    /// the composite writes to.
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        Self::with_settings(device, output_format, width, height, BloomSettings::default())
    }

    /// Create with custom settings.
    pub fn with_settings(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        settings: BloomSettings,
    ) -> Self {
        let sampler = linear_sampler(device);

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let uniform_layout_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let single_input_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Input Layout"),
                entries: &[texture_entry(0), sampler_entry(1), uniform_layout_entry(2)],
            });

        let combine_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Combine Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                sampler_entry(2),
                uniform_layout_entry(3),
            ],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bloom Uniform Buffer"),
            size: std::mem::size_of::<BloomUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bloom Quad Buffer"),
            contents: bytemuck::cast_slice(&FULLSCREEN_QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let single_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Bloom Pipeline Layout"),
                bind_group_layouts: &[&single_input_layout],
                push_constant_ranges: &[],
            });
        let combine_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Bloom Combine Pipeline Layout"),
                bind_group_layouts: &[&combine_layout],
                push_constant_ranges: &[],
            });

        let make_pipeline = |label: &str,
                             layout: &wgpu::PipelineLayout,
                             source: &str,
                             format: wgpu::TextureFormat| {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[FullscreenVertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let threshold_pipeline = make_pipeline(
            "Bloom Threshold Pipeline",
            &single_pipeline_layout,
            THRESHOLD_SHADER,
            HDR_FORMAT,
        );
        let blur_h_pipeline = make_pipeline(
            "Bloom Blur H Pipeline",
            &single_pipeline_layout,
            BLUR_H_SHADER,
            HDR_FORMAT,
        );
        let blur_v_pipeline = make_pipeline(
            "Bloom Blur V Pipeline",
            &single_pipeline_layout,
            BLUR_V_SHADER,
            HDR_FORMAT,
        );
        let combine_pipeline = make_pipeline(
            "Bloom Combine Pipeline",
            &combine_pipeline_layout,
            COMBINE_SHADER,
            output_format,
        );

        let (bright, blur_targets) = Self::create_targets(device, width, height);

        Self {
            enabled: true,
            settings,
            width,
            height,
            threshold_pipeline,
            blur_h_pipeline,
            blur_v_pipeline,
            combine_pipeline,
            single_input_layout,
            combine_layout,
            bright,
            blur_targets,
            uniform_buffer,
            quad_buffer,
            sampler,
        }
    }

    /// Get settings.
    pub fn settings(&self) -> &BloomSettings {
        &self.settings
    }

    /// Get mutable settings.
    pub fn settings_mut(&mut self) -> &mut BloomSettings {
        &mut self.settings
    }

    fn create_targets(device: &wgpu::Device, width: u32, height: u32) -> (Texture2D, [Texture2D; 2]) {
        let half_w = (width / 2).max(1);
        let half_h = (height / 2).max(1);
        let bright = Texture2D::render_target(
            device,
            half_w,
            half_h,
            HDR_FORMAT,
            Some("Bloom Bright Texture"),
        );
        let blur_targets = [
            Texture2D::render_target(device, half_w, half_h, HDR_FORMAT, Some("Bloom Blur 0")),
            Texture2D::render_target(device, half_w, half_h, HDR_FORMAT, Some("Bloom Blur 1")),
        ];
        (bright, blur_targets)
    }

    fn single_input_bind_group(
        &self,
        device: &wgpu::Device,
        input: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Input Bind Group"),
            layout: &self.single_input_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    fn fullscreen_draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
        target: &wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
        label: &'static str,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        pass.draw(0..6, 0..1);
    }
}

impl Pass for BloomPass {
    fn name(&self) -> &str {
        "bloom"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn resize(&mut self, width: u32, height: u32, device: &wgpu::Device) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        let (bright, blur_targets) = Self::create_targets(device, width, height);
        self.bright = bright;
        self.blur_targets = blur_targets;
    }

    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) {
        let uniform = BloomUniform {
            threshold: self.settings.threshold,
            soft_threshold: self.settings.soft_threshold,
            intensity: self.settings.intensity,
            exposure: self.settings.exposure,
            resolution: [
                self.width as f32,
                self.height as f32,
                2.0 / self.width as f32,
                2.0 / self.height as f32,
            ],
            flags: [
                if self.settings.bloom && self.enabled { 1.0 } else { 0.0 },
                0.0,
                0.0,
                0.0,
            ],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));

        // Step 1: extract bright pixels into the half-res target.
        let scene_bind_group = self.single_input_bind_group(device, input);
        self.fullscreen_draw(
            encoder,
            &self.threshold_pipeline,
            &scene_bind_group,
            self.bright.view(),
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            "Bloom Threshold Pass",
        );

        // Step 2: separable blur, ping-ponging between the two
        // half-res targets. bright -> blur0, then blur0 <-> blur1.
        let bright_bind_group = self.single_input_bind_group(device, self.bright.view());
        let blur0_bind_group = self.single_input_bind_group(device, self.blur_targets[0].view());
        let blur1_bind_group = self.single_input_bind_group(device, self.blur_targets[1].view());

        self.fullscreen_draw(
            encoder,
            &self.blur_h_pipeline,
            &bright_bind_group,
            self.blur_targets[0].view(),
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            "Bloom Blur H Pass",
        );

        for i in 0..self.settings.blur_iterations {
            self.fullscreen_draw(
                encoder,
                &self.blur_v_pipeline,
                &blur0_bind_group,
                self.blur_targets[1].view(),
                wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                "Bloom Blur V Pass",
            );
            if i < self.settings.blur_iterations - 1 {
                self.fullscreen_draw(
                    encoder,
                    &self.blur_h_pipeline,
                    &blur1_bind_group,
                    self.blur_targets[0].view(),
                    wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    "Bloom Blur H Pass",
                );
            }
        }

        // Step 3: tone map the scene plus blurred brights into the
        // output target.
        let combine_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Combine Bind Group"),
            layout: &self.combine_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(self.blur_targets[1].view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        self.fullscreen_draw(
            encoder,
            &self.combine_pipeline,
            &combine_bind_group,
            output,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            "Bloom Combine Pass",
        );
    }
}

// Shader sources

const THRESHOLD_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

struct Params {
    threshold: f32,
    soft_threshold: f32,
    intensity: f32,
    exposure: f32,
    resolution: vec4<f32>,
    flags: vec4<f32>,
}

@group(0) @binding(0) var input_texture: texture_2d<f32>;
@group(0) @binding(1) var input_sampler: sampler;
@group(0) @binding(2) var<uniform> params: Params;

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(input_texture, input_sampler, in.uv);
    let brightness = dot(color.rgb, vec3<f32>(0.2126, 0.7152, 0.0722));
    let knee = params.threshold * params.soft_threshold;
    let contribution = smoothstep(params.threshold - knee, params.threshold + knee, brightness);
    return vec4<f32>(color.rgb * contribution, 1.0);
}
"#;

const BLUR_H_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

struct Params {
    threshold: f32,
    soft_threshold: f32,
    intensity: f32,
    exposure: f32,
    resolution: vec4<f32>,
    flags: vec4<f32>,
}

@group(0) @binding(0) var input_texture: texture_2d<f32>;
@group(0) @binding(1) var input_sampler: sampler;
@group(0) @binding(2) var<uniform> params: Params;

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let pixel_size = params.resolution.zw;
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);

    var color = textureSample(input_texture, input_sampler, in.uv).rgb * weights[0];
    for (var i = 1; i < 5; i++) {
        let offset = vec2<f32>(f32(i) * pixel_size.x, 0.0);
        color += textureSample(input_texture, input_sampler, in.uv + offset).rgb * weights[i];
        color += textureSample(input_texture, input_sampler, in.uv - offset).rgb * weights[i];
    }

    return vec4<f32>(color, 1.0);
}
"#;

const BLUR_V_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

struct Params {
    threshold: f32,
    soft_threshold: f32,
    intensity: f32,
    exposure: f32,
    resolution: vec4<f32>,
    flags: vec4<f32>,
}

@group(0) @binding(0) var input_texture: texture_2d<f32>;
@group(0) @binding(1) var input_sampler: sampler;
@group(0) @binding(2) var<uniform> params: Params;

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let pixel_size = params.resolution.zw;
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);

    var color = textureSample(input_texture, input_sampler, in.uv).rgb * weights[0];
    for (var i = 1; i < 5; i++) {
        let offset = vec2<f32>(0.0, f32(i) * pixel_size.y);
        color += textureSample(input_texture, input_sampler, in.uv + offset).rgb * weights[i];
        color += textureSample(input_texture, input_sampler, in.uv - offset).rgb * weights[i];
    }

    return vec4<f32>(color, 1.0);
}
"#;

const COMBINE_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

struct Params {
    threshold: f32,
    soft_threshold: f32,
    intensity: f32,
    exposure: f32,
    resolution: vec4<f32>,
    flags: vec4<f32>,
}

@group(0) @binding(0) var scene_texture: texture_2d<f32>;
@group(0) @binding(1) var bloom_texture: texture_2d<f32>;
@group(0) @binding(2) var input_sampler: sampler;
@group(0) @binding(3) var<uniform> params: Params;

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var hdr = textureSample(scene_texture, input_sampler, in.uv).rgb;
    if (params.flags.x > 0.5) {
        hdr += textureSample(bloom_texture, input_sampler, in.uv).rgb * params.intensity;
    }

    // Exposure tone mapping; the sRGB swapchain handles gamma.
    let mapped = vec3<f32>(1.0) - exp(-hdr * params.exposure);
    return vec4<f32>(mapped, 1.0);
}
"#;
