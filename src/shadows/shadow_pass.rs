//! Depth-only shadow rendering pipelines.

use bytemuck::{Pod, Zeroable};

use super::{CubeFace, PointShadowMap, ShadowMap};
use crate::core::DEPTH_FORMAT;
use crate::geometry::Vertex;
use crate::objects::InstanceData;
use crate::scene::{draw_subtree, Scene};

/// Depth-only shader with entries for plain and instanced geometry.
/// The point-light fragment entry overwrites depth with the linear
/// distance to the light so the cube map can be compared against
/// world-space distances.
const SHADOW_SHADER: &str = r#"
struct LightCamera {
    view_proj: mat4x4<f32>,
    // xyz = light position, w = far plane
    position_range: vec4<f32>,
}

struct Model {
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
    color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> light_camera: LightCamera;
@group(1) @binding(0) var<uniform> model: Model;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    let world = model.model * vec4<f32>(position, 1.0);
    out.world_position = world.xyz;
    out.clip_position = light_camera.view_proj * world;
    return out;
}

@vertex
fn vs_instanced(
    @location(0) position: vec3<f32>,
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    let instance_model = mat4x4<f32>(model_0, model_1, model_2, model_3);
    let world = instance_model * vec4<f32>(position, 1.0);
    out.world_position = world.xyz;
    out.clip_position = light_camera.view_proj * world;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) {
    // Depth is written by the rasterizer.
}

@fragment
fn fs_point(in: VertexOutput) -> @builtin(frag_depth) f32 {
    let distance = length(in.world_position - light_camera.position_range.xyz);
    return distance / light_camera.position_range.w;
}
"#;

/// Uniform pushed per shadow view.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct LightCameraUniform {
    view_proj: [[f32; 4]; 4],
    position_range: [f32; 4],
}

/// Shadow pass: depth-only pipelines for scene-graph entities and
/// instanced meshes, for both the directional map and the cube map.
pub struct ShadowPass {
    plain_dir_pipeline: wgpu::RenderPipeline,
    instanced_dir_pipeline: wgpu::RenderPipeline,
    plain_point_pipeline: wgpu::RenderPipeline,
    instanced_point_pipeline: wgpu::RenderPipeline,
    dir_buffer: wgpu::Buffer,
    dir_bind_group: wgpu::BindGroup,
    face_buffers: Vec<wgpu::Buffer>,
    face_bind_groups: Vec<wgpu::BindGroup>,
}

impl ShadowPass {
    /// Create the shadow pipelines. `model_layout` is the shared
    /// model-uniform layout used by entity draws (group 1).
    pub fn new(device: &wgpu::Device, model_layout: &wgpu::BindGroupLayout) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADOW_SHADER.into()),
        });

        let light_camera_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Light Camera Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let plain_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Plain Pipeline Layout"),
            bind_group_layouts: &[&light_camera_layout, model_layout],
            push_constant_ranges: &[],
        });

        let instanced_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Instanced Pipeline Layout"),
            bind_group_layouts: &[&light_camera_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str,
                             layout: &wgpu::PipelineLayout,
                             vs_entry: &str,
                             fs_entry: &str,
                             buffers: &[wgpu::VertexBufferLayout<'_>]| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(vs_entry),
                    buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs_entry),
                    targets: &[],
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
                    bias: wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let plain_buffers = [Vertex::layout()];
        let instanced_buffers = [Vertex::layout(), InstanceData::layout()];

        let plain_dir_pipeline = make_pipeline(
            "Shadow Plain Pipeline",
            &plain_layout,
            "vs_main",
            "fs_main",
            &plain_buffers,
        );
        let instanced_dir_pipeline = make_pipeline(
            "Shadow Instanced Pipeline",
            &instanced_layout,
            "vs_instanced",
            "fs_main",
            &instanced_buffers,
        );
        let plain_point_pipeline = make_pipeline(
            "Point Shadow Plain Pipeline",
            &plain_layout,
            "vs_main",
            "fs_point",
            &plain_buffers,
        );
        let instanced_point_pipeline = make_pipeline(
            "Point Shadow Instanced Pipeline",
            &instanced_layout,
            "vs_instanced",
            "fs_point",
            &instanced_buffers,
        );

        let dir_buffer = light_uniform_buffer(device, "Directional Shadow Uniform");
        let dir_bind_group = light_bind_group(device, &light_camera_layout, &dir_buffer);

        let face_buffers: Vec<wgpu::Buffer> = (0..6)
            .map(|_| light_uniform_buffer(device, "Point Shadow Face Uniform"))
            .collect();
        let face_bind_groups = face_buffers
            .iter()
            .map(|buffer| light_bind_group(device, &light_camera_layout, buffer))
            .collect();

        Self {
            plain_dir_pipeline,
            instanced_dir_pipeline,
            plain_point_pipeline,
            instanced_point_pipeline,
            dir_buffer,
            dir_bind_group,
            face_buffers,
            face_bind_groups,
        }
    }

    /// Upload the light matrices for both shadow maps.
    pub fn update(&self, queue: &wgpu::Queue, shadow_map: &ShadowMap, point: &PointShadowMap) {
        let dir_uniform = LightCameraUniform {
            view_proj: shadow_map.light_matrix().to_cols_array_2d(),
            position_range: [0.0, 0.0, 0.0, 1.0],
        };
        queue.write_buffer(&self.dir_buffer, 0, bytemuck::cast_slice(&[dir_uniform]));

        let position = point.position();
        for (i, face) in CubeFace::ALL.iter().enumerate() {
            let uniform = LightCameraUniform {
                view_proj: point.face_matrix(*face).to_cols_array_2d(),
                position_range: [position.x, position.y, position.z, point.range()],
            };
            queue.write_buffer(&self.face_buffers[i], 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    /// Rasterize the directional shadow map.
    pub fn encode_directional(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        shadow_map: &ShadowMap,
        scene: &Scene,
    ) {
        let mut pass = begin_depth_pass(encoder, shadow_map.view(), "Directional Shadow Pass");
        self.record_scene(
            &mut pass,
            queue,
            scene,
            &self.plain_dir_pipeline,
            &self.instanced_dir_pipeline,
            &self.dir_bind_group,
        );
    }

    /// Rasterize all six faces of the point shadow cube map.
    pub fn encode_point(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        point: &PointShadowMap,
        scene: &Scene,
    ) {
        for (i, face) in CubeFace::ALL.iter().enumerate() {
            let mut pass = begin_depth_pass(encoder, point.face_view(*face), "Point Shadow Pass");
            self.record_scene(
                &mut pass,
                queue,
                scene,
                &self.plain_point_pipeline,
                &self.instanced_point_pipeline,
                &self.face_bind_groups[i],
            );
        }
    }

    fn record_scene(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        queue: &wgpu::Queue,
        scene: &Scene,
        plain_pipeline: &wgpu::RenderPipeline,
        instanced_pipeline: &wgpu::RenderPipeline,
        light_bind_group: &wgpu::BindGroup,
    ) {
        pass.set_pipeline(plain_pipeline);
        pass.set_bind_group(0, light_bind_group, &[]);
        for root in &scene.roots {
            draw_subtree(root, pass, queue);
        }

        pass.set_pipeline(instanced_pipeline);
        pass.set_bind_group(0, light_bind_group, &[]);
        for instanced in &scene.instanced {
            instanced.draw(pass);
        }
    }
}

fn light_uniform_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<LightCameraUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn light_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Shadow Light Camera Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn begin_depth_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    label: &'static str,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}
