//! The hardcoded demo scene.
//!
//! Scene contents are fixed in code: a ground plane with nested
//! mirror and lamp entities, a parent sphere with an orbiting child,
//! two instanced scatter fields, and a smoke emitter.

use std::sync::{Arc, RwLock};

use rand::Rng;

use crate::core::Engine;
use crate::geometry::{cube, plane, uv_sphere};
use crate::math::{Color, Matrix4, Vector3};
use crate::objects::{InstancedMesh, Mesh};
use crate::particles::{EmitterConfig, ParticleSystem};
use crate::scene::{Entity, Scene};

/// Orbit radius of the child sphere, in the parent's local space.
const ORBIT_RADIUS: f32 = 10.0;

/// The demo scene plus its animation state.
pub struct Demo {
    /// The scene consumed by the renderer.
    pub scene: Scene,
    /// Handle to the orbiting child sphere.
    orbit_child: Arc<RwLock<Entity>>,
    /// Accumulated orbit angle in radians.
    orbit_angle: f32,
}

impl Demo {
    /// Build the demo scene.
    pub fn build(engine: &Engine) -> Self {
        let device = engine.device();
        let queue = engine.queue();
        let camera_layout = engine.renderer.camera_layout();
        let model_layout = engine.renderer.model_layout();

        let mut scene = Scene::new();

        // Ground plane with the lamp and mirror attached as children.
        let mut floor = Entity::with_meshes(vec![Mesh::from_data(device, &plane(20.0, 20.0))]);
        floor.set_name("floor");
        floor.color = Color::new(0.35, 0.4, 0.3);
        floor.init_gpu(device, model_layout);
        let floor = scene.add_root(floor);

        let mut mirror = Entity::with_meshes(vec![Mesh::from_data(device, &cube(1.0))]);
        mirror.set_name("mirror");
        mirror.color = Color::gray(0.85);
        mirror.init_gpu(device, model_layout);
        mirror.transform.set_local_position(Vector3::new(0.0, 0.5, -2.0));
        mirror.transform.set_local_scale(Vector3::new(1.2, 1.0, 0.05));
        let mirror = Entity::add_child(&floor, mirror);

        let mut glass = Entity::with_meshes(vec![Mesh::from_data(device, &cube(1.0))]);
        glass.set_name("mirror_glass");
        glass.color = Color::new(0.7, 0.8, 0.9);
        glass.init_gpu(device, model_layout);
        glass.transform.set_local_position(Vector3::new(0.0, 0.0, 0.3));
        glass.transform.set_local_scale(Vector3::new(0.9, 0.9, 0.5));
        Entity::add_child(&mirror, glass);

        let mut lamp = Entity::with_meshes(vec![Mesh::from_data(device, &cube(1.0))]);
        lamp.set_name("lamp");
        lamp.color = Color::gray(0.2);
        lamp.init_gpu(device, model_layout);
        lamp.transform.set_local_position(Vector3::new(-0.3, 0.5, 0.8));
        lamp.transform.set_local_scale(Vector3::new(0.1, 1.0, 0.1));
        let lamp = Entity::add_child(&floor, lamp);

        // HDR color well above 1.0 so the bloom bright-pass picks the
        // lamp head up.
        let mut lamp_inside = Entity::with_meshes(vec![Mesh::from_data(device, &uv_sphere(0.8, 16, 12))]);
        lamp_inside.set_name("lamp_inside");
        lamp_inside.color = Color::new(5.0, 5.0, 4.0);
        lamp_inside.init_gpu(device, model_layout);
        lamp_inside.transform.set_local_position(Vector3::new(0.0, 0.6, 0.0));
        Entity::add_child(&lamp, lamp_inside);

        // Parent sphere with a child orbiting it; the orbit mutates
        // the child transform every frame.
        let mut ball_parent =
            Entity::with_meshes(vec![Mesh::from_data(device, &uv_sphere(1.0, 32, 24))]);
        ball_parent.set_name("ball_parent");
        ball_parent.color = Color::new(0.8, 0.3, 0.25);
        ball_parent.init_gpu(device, model_layout);
        ball_parent
            .transform
            .set_local_position(Vector3::new(0.0, 0.8, 0.0));
        ball_parent.transform.set_local_scale(Vector3::splat(0.1));
        let ball_parent = scene.add_root(ball_parent);

        let mut ball_child =
            Entity::with_meshes(vec![Mesh::from_data(device, &uv_sphere(1.0, 32, 24))]);
        ball_child.set_name("ball_child");
        ball_child.color = Color::new(0.25, 0.4, 0.8);
        ball_child.init_gpu(device, model_layout);
        ball_child
            .transform
            .set_local_position(Vector3::new(ORBIT_RADIUS, 0.0, 0.0));
        let orbit_child = Entity::add_child(&ball_parent, ball_child);

        scene.instanced.push(grass_field(device, model_layout));
        scene.instanced.push(tree_ring(device, model_layout));

        scene.particles = Some(ParticleSystem::new(
            device,
            queue,
            camera_layout,
            EmitterConfig::default(),
        ));

        Self {
            scene,
            orbit_child,
            orbit_angle: 0.0,
        }
    }

    /// Advance the per-frame animation: the child sphere circles its
    /// parent in the XZ plane.
    pub fn animate(&mut self, delta_time: f32) {
        self.orbit_angle += delta_time;

        let x = ORBIT_RADIUS * self.orbit_angle.cos();
        let z = ORBIT_RADIUS * self.orbit_angle.sin();
        if let Ok(mut child) = self.orbit_child.write() {
            child
                .transform
                .set_local_position(Vector3::new(x, 0.0, z));
        }
    }
}

/// Scatter small grass quads over the ground plane.
fn grass_field(device: &wgpu::Device, model_layout: &wgpu::BindGroupLayout) -> InstancedMesh {
    const COUNT: usize = 10_000;
    const FIELD_SIZE: f32 = 20.0;

    let mut rng = rand::thread_rng();
    let matrices: Vec<Matrix4> = (0..COUNT)
        .map(|_| {
            let x = rng.gen_range(-FIELD_SIZE * 0.5..FIELD_SIZE * 0.5);
            let z = rng.gen_range(-FIELD_SIZE * 0.5..FIELD_SIZE * 0.5);
            let scale = rng.gen_range(0.05..0.25);

            Matrix4::from_translation(&Vector3::new(x, scale * 0.5, z))
                .multiply(&Matrix4::from_scale(&Vector3::splat(scale)))
        })
        .collect();

    InstancedMesh::new(
        device,
        model_layout,
        &cube(1.0),
        &matrices,
        Color::new(0.2, 0.55, 0.2),
    )
}

/// Ring of stretched trunks around the scene center.
fn tree_ring(device: &wgpu::Device, model_layout: &wgpu::BindGroupLayout) -> InstancedMesh {
    const COUNT: usize = 200;
    const RADIUS: f32 = 5.0;
    const OFFSET: f32 = 2.5;

    let mut rng = rand::thread_rng();
    let matrices: Vec<Matrix4> = (0..COUNT)
        .map(|i| {
            let angle = i as f32 / COUNT as f32 * std::f32::consts::TAU;
            let x = angle.sin() * RADIUS + rng.gen_range(-OFFSET..OFFSET);
            let z = angle.cos() * RADIUS + rng.gen_range(-OFFSET..OFFSET);

            Matrix4::from_translation(&Vector3::new(x, 1.0, z))
                .multiply(&Matrix4::from_scale(&Vector3::new(0.15, 2.0, 0.15)))
        })
        .collect();

    InstancedMesh::new(
        device,
        model_layout,
        &cube(1.0),
        &matrices,
        Color::new(0.4, 0.3, 0.2),
    )
}
