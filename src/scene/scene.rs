//! Scene container - the root of the scene graph.

use std::sync::{Arc, RwLock};

use super::Entity;
use crate::light::{DirectionalLight, PointLight};
use crate::math::Color;
use crate::objects::InstancedMesh;
use crate::particles::ParticleSystem;

/// A complete scene: root entities, instanced meshes, lights, and an
/// optional particle system. This is the unit the renderer consumes
/// each frame.
pub struct Scene {
    /// Root entities of the scene graph.
    pub roots: Vec<Arc<RwLock<Entity>>>,
    /// Instanced meshes drawn outside the entity hierarchy.
    pub instanced: Vec<InstancedMesh>,
    /// The directional (sun) light.
    pub directional_light: DirectionalLight,
    /// The point light casting the cube shadow map.
    pub point_light: PointLight,
    /// GPU particle system.
    pub particles: Option<ParticleSystem>,
    /// Background clear color.
    pub background: Color,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            instanced: Vec::new(),
            directional_light: DirectionalLight::default(),
            point_light: PointLight::default(),
            particles: None,
            background: Color::new(0.45, 0.55, 0.60),
        }
    }

    /// Add a root entity and return its handle.
    pub fn add_root(&mut self, entity: Entity) -> Arc<RwLock<Entity>> {
        let handle = Arc::new(RwLock::new(entity));
        self.roots.push(handle.clone());
        handle
    }

    /// Refresh world matrices across the whole graph, root-driven.
    pub fn update_transforms(&mut self) {
        for root in &self.roots {
            if let Ok(mut guard) = root.write() {
                guard.update_self_and_child();
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
