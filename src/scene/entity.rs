//! Scene graph node with owned children and lazy transform updates.

use std::sync::{Arc, RwLock, Weak};

use crate::core::Id;
use crate::math::{Color, Matrix4};
use crate::objects::{Mesh, ModelUniform};
use crate::scene::Transform;

/// A node in the scene graph.
///
/// Entities own their children exclusively: dropping an entity drops
/// its whole subtree. The parent link is a non-owning back-reference,
/// set exactly once when the child is attached; re-parenting is not
/// supported.
///
/// Caller contract: transform updates must be driven from the root
/// ([`update_self_and_child`](Self::update_self_and_child) or
/// [`draw`](Self::draw)) for a guaranteed-consistent frame. A child
/// mutated in isolation stays stale until a traversal reaches it.
pub struct Entity {
    /// Unique identifier.
    id: Id,
    /// Entity name.
    name: String,
    /// Local transform and cached world matrix.
    pub transform: Transform,
    /// Renderable geometry.
    meshes: Vec<Mesh>,
    /// Base color multiplied into the shaded result.
    pub color: Color,
    /// Owned child entities.
    children: Vec<Arc<RwLock<Entity>>>,
    /// Non-owning back-reference to the parent.
    parent: Option<Weak<RwLock<Entity>>>,
    /// Per-entity model uniform buffer.
    model_buffer: Option<wgpu::Buffer>,
    /// Bind group exposing the model uniform to draw shaders.
    model_bind_group: Option<wgpu::BindGroup>,
}

impl Entity {
    /// Create an empty entity with no geometry.
    pub fn new() -> Self {
        Self {
            id: Id::new(),
            name: String::new(),
            transform: Transform::new(),
            meshes: Vec::new(),
            color: Color::WHITE,
            children: Vec::new(),
            parent: None,
            model_buffer: None,
            model_bind_group: None,
        }
    }

    /// Create an entity from a list of uploaded meshes.
    pub fn with_meshes(meshes: Vec<Mesh>) -> Self {
        let mut entity = Self::new();
        entity.meshes = meshes;
        entity
    }

    /// Create an entity by loading geometry from a mesh-source path.
    ///
    /// A load failure is reported through the log and produces an
    /// entity with an empty mesh list; no retry is attempted.
    pub fn from_path(
        device: &wgpu::Device,
        model_layout: &wgpu::BindGroupLayout,
        path: &str,
    ) -> Self {
        let meshes = match crate::loaders::load_obj(path) {
            Ok(scene) => scene
                .meshes
                .iter()
                .map(|m| Mesh::from_geometry(device, &m.geometry))
                .collect(),
            Err(err) => {
                log::error!("Failed to load model '{}': {}", path, err);
                Vec::new()
            }
        };

        let mut entity = Self::with_meshes(meshes);
        entity.init_gpu(device, model_layout);
        entity
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the entity name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the entity name.
    #[inline]
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the meshes.
    #[inline]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Check whether this entity has renderable geometry.
    #[inline]
    pub fn is_renderable(&self) -> bool {
        !self.meshes.is_empty()
    }

    /// Get the children.
    #[inline]
    pub fn children(&self) -> &[Arc<RwLock<Entity>>] {
        &self.children
    }

    /// Get the parent, if still alive.
    pub fn parent(&self) -> Option<Arc<RwLock<Entity>>> {
        self.parent.as_ref().and_then(|w| w.upgrade())
    }

    /// Create the model uniform buffer and bind group.
    pub fn init_gpu(&mut self, device: &wgpu::Device, model_layout: &wgpu::BindGroupLayout) {
        if self.model_buffer.is_some() {
            return;
        }

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Entity Model Buffer"),
            size: std::mem::size_of::<ModelUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.model_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Entity Model Bind Group"),
            layout: model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        }));
        self.model_buffer = Some(buffer);
    }

    /// Attach a child entity, setting its parent back-reference.
    /// Returns a handle to the attached child.
    pub fn add_child(parent: &Arc<RwLock<Entity>>, child: Entity) -> Arc<RwLock<Entity>> {
        let child = Arc::new(RwLock::new(child));
        if let Ok(mut guard) = child.write() {
            guard.parent = Some(Arc::downgrade(parent));
        }
        if let Ok(mut guard) = parent.write() {
            guard.children.push(child.clone());
        }
        child
    }

    /// Read the parent's cached world matrix. Takes the parent's read
    /// lock, so the caller must not already hold it; the internal
    /// traversals pass matrices down instead of calling this.
    fn parent_world_matrix(&self) -> Option<Matrix4> {
        self.parent
            .as_ref()
            .and_then(|w| w.upgrade())
            .and_then(|p| p.read().ok().map(|guard| *guard.transform.model_matrix()))
    }

    /// Refresh world matrices where needed.
    ///
    /// A clean entity only probes its children (a child may have been
    /// mutated directly); a dirty entity escalates to a forced refresh
    /// of itself and the entire subtree, since an ancestor change
    /// invalidates every descendant's world matrix.
    pub fn update_self_and_child(&mut self) {
        let parent_world = self.parent_world_matrix();
        self.update_from(parent_world.as_ref());
    }

    fn update_from(&mut self, parent_world: Option<&Matrix4>) {
        if self.transform.is_dirty() {
            self.force_update_from(parent_world);
            return;
        }

        let world = *self.transform.model_matrix();
        for child in &self.children {
            if let Ok(mut guard) = child.write() {
                guard.update_from(Some(&world));
            }
        }
    }

    /// Unconditionally recompute this entity's world matrix from the
    /// parent chain, then every descendant's, regardless of dirtiness.
    pub fn force_update_self_and_child(&mut self) {
        let parent_world = self.parent_world_matrix();
        self.force_update_from(parent_world.as_ref());
    }

    fn force_update_from(&mut self, parent_world: Option<&Matrix4>) {
        match parent_world {
            Some(parent_matrix) => self
                .transform
                .compute_model_matrix_with_parent(parent_matrix),
            None => self.transform.compute_model_matrix(),
        }

        let world = *self.transform.model_matrix();
        for child in &self.children {
            if let Ok(mut guard) = child.write() {
                guard.force_update_from(Some(&world));
            }
        }
    }

    /// Draw this entity's meshes with its current world matrix.
    ///
    /// Self-heals a stale transform by forcing a refresh of this
    /// entity and its subtree before issuing the draw.
    pub fn draw(&mut self, render_pass: &mut wgpu::RenderPass<'_>, queue: &wgpu::Queue) {
        if self.transform.is_dirty() {
            self.force_update_self_and_child();
        }

        let (Some(buffer), Some(bind_group)) = (&self.model_buffer, &self.model_bind_group) else {
            return;
        };

        let uniform = ModelUniform::new(self.transform.model_matrix(), self.color);
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[uniform]));

        render_pass.set_bind_group(1, bind_group, &[]);
        for mesh in &self.meshes {
            mesh.draw(render_pass);
        }
    }
}

/// Draw an entity and all of its descendants depth-first.
pub fn draw_subtree(
    entity: &Arc<RwLock<Entity>>,
    render_pass: &mut wgpu::RenderPass<'_>,
    queue: &wgpu::Queue,
) {
    if let Ok(mut guard) = entity.write() {
        guard.draw(render_pass, queue);
    }
    let children: Vec<Arc<RwLock<Entity>>> = entity
        .read()
        .map(|guard| guard.children.to_vec())
        .unwrap_or_default();
    for child in &children {
        draw_subtree(child, render_pass, queue);
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("meshes", &self.meshes.len())
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Matrix4, Vector3};

    fn root_with_child() -> (Arc<RwLock<Entity>>, Arc<RwLock<Entity>>) {
        let root = Arc::new(RwLock::new(Entity::new()));
        let child = Entity::add_child(&root, Entity::new());
        (root, child)
    }

    #[test]
    fn test_add_child_sets_parent() {
        let (root, child) = root_with_child();
        let parent = child.read().unwrap().parent().unwrap();
        assert!(Arc::ptr_eq(&parent, &root));
    }

    #[test]
    fn test_update_propagates_parent_translation() {
        let (root, child) = root_with_child();
        root.write()
            .unwrap()
            .transform
            .set_local_position(Vector3::new(0.0, 10.0, 0.0));
        child
            .write()
            .unwrap()
            .transform
            .set_local_position(Vector3::new(1.0, 0.0, 0.0));

        root.write().unwrap().update_self_and_child();

        let guard = child.read().unwrap();
        assert!(!guard.transform.is_dirty());
        assert!(guard
            .transform
            .model_matrix()
            .get_position()
            .approx_eq(&Vector3::new(1.0, 10.0, 0.0), 1e-5));
    }

    #[test]
    fn test_clean_parent_probes_dirty_child() {
        let (root, child) = root_with_child();
        root.write().unwrap().update_self_and_child();

        // Only the child is mutated; the parent stays clean.
        child
            .write()
            .unwrap()
            .transform
            .set_local_position(Vector3::new(3.0, 0.0, 0.0));
        assert!(!root.read().unwrap().transform.is_dirty());

        root.write().unwrap().update_self_and_child();

        let guard = child.read().unwrap();
        assert!(!guard.transform.is_dirty());
        assert!(guard
            .transform
            .model_matrix()
            .get_position()
            .approx_eq(&Vector3::new(3.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_dirty_parent_refreshes_whole_subtree() {
        let (root, child) = root_with_child();
        let grandchild = Entity::add_child(&child, Entity::new());
        grandchild
            .write()
            .unwrap()
            .transform
            .set_local_position(Vector3::new(0.0, 0.0, 2.0));
        root.write().unwrap().update_self_and_child();

        root.write()
            .unwrap()
            .transform
            .set_local_position(Vector3::new(5.0, 0.0, 0.0));
        root.write().unwrap().update_self_and_child();

        let guard = grandchild.read().unwrap();
        assert!(!guard.transform.is_dirty());
        assert!(guard
            .transform
            .model_matrix()
            .get_position()
            .approx_eq(&Vector3::new(5.0, 0.0, 2.0), 1e-5));
    }

    #[test]
    fn test_forced_update_equals_ancestor_trs_product() {
        let (root, child) = root_with_child();
        let grandchild = Entity::add_child(&child, Entity::new());

        root.write()
            .unwrap()
            .transform
            .set_local_position(Vector3::new(1.0, 0.0, 0.0));
        child
            .write()
            .unwrap()
            .transform
            .set_local_rotation(Vector3::new(0.0, 90.0, 0.0));
        grandchild
            .write()
            .unwrap()
            .transform
            .set_local_scale(Vector3::splat(2.0));

        root.write().unwrap().force_update_self_and_child();

        let expected: Matrix4 = root
            .read()
            .unwrap()
            .transform
            .local_matrix()
            .multiply(&child.read().unwrap().transform.local_matrix())
            .multiply(&grandchild.read().unwrap().transform.local_matrix());

        let guard = grandchild.read().unwrap();
        assert!(!guard.transform.is_dirty());
        assert!(guard.transform.model_matrix().approx_eq(&expected, 1e-4));
    }

    #[test]
    fn test_dropping_parent_drops_descendants() {
        let (root, child) = root_with_child();
        let grandchild = Entity::add_child(&child, Entity::new());
        let child_weak = Arc::downgrade(&child);
        let grandchild_weak = Arc::downgrade(&grandchild);
        drop(child);
        drop(grandchild);

        assert!(child_weak.upgrade().is_some());
        drop(root);
        assert!(child_weak.upgrade().is_none());
        assert!(grandchild_weak.upgrade().is_none());
    }
}
