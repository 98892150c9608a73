//! Transform component with dirty-flag world-matrix caching.

use crate::math::{Matrix4, Vector3};

/// Transform component containing position, rotation, and scale.
///
/// The cached world matrix is only valid while the dirty flag is
/// clear. Mutating any local field marks the transform stale; nothing
/// is recomputed until [`compute_model_matrix`](Self::compute_model_matrix)
/// (or the parent-relative variant) runs. Children of a mutated
/// transform go stale implicitly and are refreshed by the entity
/// traversal, never eagerly.
#[derive(Debug, Clone)]
pub struct Transform {
    /// Local position.
    position: Vector3,
    /// Local rotation as Euler angles in degrees.
    rotation: Vector3,
    /// Local scale.
    scale: Vector3,
    /// Cached world matrix.
    model_matrix: Matrix4,
    /// Whether the world matrix is stale.
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Create a new identity transform. Starts dirty so the first
    /// update pass computes a valid world matrix.
    pub fn new() -> Self {
        Self {
            position: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
            model_matrix: Matrix4::IDENTITY,
            dirty: true,
        }
    }

    /// Set the local position.
    #[inline]
    pub fn set_local_position(&mut self, position: Vector3) {
        self.position = position;
        self.dirty = true;
    }

    /// Set the local rotation (Euler angles in degrees, Y-X-Z order).
    #[inline]
    pub fn set_local_rotation(&mut self, rotation: Vector3) {
        self.rotation = rotation;
        self.dirty = true;
    }

    /// Set the local scale.
    #[inline]
    pub fn set_local_scale(&mut self, scale: Vector3) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Get the local position.
    #[inline]
    pub fn local_position(&self) -> &Vector3 {
        &self.position
    }

    /// Get the local rotation in degrees.
    #[inline]
    pub fn local_rotation(&self) -> &Vector3 {
        &self.rotation
    }

    /// Get the local scale.
    #[inline]
    pub fn local_scale(&self) -> &Vector3 {
        &self.scale
    }

    /// Compute the local TRS matrix: `translate * Ry * Rx * Rz * scale`.
    pub fn local_matrix(&self) -> Matrix4 {
        Matrix4::from_translation(&self.position)
            .multiply(&Matrix4::from_euler_degrees(&self.rotation))
            .multiply(&Matrix4::from_scale(&self.scale))
    }

    /// Recompute the world matrix for a root transform (identity parent)
    /// and clear the dirty flag.
    pub fn compute_model_matrix(&mut self) {
        self.model_matrix = self.local_matrix();
        self.dirty = false;
    }

    /// Recompute the world matrix as `parent_world * local` and clear
    /// the dirty flag.
    pub fn compute_model_matrix_with_parent(&mut self, parent_world: &Matrix4) {
        self.model_matrix = parent_world.multiply(&self.local_matrix());
        self.dirty = false;
    }

    /// Get the cached world matrix. Only valid while not dirty.
    #[inline]
    pub fn model_matrix(&self) -> &Matrix4 {
        &self.model_matrix
    }

    /// Check if the world matrix is stale.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::to_radians;

    #[test]
    fn test_new_transform_is_dirty() {
        assert!(Transform::new().is_dirty());
    }

    #[test]
    fn test_mutation_marks_dirty() {
        let mut t = Transform::new();
        t.compute_model_matrix();
        assert!(!t.is_dirty());

        t.set_local_position(Vector3::new(1.0, 2.0, 3.0));
        assert!(t.is_dirty());

        t.compute_model_matrix();
        t.set_local_scale(Vector3::splat(2.0));
        assert!(t.is_dirty());

        t.compute_model_matrix();
        t.set_local_rotation(Vector3::new(0.0, 90.0, 0.0));
        assert!(t.is_dirty());
    }

    #[test]
    fn test_compute_clears_dirty_and_caches() {
        let mut t = Transform::new();
        t.set_local_position(Vector3::new(1.0, 2.0, 3.0));
        t.compute_model_matrix();
        assert!(!t.is_dirty());
        assert!(t
            .model_matrix()
            .get_position()
            .approx_eq(&Vector3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn test_local_matrix_is_trs_product() {
        let mut t = Transform::new();
        t.set_local_position(Vector3::new(5.0, 0.0, 0.0));
        t.set_local_rotation(Vector3::new(10.0, 20.0, 30.0));
        t.set_local_scale(Vector3::new(2.0, 3.0, 4.0));

        let expected = Matrix4::from_translation(&Vector3::new(5.0, 0.0, 0.0))
            .multiply(&Matrix4::from_rotation_y(to_radians(20.0)))
            .multiply(&Matrix4::from_rotation_x(to_radians(10.0)))
            .multiply(&Matrix4::from_rotation_z(to_radians(30.0)))
            .multiply(&Matrix4::from_scale(&Vector3::new(2.0, 3.0, 4.0)));

        assert!(t.local_matrix().approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_parent_chain_composition() {
        let mut parent = Transform::new();
        parent.set_local_position(Vector3::new(0.0, 10.0, 0.0));
        parent.compute_model_matrix();

        let mut child = Transform::new();
        child.set_local_position(Vector3::new(1.0, 0.0, 0.0));
        child.compute_model_matrix_with_parent(parent.model_matrix());

        assert!(child
            .model_matrix()
            .get_position()
            .approx_eq(&Vector3::new(1.0, 10.0, 0.0), 1e-5));
    }
}
