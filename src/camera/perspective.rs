//! Perspective camera.

use super::CameraUniform;
use crate::core::Id;
use crate::math::{Matrix4, Vector3};

/// A perspective projection camera.
pub struct PerspectiveCamera {
    /// Unique ID.
    id: Id,
    /// Field of view in degrees.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Camera position.
    position: Vector3,
    /// Camera target (look-at point).
    target: Vector3,
    /// Up vector.
    up: Vector3,
    /// View matrix.
    view_matrix: Matrix4,
    /// Projection matrix.
    projection_matrix: Matrix4,
    /// Whether matrices need updating.
    needs_update: bool,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(60.0, 16.0 / 9.0, 0.1, 100.0)
    }
}

impl PerspectiveCamera {
    /// Create a new perspective camera.
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            id: Id::new(),
            fov,
            aspect,
            near,
            far,
            position: Vector3::new(0.5, 0.0, 0.5),
            target: Vector3::ZERO,
            up: Vector3::UP,
            view_matrix: Matrix4::IDENTITY,
            projection_matrix: Matrix4::IDENTITY,
            needs_update: true,
        };
        camera.update_matrices();
        camera
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the camera position.
    #[inline]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Set the camera position.
    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
        self.needs_update = true;
    }

    /// Look at a target from the current position.
    pub fn look_at(&mut self, target: Vector3) {
        self.target = target;
        self.needs_update = true;
    }

    /// Set the aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.needs_update = true;
    }

    /// Get the view matrix.
    pub fn view_matrix(&mut self) -> &Matrix4 {
        if self.needs_update {
            self.update_matrices();
        }
        &self.view_matrix
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&mut self) -> &Matrix4 {
        if self.needs_update {
            self.update_matrices();
        }
        &self.projection_matrix
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&mut self) -> Matrix4 {
        if self.needs_update {
            self.update_matrices();
        }
        self.projection_matrix.multiply(&self.view_matrix)
    }

    /// Camera right vector in world space.
    pub fn right(&mut self) -> Vector3 {
        let forward = (self.target - self.position).normalized();
        forward.cross(&self.up).normalized()
    }

    /// Camera up vector in world space (orthogonal to the view
    /// direction).
    pub fn world_up(&mut self) -> Vector3 {
        let forward = (self.target - self.position).normalized();
        let right = forward.cross(&self.up).normalized();
        right.cross(&forward)
    }

    /// Build the per-frame camera uniform.
    pub fn uniform(&mut self) -> CameraUniform {
        let right = self.right();
        let up = self.world_up();
        let position = self.position;
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            position: [position.x, position.y, position.z, 1.0],
            right: [right.x, right.y, right.z, 0.0],
            up: [up.x, up.y, up.z, 0.0],
        }
    }

    fn update_matrices(&mut self) {
        self.view_matrix = Matrix4::look_at(&self.position, &self.target, &self.up);
        self.projection_matrix = Matrix4::perspective(self.fov, self.aspect, self.near, self.far);
        self.needs_update = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_projection_moves_target_to_center() {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        camera.set_position(Vector3::new(0.0, 0.0, 5.0));
        camera.look_at(Vector3::ZERO);

        let vp = camera.view_projection_matrix();
        let e = &vp.elements;
        // Origin projects to clip-space x = y = 0.
        let x = e[12];
        let y = e[13];
        assert!(x.abs() < 1e-5 && y.abs() < 1e-5);
    }

    #[test]
    fn test_right_is_orthogonal_to_view() {
        let mut camera = PerspectiveCamera::default();
        camera.set_position(Vector3::new(3.0, 1.0, 3.0));
        camera.look_at(Vector3::ZERO);

        let forward = (Vector3::ZERO - camera.position()).normalized();
        assert!(camera.right().dot(&forward).abs() < 1e-5);
    }
}
