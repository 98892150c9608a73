//! 4x4 Matrix implementation.

use super::{to_radians, Vector3};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A 4x4 matrix stored in column-major order.
/// Used for 3D transformations (model, view, projection matrices).
/// Projection matrices target wgpu's [0, 1] clip-space depth range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Matrix4 {
    /// Matrix elements in column-major order.
    /// [m00, m10, m20, m30, m01, m11, m21, m31, m02, m12, m22, m32, m03, m13, m23, m33]
    pub elements: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        elements: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Create from a column-major array.
    #[inline]
    pub const fn from_cols_array(elements: [f32; 16]) -> Self {
        Self { elements }
    }

    /// Convert to a column-major 2D array (one inner array per column).
    #[inline]
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let e = &self.elements;
        [
            [e[0], e[1], e[2], e[3]],
            [e[4], e[5], e[6], e[7]],
            [e[8], e[9], e[10], e[11]],
            [e[12], e[13], e[14], e[15]],
        ]
    }

    /// Extract the position (translation) component.
    #[inline]
    pub fn get_position(&self) -> Vector3 {
        Vector3 {
            x: self.elements[12],
            y: self.elements[13],
            z: self.elements[14],
        }
    }

    /// Create a translation matrix.
    pub fn from_translation(v: &Vector3) -> Self {
        let mut m = Self::IDENTITY;
        m.elements[12] = v.x;
        m.elements[13] = v.y;
        m.elements[14] = v.z;
        m
    }

    /// Create a scale matrix.
    pub fn from_scale(v: &Vector3) -> Self {
        let mut m = Self::IDENTITY;
        m.elements[0] = v.x;
        m.elements[5] = v.y;
        m.elements[10] = v.z;
        m
    }

    /// Create a rotation matrix around the X axis (angle in radians).
    pub fn from_rotation_x(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        let mut m = Self::IDENTITY;
        m.elements[5] = c;
        m.elements[6] = s;
        m.elements[9] = -s;
        m.elements[10] = c;
        m
    }

    /// Create a rotation matrix around the Y axis (angle in radians).
    pub fn from_rotation_y(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        let mut m = Self::IDENTITY;
        m.elements[0] = c;
        m.elements[2] = -s;
        m.elements[8] = s;
        m.elements[10] = c;
        m
    }

    /// Create a rotation matrix around the Z axis (angle in radians).
    pub fn from_rotation_z(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        let mut m = Self::IDENTITY;
        m.elements[0] = c;
        m.elements[1] = s;
        m.elements[4] = -s;
        m.elements[5] = c;
        m
    }

    /// Create a rotation matrix from Euler angles in degrees, applied
    /// in Y, then X, then Z order (`Ry * Rx * Rz`).
    pub fn from_euler_degrees(degrees: &Vector3) -> Self {
        Self::from_rotation_y(to_radians(degrees.y))
            .multiply(&Self::from_rotation_x(to_radians(degrees.x)))
            .multiply(&Self::from_rotation_z(to_radians(degrees.z)))
    }

    /// Create a right-handed view matrix looking from `eye` towards `target`.
    pub fn look_at(eye: &Vector3, target: &Vector3, up: &Vector3) -> Self {
        let f = (*target - *eye).normalized();
        let s = f.cross(up).normalized();
        let u = s.cross(&f);

        Self {
            elements: [
                s.x, u.x, -f.x, 0.0,
                s.y, u.y, -f.y, 0.0,
                s.z, u.z, -f.z, 0.0,
                -s.dot(eye), -u.dot(eye), f.dot(eye), 1.0,
            ],
        }
    }

    /// Create a right-handed perspective projection matrix.
    /// `fov_y` is the vertical field of view in degrees.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (to_radians(fov_y) * 0.5).tan();
        let mut m = Self { elements: [0.0; 16] };
        m.elements[0] = f / aspect;
        m.elements[5] = f;
        m.elements[10] = far / (near - far);
        m.elements[11] = -1.0;
        m.elements[14] = near * far / (near - far);
        m
    }

    /// Create a right-handed orthographic projection matrix.
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.elements[0] = 2.0 / (right - left);
        m.elements[5] = 2.0 / (top - bottom);
        m.elements[10] = 1.0 / (near - far);
        m.elements[12] = -(right + left) / (right - left);
        m.elements[13] = -(top + bottom) / (top - bottom);
        m.elements[14] = near / (near - far);
        m
    }

    /// Matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix4) -> Self {
        let a = &self.elements;
        let b = &other.elements;
        let mut out = [0.0; 16];

        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }

        Self { elements: out }
    }

    /// Transform a point (w = 1, translation applied).
    pub fn transform_point(&self, v: &Vector3) -> Vector3 {
        let e = &self.elements;
        Vector3 {
            x: e[0] * v.x + e[4] * v.y + e[8] * v.z + e[12],
            y: e[1] * v.x + e[5] * v.y + e[9] * v.z + e[13],
            z: e[2] * v.x + e[6] * v.y + e[10] * v.z + e[14],
        }
    }

    /// Transform a direction (w = 0, no translation) and normalize.
    pub fn transform_direction(&self, v: &Vector3) -> Vector3 {
        let e = &self.elements;
        Vector3 {
            x: e[0] * v.x + e[4] * v.y + e[8] * v.z,
            y: e[1] * v.x + e[5] * v.y + e[9] * v.z,
            z: e[2] * v.x + e[6] * v.y + e[10] * v.z,
        }
        .normalized()
    }

    /// Return the transpose.
    pub fn transposed(&self) -> Self {
        let e = &self.elements;
        Self {
            elements: [
                e[0], e[4], e[8], e[12],
                e[1], e[5], e[9], e[13],
                e[2], e[6], e[10], e[14],
                e[3], e[7], e[11], e[15],
            ],
        }
    }

    /// Compute the normal matrix: the inverse transpose of the upper
    /// 3x3 block, padded back out to 4x4. Handles non-uniform scale.
    pub fn normal_matrix(&self) -> Self {
        let e = &self.elements;
        let (a, b, c) = (e[0], e[4], e[8]);
        let (d, f, g) = (e[1], e[5], e[9]);
        let (h, i, j) = (e[2], e[6], e[10]);

        let det = a * (f * j - g * i) - b * (d * j - g * h) + c * (d * i - f * h);
        if det.abs() < 1e-12 {
            return Self::IDENTITY;
        }
        let inv = 1.0 / det;

        // Cofactors over the determinant give the inverse transpose
        // directly, laid out column by column.
        Self {
            elements: [
                (f * j - g * i) * inv, (c * i - b * j) * inv, (b * g - c * f) * inv, 0.0,
                (g * h - d * j) * inv, (a * j - c * h) * inv, (c * d - a * g) * inv, 0.0,
                (d * i - f * h) * inv, (b * h - a * i) * inv, (a * f - b * d) * inv, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Check approximate equality within an epsilon.
    pub fn approx_eq(&self, other: &Matrix4, epsilon: f32) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_multiply() {
        let t = Matrix4::from_translation(&Vector3::new(1.0, 2.0, 3.0));
        assert!(Matrix4::IDENTITY.multiply(&t).approx_eq(&t, 1e-6));
        assert!(t.multiply(&Matrix4::IDENTITY).approx_eq(&t, 1e-6));
    }

    #[test]
    fn test_translation_then_scale() {
        // T * S scales first, then translates.
        let t = Matrix4::from_translation(&Vector3::new(10.0, 0.0, 0.0));
        let s = Matrix4::from_scale(&Vector3::splat(2.0));
        let m = t.multiply(&s);
        let p = m.transform_point(&Vector3::new(1.0, 1.0, 1.0));
        assert!(p.approx_eq(&Vector3::new(12.0, 2.0, 2.0), 1e-5));
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let m = Matrix4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let p = m.transform_point(&Vector3::new(1.0, 0.0, 0.0));
        assert!(p.approx_eq(&Vector3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_euler_order_is_y_x_z() {
        let angles = Vector3::new(30.0, 45.0, 60.0);
        let expected = Matrix4::from_rotation_y(to_radians(45.0))
            .multiply(&Matrix4::from_rotation_x(to_radians(30.0)))
            .multiply(&Matrix4::from_rotation_z(to_radians(60.0)));
        assert!(Matrix4::from_euler_degrees(&angles).approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_look_at_origin() {
        let view = Matrix4::look_at(
            &Vector3::new(0.0, 0.0, 5.0),
            &Vector3::ZERO,
            &Vector3::UP,
        );
        // A point at the origin ends up on the -Z axis in view space.
        let p = view.transform_point(&Vector3::ZERO);
        assert!(p.approx_eq(&Vector3::new(0.0, 0.0, -5.0), 1e-5));
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = Matrix4::perspective(60.0, 1.0, 0.1, 100.0);
        // Near plane maps to depth 0.
        let e = &proj.elements;
        let z_near = e[10] * -0.1 + e[14];
        let w_near = 0.1;
        assert!((z_near / w_near).abs() < 1e-4);
    }

    #[test]
    fn test_normal_matrix_uniform_scale() {
        let m = Matrix4::from_scale(&Vector3::splat(2.0));
        let n = m.normal_matrix();
        let v = n.transform_direction(&Vector3::new(0.0, 1.0, 0.0));
        assert!(v.approx_eq(&Vector3::UNIT_Y, 1e-5));
    }

    #[test]
    fn test_normal_matrix_of_rotation_is_same_rotation() {
        // Rotations are orthonormal, so the inverse transpose is the
        // rotation itself, not its inverse.
        let m = Matrix4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(m.normal_matrix().approx_eq(&m, 1e-5));
    }
}
