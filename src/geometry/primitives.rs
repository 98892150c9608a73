//! Hardcoded primitive geometry generators.

use super::Vertex;

/// Raw geometry data ready for upload.
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertices.
    pub vertices: Vec<Vertex>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

/// Generate a flat plane in the XZ plane, facing +Y, centered at the
/// origin.
pub fn plane(width: f32, depth: f32) -> GeometryData {
    let hw = width * 0.5;
    let hd = depth * 0.5;
    let normal = [0.0, 1.0, 0.0];

    let vertices = vec![
        Vertex::new([-hw, 0.0, -hd], normal, [0.0, 0.0]),
        Vertex::new([-hw, 0.0, hd], normal, [0.0, 1.0]),
        Vertex::new([hw, 0.0, hd], normal, [1.0, 1.0]),
        Vertex::new([hw, 0.0, -hd], normal, [1.0, 0.0]),
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];

    GeometryData { vertices, indices }
}

/// Generate an axis-aligned cube centered at the origin.
pub fn cube(size: f32) -> GeometryData {
    let h = size * 0.5;

    // One face per normal direction, 4 vertices each.
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +X
        ([1.0, 0.0, 0.0], [[h, -h, -h], [h, h, -h], [h, h, h], [h, -h, h]]),
        // -X
        ([-1.0, 0.0, 0.0], [[-h, -h, h], [-h, h, h], [-h, h, -h], [-h, -h, -h]]),
        // +Y
        ([0.0, 1.0, 0.0], [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]]),
        // -Y
        ([0.0, -1.0, 0.0], [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]]),
        // +Z
        ([0.0, 0.0, 1.0], [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]]),
        // -Z
        ([0.0, 0.0, -1.0], [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]]),
    ];

    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (face, (normal, corners)) in faces.iter().enumerate() {
        let base = (face * 4) as u32;
        for (corner, position) in corners.iter().enumerate() {
            vertices.push(Vertex::new(*position, *normal, uvs[corner]));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    GeometryData { vertices, indices }
}

/// Generate a UV sphere centered at the origin.
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> GeometryData {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * std::f32::consts::PI;
        let (sin_phi, cos_phi) = phi.sin_cos();

        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let theta = u * std::f32::consts::TAU;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let normal = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
            let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
            vertices.push(Vertex::new(position, normal, [u, v]));
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }

    GeometryData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_is_one_quad() {
        let geo = plane(2.0, 2.0);
        assert_eq!(geo.vertices.len(), 4);
        assert_eq!(geo.indices.len(), 6);
    }

    #[test]
    fn test_cube_has_24_vertices() {
        let geo = cube(1.0);
        assert_eq!(geo.vertices.len(), 24);
        assert_eq!(geo.indices.len(), 36);
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let geo = uv_sphere(2.0, 8, 6);
        for v in &geo.vertices {
            let len =
                (v.position[0].powi(2) + v.position[1].powi(2) + v.position[2].powi(2)).sqrt();
            assert!((len - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_index_bounds() {
        let geo = uv_sphere(1.0, 12, 8);
        let max = *geo.indices.iter().max().unwrap() as usize;
        assert!(max < geo.vertices.len());
    }
}
