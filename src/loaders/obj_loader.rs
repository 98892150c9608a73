//! Wavefront OBJ file loader.

use std::collections::HashMap;

use super::{LoadError, LoadedGeometry, LoadedMesh, LoadedScene};

/// Wavefront OBJ file loader.
pub struct ObjLoader;

impl ObjLoader {
    /// Create a new OBJ loader.
    pub fn new() -> Self {
        Self
    }

    /// Load an OBJ file from string content.
    pub fn load_from_str(&self, content: &str) -> Result<LoadedScene, LoadError> {
        let mut scene = LoadedScene::new("OBJ Scene");

        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut uvs: Vec<[f32; 2]> = Vec::new();

        let mut geometry = LoadedGeometry::new();
        let mut object_name = String::from("default");

        // Deduplicate (position, uv, normal) triples into shared vertices.
        let mut vertex_cache: HashMap<(usize, usize, usize), u32> = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts[0] {
                "v" if parts.len() >= 4 => {
                    positions.push(parse_vec3(&parts[1..4]));
                }
                "vn" if parts.len() >= 4 => {
                    normals.push(parse_vec3(&parts[1..4]));
                }
                "vt" if parts.len() >= 3 => {
                    let u = parts[1].parse::<f32>().unwrap_or(0.0);
                    let v = parts[2].parse::<f32>().unwrap_or(0.0);
                    uvs.push([u, v]);
                }
                "f" if parts.len() >= 4 => {
                    let face: Vec<(usize, usize, usize)> = parts[1..]
                        .iter()
                        .filter_map(|p| parse_face_vertex(p))
                        .collect();
                    if face.len() < 3 {
                        return Err(LoadError::new(format!("malformed face: '{}'", line)));
                    }

                    // Fan triangulation for convex polygons.
                    for i in 1..face.len() - 1 {
                        for &key in &[face[0], face[i], face[i + 1]] {
                            let index = *vertex_cache.entry(key).or_insert_with(|| {
                                let (pi, ti, ni) = key;
                                geometry
                                    .positions
                                    .push(positions.get(pi).copied().unwrap_or_default());
                                geometry.uvs.push(uvs.get(ti).copied().unwrap_or_default());
                                geometry
                                    .normals
                                    .push(normals.get(ni).copied().unwrap_or([0.0, 1.0, 0.0]));
                                (geometry.positions.len() - 1) as u32
                            });
                            geometry.indices.push(index);
                        }
                    }
                }
                "o" | "g" if parts.len() >= 2 => {
                    // Flush the current object before starting a new one.
                    if !geometry.indices.is_empty() {
                        scene
                            .meshes
                            .push(LoadedMesh::new(object_name.clone(), geometry));
                        geometry = LoadedGeometry::new();
                        vertex_cache.clear();
                    }
                    object_name = parts[1].to_string();
                }
                _ => {}
            }
        }

        if !geometry.indices.is_empty() {
            scene.meshes.push(LoadedMesh::new(object_name, geometry));
        }

        if scene.meshes.is_empty() {
            return Err(LoadError::new("no geometry found"));
        }

        Ok(scene)
    }
}

impl Default for ObjLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_vec3(parts: &[&str]) -> [f32; 3] {
    [
        parts[0].parse::<f32>().unwrap_or(0.0),
        parts[1].parse::<f32>().unwrap_or(0.0),
        parts[2].parse::<f32>().unwrap_or(0.0),
    ]
}

/// Parse a face vertex of the form `v`, `v/vt`, `v//vn`, or `v/vt/vn`
/// into zero-based (position, uv, normal) indices.
fn parse_face_vertex(token: &str) -> Option<(usize, usize, usize)> {
    let mut indices = token.split('/');
    let pi = indices.next()?.parse::<usize>().ok()?.checked_sub(1)?;
    let ti = indices
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(|i| i.checked_sub(1))
        .unwrap_or(0);
    let ni = indices
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(|i| i.checked_sub(1))
        .unwrap_or(0);
    Some((pi, ti, ni))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";

    #[test]
    fn test_parse_triangle() {
        let scene = ObjLoader::new().load_from_str(TRIANGLE_OBJ).unwrap();
        assert_eq!(scene.meshes.len(), 1);
        let geo = &scene.meshes[0].geometry;
        assert_eq!(geo.vertex_count(), 3);
        assert_eq!(geo.triangle_count(), 1);
        assert_eq!(geo.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";
        let scene = ObjLoader::new().load_from_str(obj).unwrap();
        assert_eq!(scene.meshes[0].geometry.triangle_count(), 2);
    }

    #[test]
    fn test_shared_vertices_are_deduplicated() {
        let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3
f 1 3 4
";
        let scene = ObjLoader::new().load_from_str(obj).unwrap();
        assert_eq!(scene.meshes[0].geometry.vertex_count(), 4);
        assert_eq!(scene.meshes[0].geometry.indices.len(), 6);
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(ObjLoader::new().load_from_str("# nothing\n").is_err());
    }
}
