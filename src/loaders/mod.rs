//! # Loaders Module
//!
//! Thin asset loading for meshes and textures. Load failures are
//! reported through the log and leave the affected resource in a
//! null/fallback state; nothing here retries.

mod obj_loader;
mod texture_loader;

pub use obj_loader::ObjLoader;
pub use texture_loader::{load_texture, load_texture_or_white};

/// Load an OBJ file from disk into a scene description.
pub fn load_obj(path: &str) -> Result<LoadedScene, LoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoadError::with_source(e.to_string(), path))?;
    ObjLoader::new().load_from_str(&content)
}

/// Result type for loaded geometry data.
#[derive(Debug, Clone, Default)]
pub struct LoadedGeometry {
    /// Vertex positions (vec3).
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (vec3).
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (vec2).
    pub uvs: Vec<[f32; 2]>,
    /// Vertex indices.
    pub indices: Vec<u32>,
}

impl LoadedGeometry {
    /// Create empty geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get vertex count.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get triangle count.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if geometry has normals.
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }
}

/// A mesh loaded from a file.
#[derive(Debug, Clone)]
pub struct LoadedMesh {
    /// Mesh name.
    pub name: String,
    /// Geometry data.
    pub geometry: LoadedGeometry,
}

impl LoadedMesh {
    /// Create a new loaded mesh.
    pub fn new(name: impl Into<String>, geometry: LoadedGeometry) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }
}

/// A complete scene loaded from a file.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    /// Scene name.
    pub name: String,
    /// All meshes in the scene.
    pub meshes: Vec<LoadedMesh>,
}

impl LoadedScene {
    /// Create a new empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meshes: Vec::new(),
        }
    }

    /// Get total vertex count across all meshes.
    pub fn total_vertices(&self) -> usize {
        self.meshes.iter().map(|m| m.geometry.vertex_count()).sum()
    }
}

/// Error type for loading operations.
#[derive(Debug, Clone)]
pub struct LoadError {
    /// Error message.
    pub message: String,
    /// Source file if known.
    pub source: Option<String>,
}

impl LoadError {
    /// Create a new load error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create with source file.
    pub fn with_source(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref source) = self.source {
            write!(f, "{}: {}", source, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for LoadError {}
