//! # Geometry
//!
//! Bounding volumes for culling and procedural meshes for the built-in surfaces.
//!
//! ## Usage
//!
//! ```rust
//! use tarn::gfx::geometry::{generate_cube, generate_plane, Aabb};
//!
//! let cube = generate_cube();
//! let bounds = cube.bounds();
//! assert_eq!(bounds.size(), cgmath::Vector3::new(1.0, 1.0, 1.0));
//!
//! // A 64x64 grid whose texture repeats eight times
//! let terrain = generate_plane(64.0, 64.0, 16, 8.0);
//! assert_eq!(terrain.triangle_count(), 16 * 16 * 2);
//! # let _ = Aabb::from_vertices(&terrain.vertices);
//! ```

pub mod bounds;
pub mod primitives;

pub use bounds::{Aabb, Containment, Plane};
pub use primitives::*;

use crate::gfx::resources::vertex::{MeshData, Vertex3D};

/// Generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Local-space bounds of the vertex positions
    pub fn bounds(&self) -> Aabb {
        Aabb::from_vertices(&self.vertices)
    }

    /// Interleaves the attribute streams into the renderer's vertex format
    pub fn to_mesh_data(&self) -> MeshData {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uv: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect();

        MeshData {
            vertices,
            indices: self.indices.clone(),
        }
    }
}
