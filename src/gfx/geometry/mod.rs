//! # Procedural Geometry Generation
//!
//! Tessellators for the shapes the demo scene is assembled from, so no
//! model files are required for anything except (optionally) the car.
//!
//! ## Supported shapes
//!
//! - **Primitives** ([`primitives`]): cone, cylinder, disk, cube, quad
//! - **Structures** ([`structures`]): extruded building outlines and the
//!   closed track ribbon
//!
//! All tessellators produce a [`MeshData`] with positions, normals and
//! (where meaningful) texture coordinates, indexed as counter-clockwise
//! triangles.

pub mod primitives;
pub mod structures;

pub use primitives::*;
pub use structures::*;

/// Generated geometry ready to be wrapped in a [`crate::gfx::resources::Mesh`].
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex positions (x, y, z)
    pub positions: Vec<[f32; 3]>,
    /// Normal vectors, one per position
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (u, v); empty for untextured shapes
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub(crate) fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3]) {
        self.positions.push(position);
        self.normals.push(normal);
    }

    pub(crate) fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }
}
