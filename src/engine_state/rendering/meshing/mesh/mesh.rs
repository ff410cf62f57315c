//! Mesh data structures and operations for voxel rendering.
//!
//! This module provides the CPU-side mesh of a chunk: the vertex and index lists that
//! are uploaded to the GPU once a meshing task completes.

use cgmath::Point3;

use super::{culled, face::Face, greedy, neighborhood::ChunkNeighborhood};
use crate::engine_state::rendering::{meshing::MeshingStrategy, Vertex};

/// The geometry of one chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Four vertices per face
    pub vertices: Vec<Vertex>,
    /// Six indices per face, two counter-clockwise triangles
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes the center chunk of `neighborhood` with the given strategy.
    pub fn build(neighborhood: &ChunkNeighborhood, strategy: MeshingStrategy) -> Self {
        let faces = match strategy {
            MeshingStrategy::Culled => culled::culled_faces(neighborhood),
            MeshingStrategy::Greedy => greedy::greedy_faces(neighborhood),
        };

        let mut mesh = Mesh::new();
        let origin = neighborhood.center.origin();
        for face in &faces {
            mesh.add_face(face, origin);
        }
        mesh
    }

    /// Appends one face to the mesh.
    pub fn add_face(&mut self, face: &Face, chunk_origin: Point3<i32>) {
        let Some(vertices) = face.vertices(chunk_origin) else {
            return;
        };
        let faces_generated = self.face_count() as u32;
        self.vertices.extend_from_slice(&vertices);
        self.indices
            .extend_from_slice(&Self::generate_face_indices(faces_generated));
    }

    /// Generates index data for a face, adjusted by the number of previously generated faces.
    ///
    /// # Returns
    /// Six indices forming the triangles `(0, 1, 2)` and `(0, 2, 3)` of the face.
    pub fn generate_face_indices(num_faces_generated: u32) -> [u32; 6] {
        let base = num_faces_generated * 4;
        [base, base + 1, base + 2, base, base + 2, base + 3]
    }

    /// Number of quads in the mesh.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// `true` when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Size of the vertex data in bytes.
    pub fn vertex_bytes(&self) -> u64 {
        std::mem::size_of_val(self.vertices.as_slice()) as u64
    }

    /// Size of the index data in bytes.
    pub fn index_bytes(&self) -> u64 {
        std::mem::size_of_val(self.indices.as_slice()) as u64
    }
}
