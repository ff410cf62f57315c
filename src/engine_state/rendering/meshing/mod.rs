//! Mesh generation and rendering for voxel chunks.
//!
//! This module turns chunk data into GPU-friendly meshes and draws them.
//!
//! # Architecture
//! - `mesh/`: Contains the core mesh generation algorithms
//! - `ChunkRenderer`: Owns the chunk pipeline and the per-chunk GPU buffers
//! - [`MeshingStrategy`]: Selects how visible faces become quads

use serde::{Deserialize, Serialize};

/// Core mesh generation algorithms and data structures.
///
/// This module contains the implementation of face culling and greedy meshing for
/// converting voxel data into triangle meshes.
mod mesh;
mod renderer;

// Re-export the mesh module's public interface for external use
pub use mesh::*;

// Re-export the renderer module's public interface for external use
pub use renderer::*;

/// How visible block faces are turned into quads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshingStrategy {
    /// One quad per visible block face
    Culled,
    /// Coplanar faces of the same block type merged into larger quads
    #[default]
    Greedy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_use_snake_case_names() {
        assert_eq!(
            serde_json::to_string(&MeshingStrategy::Culled).unwrap(),
            "\"culled\""
        );
        let greedy: MeshingStrategy = serde_json::from_str("\"greedy\"").unwrap();
        assert_eq!(greedy, MeshingStrategy::Greedy);
        assert_eq!(MeshingStrategy::default(), MeshingStrategy::Greedy);
    }
}
