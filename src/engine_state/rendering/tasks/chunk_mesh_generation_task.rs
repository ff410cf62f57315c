//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which builds the vertex and index
//! data of one chunk off the main thread. The finished mesh is handed back to the world
//! manager, which queues it for upload.

use log::trace;
use web_time::Instant;

use crate::engine_state::{
    rendering::meshing::{ChunkNeighborhood, Mesh, MeshingStrategy},
    task_management::task::{Task, TaskResult},
    voxels::{
        chunk::ChunkPosition,
        world::{Ticket, WorldManager},
    },
};

/// A task that generates mesh data for a chunk in a background thread.
pub struct ChunkMeshGenerationTask {
    /// The chunk to mesh together with its neighbours
    neighborhood: ChunkNeighborhood,
    /// How faces are turned into quads
    strategy: MeshingStrategy,
    /// The request this task answers
    ticket: Ticket,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    pub fn new(neighborhood: ChunkNeighborhood, strategy: MeshingStrategy, ticket: Ticket) -> Self {
        ChunkMeshGenerationTask {
            neighborhood,
            strategy,
            ticket,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let start = Instant::now();
        let mesh = Mesh::build(&self.neighborhood, self.strategy);
        let position = self.neighborhood.center.position;
        trace!(
            "Meshed chunk ({}, {}, {}): {} faces in {:?}",
            position.x,
            position.y,
            position.z,
            mesh.face_count(),
            start.elapsed()
        );

        Box::new(ChunkMeshGenerationTaskResult {
            position,
            ticket: self.ticket,
            mesh,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    position: ChunkPosition,
    ticket: Ticket,
    mesh: Mesh,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    fn handle_result(self: Box<Self>, world: &mut WorldManager) -> Vec<Box<dyn Task + Send>> {
        world.insert_mesh(self.position, self.ticket, self.mesh);
        Vec::new()
    }
}
