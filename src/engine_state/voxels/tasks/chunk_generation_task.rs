//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, which fills one chunk with blocks on a
//! worker thread. The world manager schedules it for every chunk that enters the
//! generation radius around the camera.

use std::sync::Arc;

use crate::engine_state::{
    task_management::task::{Task, TaskResult},
    voxels::{
        chunk::{Chunk, ChunkPosition},
        generation::TerrainGenerator,
        world::{Ticket, WorldManager},
    },
};

/// A task that generates chunk data asynchronously.
pub struct ChunkGenerationTask {
    /// The shared, immutable terrain generator
    generator: Arc<TerrainGenerator>,
    /// The position of the chunk to generate (in chunk coordinates)
    position: ChunkPosition,
    /// The request this task answers
    ticket: Ticket,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    pub fn new(generator: Arc<TerrainGenerator>, position: ChunkPosition, ticket: Ticket) -> Self {
        ChunkGenerationTask {
            generator,
            position,
            ticket,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            chunk: self.generator.generate_chunk(self.position),
            ticket: self.ticket,
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    chunk: Chunk,
    ticket: Ticket,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Hands the chunk to the world. Meshing is requested by the world's next update.
    fn handle_result(self: Box<Self>, world: &mut WorldManager) -> Vec<Box<dyn Task + Send>> {
        world.insert_generated_chunk(self.ticket, self.chunk);
        Vec::new()
    }
}
