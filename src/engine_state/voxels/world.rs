//! # World Module
//!
//! This module provides the `WorldManager`, which decides which chunks exist around the
//! camera, requests their generation and meshing on the task manager, and queues mesh
//! uploads and removals for the renderer.
//!
//! ## Render-Distance Policy
//!
//! Distances are measured horizontally, in chunks, between chunk columns (Euclidean on
//! x and z). Vertically the world spans chunk rows `0..world_height_chunks`.
//! - Columns within `render_distance` are *visible* and get meshed
//! - Columns within `render_distance + 1` are generated, so every visible chunk has its
//!   four horizontal neighbours
//! - Columns beyond `render_distance + 2` are unloaded; the gap of one column keeps
//!   chunks from thrashing when the camera wobbles across a border
//!
//! ## Chunk Lifecycle
//!
//! `Generating -> Generated -> Meshing -> Meshed`. Generation and meshing requests carry a
//! ticket; a result whose ticket no longer matches the entry (the chunk was unloaded or
//! the world regenerated meanwhile) is discarded.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info, trace};

use crate::{
    config::{bounded_chunk_count, WorldConfig, MAX_RENDER_DISTANCE},
    engine_state::{
        rendering::{
            meshing::{ChunkNeighborhood, Mesh, MeshingStrategy, Neighbor},
            tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
        },
        task_management::{task::Task, TaskManager},
    },
};

use super::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{block_to_chunk, world_to_local, Chunk, ChunkPosition},
    generation::TerrainGenerator,
    tasks::chunk_generation_task::ChunkGenerationTask,
};

/// Identifies one generation or meshing request.
pub type Ticket = u64;

/// State of a loaded chunk.
#[derive(Debug)]
enum ChunkEntry {
    /// Waiting for a generation task
    Generating { ticket: Ticket },
    /// Block data available, no mesh yet
    Generated { chunk: Arc<Chunk> },
    /// Waiting for a meshing task
    Meshing { chunk: Arc<Chunk>, ticket: Ticket },
    /// Finished; `uploaded` is set when a non-empty mesh was queued for the renderer
    Meshed { chunk: Arc<Chunk>, uploaded: bool },
}

impl ChunkEntry {
    fn chunk(&self) -> Option<&Arc<Chunk>> {
        match self {
            ChunkEntry::Generating { .. } => None,
            ChunkEntry::Generated { chunk }
            | ChunkEntry::Meshing { chunk, .. }
            | ChunkEntry::Meshed { chunk, .. } => Some(chunk),
        }
    }
}

/// A change to the set of chunk meshes held by the renderer.
#[derive(Debug)]
pub enum MeshUpdate {
    /// Upload (or replace) the mesh of a chunk
    Upload(ChunkPosition, Mesh),
    /// Drop the mesh of a chunk
    Remove(ChunkPosition),
}

/// Counts of chunks per lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Chunks waiting for generation
    pub generating: usize,
    /// Chunks generated but not meshed
    pub generated: usize,
    /// Chunks waiting for a mesh
    pub meshing: usize,
    /// Chunks with a finished mesh
    pub meshed: usize,
    /// Mesh updates not yet taken by the renderer
    pub pending_updates: usize,
}

impl WorldStats {
    /// Total number of chunk entries.
    pub fn loaded(&self) -> usize {
        self.generating + self.generated + self.meshing + self.meshed
    }
}

/// Owns every loaded chunk and drives streaming around the camera.
pub struct WorldManager {
    chunks: HashMap<ChunkPosition, ChunkEntry>,
    generator: Arc<TerrainGenerator>,
    meshing: MeshingStrategy,
    render_distance: i32,
    max_generation_requests: usize,
    max_mesh_requests: usize,
    /// Column offsets within `render_distance + 1`, nearest first
    column_offsets: Vec<(i32, i32)>,
    /// Column the last update was centred on
    center: Option<(i32, i32)>,
    mesh_updates: VecDeque<MeshUpdate>,
    next_ticket: Ticket,
    /// Set when the last update stopped at a request cap
    requests_outstanding: bool,
}

impl WorldManager {
    /// Creates an empty world with a generator built from `config`.
    pub fn new(config: &WorldConfig) -> Self {
        let generator = TerrainGenerator::new(
            config.seed,
            config.generation.clone(),
            config.height_chunks,
        );
        let render_distance = bounded_chunk_count(config.render_distance, MAX_RENDER_DISTANCE);

        WorldManager {
            chunks: HashMap::new(),
            generator: Arc::new(generator),
            meshing: config.meshing,
            render_distance,
            max_generation_requests: config.max_generation_requests_per_update,
            max_mesh_requests: config.max_mesh_requests_per_update,
            column_offsets: sorted_column_offsets(render_distance + 1),
            center: None,
            mesh_updates: VecDeque::new(),
            next_ticket: 0,
            requests_outstanding: false,
        }
    }

    /// The generator new chunks are built with.
    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.generator
    }

    /// Requests the initial area around `center` and remembers it as the streaming centre.
    pub fn generate_world(&mut self, center: ChunkPosition, task_manager: &mut TaskManager) {
        info!(
            "Generating world around chunk ({}, {}) with seed {}",
            center.x,
            center.z,
            self.generator.seed()
        );
        self.center = None;
        self.update(center, task_manager);
    }

    /// Drops every chunk and queues removal of every uploaded mesh.
    ///
    /// Results of tasks still in flight are discarded when they arrive.
    pub fn delete_world(&mut self) {
        self.mesh_updates
            .retain(|update| matches!(update, MeshUpdate::Remove(_)));
        for (position, entry) in self.chunks.drain() {
            if let ChunkEntry::Meshed { uploaded: true, .. } = entry {
                self.mesh_updates.push_back(MeshUpdate::Remove(position));
            }
        }
        self.center = None;
        self.requests_outstanding = false;
        info!("World deleted");
    }

    /// Replaces the generator and deletes the world; the next update regenerates it.
    pub fn regenerate(&mut self, generator: TerrainGenerator) {
        self.delete_world();
        self.generator = Arc::new(generator);
        info!("World will regenerate with seed {}", self.generator.seed());
    }

    /// Streams chunks around `center`.
    ///
    /// Unloads distant chunks when the centre column changed, then requests generation
    /// and meshing nearest-first, each capped per call.
    pub fn update(&mut self, center: ChunkPosition, task_manager: &mut TaskManager) {
        let column = (center.x, center.z);
        if self.center != Some(column) {
            self.center = Some(column);
            self.unload_distant_chunks();
        }

        let generation_capped = self.request_generation(task_manager);
        let meshing_capped = self.request_meshing(task_manager);
        self.requests_outstanding = generation_capped || meshing_capped;
    }

    /// Accepts the result of a generation task.
    ///
    /// Meshing of the chunk and of the neighbours it completes is left to the capped scan
    /// of the next [`WorldManager::update`].
    pub fn insert_generated_chunk(&mut self, ticket: Ticket, chunk: Chunk) {
        let position = chunk.position;
        match self.chunks.get(&position) {
            Some(ChunkEntry::Generating { ticket: expected }) if *expected == ticket => {}
            _ => {
                trace!("Discarding stale chunk ({}, {}, {})", position.x, position.y, position.z);
                return;
            }
        }

        let chunk = Arc::new(chunk);
        let entry = if chunk.is_empty() {
            ChunkEntry::Meshed {
                chunk,
                uploaded: false,
            }
        } else {
            ChunkEntry::Generated { chunk }
        };
        self.chunks.insert(position, entry);
        self.requests_outstanding = true;
    }

    /// Accepts the result of a meshing task and queues it for upload.
    pub fn insert_mesh(&mut self, position: ChunkPosition, ticket: Ticket, mesh: Mesh) {
        let chunk = match self.chunks.get(&position) {
            Some(ChunkEntry::Meshing {
                chunk,
                ticket: expected,
            }) if *expected == ticket => chunk.clone(),
            _ => {
                trace!("Discarding stale mesh ({}, {}, {})", position.x, position.y, position.z);
                return;
            }
        };

        let uploaded = !mesh.is_empty();
        if uploaded {
            self.mesh_updates.push_back(MeshUpdate::Upload(position, mesh));
        }
        self.chunks
            .insert(position, ChunkEntry::Meshed { chunk, uploaded });
    }

    /// Takes pending mesh updates in order, stopping before the upload that would exceed
    /// `max_uploads`. Removals are not counted.
    pub fn drain_mesh_updates(&mut self, max_uploads: usize) -> Vec<MeshUpdate> {
        let mut drained = Vec::new();
        let mut uploads = 0;

        while let Some(update) = self.mesh_updates.pop_front() {
            if let MeshUpdate::Upload(..) = update {
                if uploads == max_uploads {
                    self.mesh_updates.push_front(update);
                    break;
                }
                uploads += 1;
            }
            drained.push(update);
        }

        drained
    }

    /// Type of the world block at `(x, y, z)`.
    ///
    /// # Returns
    /// `None` if the chunk holding the block is not generated
    pub fn block_type_at(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        let chunk = self.chunks.get(&block_to_chunk(x, y, z))?.chunk()?;
        let local = world_to_local(x, y, z);
        Some(chunk.get_block_type_at(local.x, local.y, local.z))
    }

    /// Counts chunks per lifecycle state.
    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            pending_updates: self.mesh_updates.len(),
            ..WorldStats::default()
        };
        for entry in self.chunks.values() {
            match entry {
                ChunkEntry::Generating { .. } => stats.generating += 1,
                ChunkEntry::Generated { .. } => stats.generated += 1,
                ChunkEntry::Meshing { .. } => stats.meshing += 1,
                ChunkEntry::Meshed { .. } => stats.meshed += 1,
            }
        }
        stats
    }

    /// `true` when no generation or meshing request is in flight and the last update
    /// requested everything it wanted. Mesh updates may still be waiting for the renderer.
    pub fn is_idle(&self) -> bool {
        !self.requests_outstanding
            && self.chunks.values().all(|entry| {
                !matches!(
                    entry,
                    ChunkEntry::Generating { .. } | ChunkEntry::Meshing { .. }
                )
            })
    }

    /// Forgets every request still in flight so the next update issues it again.
    ///
    /// Used when a worker stopped and its tasks were lost. Results of the forgotten
    /// requests that still arrive are discarded by ticket.
    pub fn reissue_pending_requests(&mut self) {
        let mut reissued = 0;
        self.chunks.retain(|_, entry| match entry {
            ChunkEntry::Generating { .. } => {
                reissued += 1;
                false
            }
            _ => true,
        });
        for entry in self.chunks.values_mut() {
            if let ChunkEntry::Meshing { chunk, .. } = entry {
                *entry = ChunkEntry::Generated {
                    chunk: chunk.clone(),
                };
                reissued += 1;
            }
        }
        if reissued > 0 {
            self.requests_outstanding = true;
            info!("Reissuing {reissued} lost chunk request(s)");
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn column_distance_squared(&self, position: ChunkPosition) -> Option<i32> {
        let (cx, cz) = self.center?;
        let (dx, dz) = (position.x - cx, position.z - cz);
        Some(dx * dx + dz * dz)
    }

    fn is_visible(&self, position: ChunkPosition) -> bool {
        self.generator.contains_row(position.y)
            && self
                .column_distance_squared(position)
                .is_some_and(|d| d <= self.render_distance * self.render_distance)
    }

    fn unload_distant_chunks(&mut self) {
        let limit = self.render_distance + 2;
        let distant: Vec<ChunkPosition> = self
            .chunks
            .keys()
            .copied()
            .filter(|&position| {
                self.column_distance_squared(position)
                    .is_some_and(|d| d > limit * limit)
            })
            .collect();

        for position in &distant {
            if let Some(ChunkEntry::Meshed { uploaded: true, .. }) = self.chunks.remove(position)
            {
                self.mesh_updates.push_back(MeshUpdate::Remove(*position));
            }
        }
        if !distant.is_empty() {
            self.mesh_updates.retain(|update| match update {
                MeshUpdate::Upload(position, _) => !distant.contains(position),
                MeshUpdate::Remove(_) => true,
            });
            debug!("Unloaded {} chunk(s)", distant.len());
        }
    }

    /// Returns `true` if the cap stopped the scan early.
    fn request_generation(&mut self, task_manager: &mut TaskManager) -> bool {
        let Some((cx, cz)) = self.center else {
            return false;
        };

        let mut requested = 0;
        for index in 0..self.column_offsets.len() {
            let (dx, dz) = self.column_offsets[index];
            for y in 0..self.generator.world_height_chunks() {
                let position = Point3::new(cx + dx, y, cz + dz);
                if self.chunks.contains_key(&position) {
                    continue;
                }
                if requested == self.max_generation_requests {
                    return true;
                }

                let ticket = self.issue_ticket();
                self.chunks
                    .insert(position, ChunkEntry::Generating { ticket });
                task_manager.publish_task(Box::new(ChunkGenerationTask::new(
                    self.generator.clone(),
                    position,
                    ticket,
                )));
                requested += 1;
            }
        }
        false
    }

    /// Returns `true` if the cap stopped the scan early.
    fn request_meshing(&mut self, task_manager: &mut TaskManager) -> bool {
        let Some((cx, cz)) = self.center else {
            return false;
        };
        let visible_squared = self.render_distance * self.render_distance;

        let mut requested = 0;
        for index in 0..self.column_offsets.len() {
            let (dx, dz) = self.column_offsets[index];
            if dx * dx + dz * dz > visible_squared {
                break;
            }
            for y in 0..self.generator.world_height_chunks() {
                let position = Point3::new(cx + dx, y, cz + dz);
                if !matches!(self.chunks.get(&position), Some(ChunkEntry::Generated { .. })) {
                    continue;
                }
                if requested == self.max_mesh_requests {
                    return true;
                }
                if let Some(task) = self.start_meshing(position) {
                    task_manager.publish_task(task);
                    requested += 1;
                }
            }
        }
        false
    }

    /// Moves a visible, generated chunk whose neighbours are all available into the
    /// `Meshing` state and builds its task.
    fn start_meshing(&mut self, position: ChunkPosition) -> Option<Box<dyn Task + Send>> {
        if !self.is_visible(position) {
            return None;
        }
        let Some(ChunkEntry::Generated { chunk }) = self.chunks.get(&position) else {
            return None;
        };
        let chunk = chunk.clone();
        let neighborhood = self.neighborhood(chunk.clone())?;

        let ticket = self.issue_ticket();
        self.chunks
            .insert(position, ChunkEntry::Meshing { chunk, ticket });
        Some(Box::new(ChunkMeshGenerationTask::new(
            neighborhood,
            self.meshing,
            ticket,
        )))
    }

    /// Collects the neighbours of `chunk`.
    ///
    /// # Returns
    /// `None` while any neighbour inside the world is not generated yet
    fn neighborhood(&self, chunk: Arc<Chunk>) -> Option<ChunkNeighborhood> {
        let mut neighbors: [Neighbor; 6] = std::array::from_fn(|_| Neighbor::Empty);
        for side in BlockSide::all() {
            let position = chunk.position + side.normal();
            neighbors[side as usize] = if position.y < 0 {
                Neighbor::Solid
            } else if position.y >= self.generator.world_height_chunks() {
                Neighbor::Empty
            } else {
                Neighbor::Chunk(self.chunks.get(&position)?.chunk()?.clone())
            };
        }
        Some(ChunkNeighborhood::new(chunk, neighbors))
    }
}

/// All column offsets within `radius` (Euclidean), nearest first.
fn sorted_column_offsets(radius: i32) -> Vec<(i32, i32)> {
    let mut offsets: Vec<(i32, i32)> = (-radius..=radius)
        .flat_map(|dx| (-radius..=radius).map(move |dz| (dx, dz)))
        .filter(|(dx, dz)| dx * dx + dz * dz <= radius * radius)
        .collect();
    offsets.sort_by_key(|&(dx, dz)| (dx * dx + dz * dz, dx, dz));
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::generation::GenerationMethod;

    fn flat_config(render_distance: u32) -> WorldConfig {
        WorldConfig {
            render_distance,
            height_chunks: 1,
            generation: GenerationMethod::Flat { height: 10 },
            ..WorldConfig::default()
        }
    }

    fn settle(world: &mut WorldManager, tasks: &mut TaskManager, center: ChunkPosition) {
        for _ in 0..100 {
            world.update(center, tasks);
            tasks.process_completed_tasks(world);
            if world.is_idle() && !tasks.has_pending_work() {
                world.update(center, tasks);
                if world.is_idle() && !tasks.has_pending_work() {
                    return;
                }
            }
        }
        panic!("world did not settle: {:?}", world.stats());
    }

    fn columns_within(radius: i32) -> usize {
        sorted_column_offsets(radius).len()
    }

    fn uploads(updates: &[MeshUpdate]) -> Vec<ChunkPosition> {
        updates
            .iter()
            .filter_map(|update| match update {
                MeshUpdate::Upload(position, _) => Some(*position),
                MeshUpdate::Remove(_) => None,
            })
            .collect()
    }

    #[test]
    fn offsets_are_sorted_nearest_first() {
        let offsets = sorted_column_offsets(3);
        assert_eq!(offsets[0], (0, 0));
        assert_eq!(offsets.len(), 29);
        assert!(offsets
            .windows(2)
            .all(|w| w[0].0 * w[0].0 + w[0].1 * w[0].1 <= w[1].0 * w[1].0 + w[1].1 * w[1].1));
    }

    #[test]
    fn streams_the_area_around_the_center() {
        let mut world = WorldManager::new(&flat_config(2));
        let mut tasks = TaskManager::new(0);
        let center = Point3::new(0, 0, 0);

        world.generate_world(center, &mut tasks);
        settle(&mut world, &mut tasks, center);

        let stats = world.stats();
        assert_eq!(stats.loaded(), columns_within(3));
        assert_eq!(stats.meshed, columns_within(2));
        assert_eq!(stats.generated, columns_within(3) - columns_within(2));

        let updates = world.drain_mesh_updates(usize::MAX);
        assert_eq!(uploads(&updates).len(), columns_within(2));
        assert!(world.is_idle());
    }

    #[test]
    fn generation_is_requested_nearest_first_and_capped() {
        let config = WorldConfig {
            max_generation_requests_per_update: 1,
            ..flat_config(4)
        };
        let mut world = WorldManager::new(&config);
        let mut tasks = TaskManager::new(0);

        world.update(Point3::new(5, 0, -3), &mut tasks);
        assert_eq!(world.stats().generating, 1);
        assert!(!world.is_idle());

        tasks.process_completed_tasks(&mut world);
        assert_eq!(world.block_type_at(5 * 16, 10, -3 * 16), Some(BlockType::Grass));
        assert_eq!(world.block_type_at(6 * 16, 10, -3 * 16), None);
    }

    #[test]
    fn moving_away_unloads_and_removes_meshes() {
        let mut world = WorldManager::new(&flat_config(1));
        let mut tasks = TaskManager::new(0);
        let start = Point3::new(0, 0, 0);
        settle(&mut world, &mut tasks, start);
        let uploaded = uploads(&world.drain_mesh_updates(usize::MAX));
        assert!(uploaded.contains(&start));

        let far = Point3::new(100, 0, 0);
        settle(&mut world, &mut tasks, far);

        let updates = world.drain_mesh_updates(usize::MAX);
        let removed: Vec<_> = updates
            .iter()
            .filter_map(|update| match update {
                MeshUpdate::Remove(position) => Some(*position),
                MeshUpdate::Upload(..) => None,
            })
            .collect();
        assert_eq!(removed.len(), uploaded.len());
        assert!(removed.contains(&start));
        assert_eq!(world.block_type_at(0, 10, 0), None);
        assert_eq!(world.stats().loaded(), columns_within(2));
    }

    #[test]
    fn small_moves_keep_chunks_loaded() {
        let mut world = WorldManager::new(&flat_config(2));
        let mut tasks = TaskManager::new(0);
        settle(&mut world, &mut tasks, Point3::new(0, 0, 0));
        world.drain_mesh_updates(usize::MAX);

        world.update(Point3::new(1, 0, 0), &mut tasks);
        let updates = world.drain_mesh_updates(usize::MAX);
        assert!(updates
            .iter()
            .all(|update| matches!(update, MeshUpdate::Upload(..))));
        assert!(world.block_type_at(-48, 10, 0).is_some());
    }

    #[test]
    fn pending_uploads_are_dropped_on_unload() {
        let mut world = WorldManager::new(&flat_config(1));
        let mut tasks = TaskManager::new(0);
        settle(&mut world, &mut tasks, Point3::new(0, 0, 0));

        world.update(Point3::new(50, 0, 50), &mut tasks);
        let updates = world.drain_mesh_updates(usize::MAX);
        assert!(updates
            .iter()
            .all(|update| !matches!(update, MeshUpdate::Upload(position, _) if position.x < 10)));
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut world = WorldManager::new(&flat_config(1));
        let mut tasks = TaskManager::new(0);

        world.update(Point3::new(0, 0, 0), &mut tasks);
        world.delete_world();
        tasks.process_completed_tasks(&mut world);

        assert_eq!(world.stats().loaded(), 0);
        assert!(world.drain_mesh_updates(usize::MAX).is_empty());

        world.insert_generated_chunk(999, Chunk::filled(Point3::new(0, 0, 0), BlockType::Dirt));
        world.insert_mesh(Point3::new(0, 0, 0), 999, Mesh::new());
        assert_eq!(world.stats().loaded(), 0);
    }

    #[test]
    fn results_of_a_superseded_request_are_discarded() {
        let config = WorldConfig {
            max_generation_requests_per_update: 1,
            ..flat_config(1)
        };
        let mut world = WorldManager::new(&config);
        let mut tasks = TaskManager::new(0);
        let origin = Point3::new(0, 0, 0);

        // Tickets 1, 2 and 3: origin, far away, origin again.
        world.update(origin, &mut tasks);
        world.update(Point3::new(100, 0, 0), &mut tasks);
        world.update(origin, &mut tasks);
        assert_eq!(world.stats().generating, 1);

        world.insert_generated_chunk(1, Chunk::filled(origin, BlockType::Stone));
        assert_eq!(world.stats().generating, 1);
        assert_eq!(world.block_type_at(0, 0, 0), None);

        tasks.process_completed_tasks(&mut world);
        assert_eq!(world.stats().loaded(), 1);
        assert_eq!(world.block_type_at(0, 10, 0), Some(BlockType::Grass));
        assert_eq!(world.block_type_at(0, 11, 0), Some(BlockType::Air));
    }

    #[test]
    fn meshing_is_capped_per_update() {
        let config = WorldConfig {
            max_mesh_requests_per_update: 1,
            ..flat_config(2)
        };
        let mut world = WorldManager::new(&config);
        let mut tasks = TaskManager::new(0);
        let center = Point3::new(0, 0, 0);

        world.update(center, &mut tasks);
        tasks.process_completed_tasks(&mut world);
        let stats = world.stats();
        assert_eq!(stats.generated, columns_within(3));
        assert_eq!(stats.meshing, 0);
        assert!(!world.is_idle());

        world.update(center, &mut tasks);
        assert_eq!(world.stats().meshing, 1);
        tasks.process_completed_tasks(&mut world);
        assert_eq!(world.stats().meshing, 0);
        assert_eq!(world.stats().meshed, 1);

        world.update(center, &mut tasks);
        assert_eq!(world.stats().meshing, 1);
    }

    #[test]
    fn world_floor_is_solid_and_ceiling_is_open() {
        let config = WorldConfig {
            generation: GenerationMethod::Flat { height: 15 },
            ..flat_config(1)
        };
        let mut world = WorldManager::new(&config);
        let mut tasks = TaskManager::new(0);
        settle(&mut world, &mut tasks, Point3::new(0, 0, 0));

        let updates = world.drain_mesh_updates(usize::MAX);
        assert_eq!(uploads(&updates).len(), columns_within(1));
        for update in &updates {
            let MeshUpdate::Upload(_, mesh) = update else {
                continue;
            };
            assert!(!mesh.is_empty());
            // Only the top faces against the open ceiling remain.
            assert!(mesh.vertices.iter().all(|vertex| vertex.position[1] == 16.0));
        }
    }

    #[test]
    fn lost_requests_are_reissued() {
        let mut world = WorldManager::new(&flat_config(1));
        let mut lost = TaskManager::new(0);
        let center = Point3::new(0, 0, 0);

        world.update(center, &mut lost);
        assert_eq!(world.stats().generating, columns_within(2));

        world.reissue_pending_requests();
        assert_eq!(world.stats().loaded(), 0);
        assert!(!world.is_idle());

        let mut tasks = TaskManager::new(0);
        settle(&mut world, &mut tasks, center);
        lost.process_completed_tasks(&mut world);
        assert_eq!(world.stats().meshed, columns_within(1));
        assert_eq!(world.stats().loaded(), columns_within(2));
    }

    #[test]
    fn upload_cap_ignores_removals() {
        let mut world = WorldManager::new(&flat_config(1));
        world.mesh_updates.push_back(MeshUpdate::Remove(Point3::new(9, 0, 9)));
        for x in 0..3 {
            world
                .mesh_updates
                .push_back(MeshUpdate::Upload(Point3::new(x, 0, 0), Mesh::new()));
        }
        world.mesh_updates.push_back(MeshUpdate::Remove(Point3::new(8, 0, 8)));

        let first = world.drain_mesh_updates(2);
        assert_eq!(first.len(), 3);
        assert_eq!(uploads(&first).len(), 2);

        let rest = world.drain_mesh_updates(2);
        assert_eq!(rest.len(), 2);
        assert!(world.drain_mesh_updates(2).is_empty());
    }

    #[test]
    fn empty_chunks_skip_meshing() {
        let config = WorldConfig {
            generation: GenerationMethod::Empty,
            ..flat_config(1)
        };
        let mut world = WorldManager::new(&config);
        let mut tasks = TaskManager::new(0);
        settle(&mut world, &mut tasks, Point3::new(0, 0, 0));

        let stats = world.stats();
        assert_eq!(stats.meshed, columns_within(2));
        assert!(world.drain_mesh_updates(usize::MAX).is_empty());
    }

    #[test]
    fn regenerate_replaces_the_terrain() {
        let mut world = WorldManager::new(&flat_config(1));
        let mut tasks = TaskManager::new(0);
        let center = Point3::new(0, 0, 0);
        settle(&mut world, &mut tasks, center);
        world.drain_mesh_updates(usize::MAX);

        world.regenerate(TerrainGenerator::new(1, GenerationMethod::Flat { height: 4 }, 1));
        let removals = world.drain_mesh_updates(usize::MAX);
        assert!(removals
            .iter()
            .all(|update| matches!(update, MeshUpdate::Remove(_))));
        assert!(!removals.is_empty());

        world.generate_world(center, &mut tasks);
        settle(&mut world, &mut tasks, center);
        assert_eq!(world.block_type_at(0, 4, 0), Some(BlockType::Grass));
        assert_eq!(world.block_type_at(0, 10, 0), Some(BlockType::Air));
    }
}
