//! The chunk being meshed together with its six face neighbours.
//!
//! Face culling needs to know whether the cell just across a chunk border is solid, so
//! the mesher always reads blocks through a [`ChunkNeighborhood`].

use std::sync::Arc;

use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{Chunk, CHUNK_DIMENSION},
};

/// What lies across one face of the chunk being meshed.
#[derive(Debug, Clone)]
pub enum Neighbor {
    /// A generated chunk
    Chunk(Arc<Chunk>),
    /// Treated as entirely solid, e.g. below the world floor
    Solid,
    /// Treated as entirely air, e.g. above the world ceiling
    Empty,
}

impl Neighbor {
    fn is_block_solid(&self, cx: i32, cy: i32, cz: i32) -> bool {
        match self {
            Neighbor::Chunk(chunk) => chunk.is_block_solid(cx, cy, cz),
            Neighbor::Solid => true,
            Neighbor::Empty => false,
        }
    }
}

/// A chunk plus its neighbours, indexed by `BlockSide as usize`.
#[derive(Debug, Clone)]
pub struct ChunkNeighborhood {
    /// The chunk to mesh
    pub center: Arc<Chunk>,
    /// The neighbour across each face of `center`
    pub neighbors: [Neighbor; 6],
}

impl ChunkNeighborhood {
    /// Creates a neighbourhood from a chunk and the neighbour across each face.
    pub fn new(center: Arc<Chunk>, neighbors: [Neighbor; 6]) -> Self {
        ChunkNeighborhood { center, neighbors }
    }

    /// A chunk with nothing around it, so every border face is visible.
    pub fn isolated(center: Arc<Chunk>) -> Self {
        Self::new(center, std::array::from_fn(|_| Neighbor::Empty))
    }

    /// Checks whether the cell at `position`, relative to the center chunk, is solid.
    ///
    /// `position` may step one cell past a face of the chunk, in which case the matching
    /// neighbour is consulted.
    pub fn is_solid(&self, position: Point3<i32>) -> bool {
        let Point3 { x, y, z } = position;
        let side = if x < 0 {
            BlockSide::Left
        } else if x >= CHUNK_DIMENSION {
            BlockSide::Right
        } else if y < 0 {
            BlockSide::Bottom
        } else if y >= CHUNK_DIMENSION {
            BlockSide::Top
        } else if z < 0 {
            BlockSide::Back
        } else if z >= CHUNK_DIMENSION {
            BlockSide::Front
        } else {
            return self.center.is_block_solid(x, y, z);
        };

        self.neighbors[side as usize].is_block_solid(
            x.rem_euclid(CHUNK_DIMENSION),
            y.rem_euclid(CHUNK_DIMENSION),
            z.rem_euclid(CHUNK_DIMENSION),
        )
    }

    /// Block type of a cell inside the center chunk.
    pub fn block_type_at(&self, position: Point3<i32>) -> BlockType {
        self.center
            .get_block_type_at(position.x, position.y, position.z)
    }

    /// Checks whether the `side` face of the block at `position` should be drawn.
    pub fn is_face_visible(&self, position: Point3<i32>, side: BlockSide) -> bool {
        !self.is_solid(position + side.normal())
    }
}
