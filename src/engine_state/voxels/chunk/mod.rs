//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! 16x16x16 blocks of voxel data.
//!
//! ## Memory Optimization
//!
//! Chunks use a memory-efficient storage strategy to handle the large number of blocks
//! in a voxel world:
//! - `solid_array`: A bit vector (1 bit per block) indicating which blocks are solid
//! - `blocks`: A vector containing only non-air blocks, in the order they appear in the chunk
//! - `offsets_at_plane`: The index into `blocks` of the first solid block of each z plane
//!
//! Air blocks (which are common) only consume 1 bit each. For example, in a chunk with
//! only two solid blocks (one at each end), the storage would be:
//! - `solid_array`: `1000...0001` (CHUNK_SIZE bits)
//! - `blocks`: `[block1, block2]` (only 2 blocks stored)
//!
//! ### Performance Characteristics
//! - **Solidity Check**: O(1) - Just check the bit in `solid_array`
//! - **Block Lookup**: O(plane) - A plane offset plus a popcount over at most one plane
//! - **Memory Usage**: ~1 bit per air block + sizeof(Block) per solid block + overhead
//!
//! ## Layout
//!
//! The cell at local `(x, y, z)` lives at bit `x + 16 * y + 256 * z`. Chunks are immutable
//! once built, so they are shared between the world and worker threads behind an `Arc`.

use bitvec::prelude::BitVec;
use cgmath::Point3;

use super::block::block_type::BlockType;
use super::block::Block;

pub mod chunk_creation;
pub mod chunk_iteration;

use chunk_creation::ChunkCreationIterator;
use chunk_iteration::ChunkBlockIterator;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Position of a chunk in chunk coordinates. Chunk `(cx, cy, cz)` covers world blocks
/// `16cx..16cx+15` on x, and likewise on y and z.
pub type ChunkPosition = Point3<i32>;

/// Represents a 16x16x16 collection of voxel blocks in the world.
///
/// Chunks are the fundamental unit of world data. Each chunk maintains its position in
/// the world and the data about its blocks.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: ChunkPosition,

    /// A bit vector where each bit represents whether the corresponding block is solid (1)
    /// or air (0), indexed by `x + 16 * y + 256 * z`.
    pub solid_array: BitVec,

    /// Number of solid blocks stored before each z plane.
    pub offsets_at_plane: Vec<u32>,

    /// The actual block data for this chunk, containing only non-air blocks.
    ///
    /// The index of a block in this vector is equal to the number of set bits before its
    /// position in the `solid_array`.
    pub blocks: Vec<Block>,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    pub fn empty(position: ChunkPosition) -> Self {
        ChunkCreationIterator::new(position).return_chunk()
    }

    /// Creates a new chunk in which every cell holds `block_type`.
    pub fn filled(position: ChunkPosition, block_type: BlockType) -> Self {
        Self::from_fn(position, |_| block_type)
    }

    /// Builds a chunk by asking `block_at` for the type of every cell, in storage order.
    ///
    /// The closure receives the chunk-local position of the cell.
    pub fn from_fn<F>(position: ChunkPosition, mut block_at: F) -> Self
    where
        F: FnMut(Point3<i32>) -> BlockType,
    {
        let mut cci = ChunkCreationIterator::new(position);

        for z in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    cci.push_block_type(block_at(Point3::new(x, y, z)));
                }
            }
        }

        cci.return_chunk()
    }

    /// World-space position of the chunk's minimum corner.
    pub fn origin(&self) -> Point3<i32> {
        chunk_origin(self.position)
    }

    /// Gets the block type at the specified chunk-relative coordinates.
    ///
    /// # Returns
    /// `BlockType::Air` for empty cells and for coordinates outside `0..16`.
    pub fn get_block_type_at(&self, cx: i32, cy: i32, cz: i32) -> BlockType {
        let Some(index) = Self::index_of(cx, cy, cz) else {
            return BlockType::Air;
        };
        if !self.solid_array[index] {
            return BlockType::Air;
        }

        let plane_start = cz as usize * CHUNK_PLANE_SIZE as usize;
        let offset = self.offsets_at_plane[cz as usize] as usize
            + self.solid_array[plane_start..index].count_ones();
        self.blocks[offset].get_block_type()
    }

    /// Checks if the block at the specified chunk-relative coordinates is solid.
    ///
    /// # Returns
    /// `true` if the block is solid, `false` if it's air or out of bounds.
    pub fn is_block_solid(&self, cx: i32, cy: i32, cz: i32) -> bool {
        Self::index_of(cx, cy, cz).is_some_and(|index| self.solid_array[index])
    }

    /// Number of solid blocks in the chunk.
    pub fn solid_count(&self) -> usize {
        self.blocks.len()
    }

    /// `true` when the chunk holds no solid blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// `true` when every cell of the chunk is solid.
    pub fn is_full(&self) -> bool {
        self.blocks.len() == CHUNK_SIZE as usize
    }

    /// Iterates over every solid block with its chunk-local position.
    pub fn iter_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    fn index_of(cx: i32, cy: i32, cz: i32) -> Option<usize> {
        let range = 0..CHUNK_DIMENSION;
        if !(range.contains(&cx) && range.contains(&cy) && range.contains(&cz)) {
            return None;
        }
        Some((cx + CHUNK_DIMENSION * cy + CHUNK_PLANE_SIZE * cz) as usize)
    }
}

/// Chunk containing the world-space point `position`.
pub fn world_to_chunk(position: Point3<f32>) -> ChunkPosition {
    block_to_chunk(
        position.x.floor() as i32,
        position.y.floor() as i32,
        position.z.floor() as i32,
    )
}

/// Chunk containing the world block at `(x, y, z)`.
///
/// Uses floor division, so block `-1` belongs to chunk `-1`.
pub fn block_to_chunk(x: i32, y: i32, z: i32) -> ChunkPosition {
    Point3::new(
        x.div_euclid(CHUNK_DIMENSION),
        y.div_euclid(CHUNK_DIMENSION),
        z.div_euclid(CHUNK_DIMENSION),
    )
}

/// Position of a world block relative to the chunk that contains it.
pub fn world_to_local(x: i32, y: i32, z: i32) -> Point3<i32> {
    Point3::new(
        x.rem_euclid(CHUNK_DIMENSION),
        y.rem_euclid(CHUNK_DIMENSION),
        z.rem_euclid(CHUNK_DIMENSION),
    )
}

/// World-space position of the minimum corner of chunk `position`.
pub fn chunk_origin(position: ChunkPosition) -> Point3<i32> {
    Point3::new(
        position.x * CHUNK_DIMENSION,
        position.y * CHUNK_DIMENSION,
        position.z * CHUNK_DIMENSION,
    )
}
