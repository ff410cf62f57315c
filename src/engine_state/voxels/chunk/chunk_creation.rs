//! # Chunk Creation Module
//!
//! This module provides the builder used to populate chunks in storage order while
//! keeping the solidity bit vector and the compact block vector consistent.
//!
//! Blocks are pushed with x varying fastest, then y, then z, which is the order of the
//! chunk's `solid_array`.

use bitvec::vec::BitVec;
use cgmath::Point3;

use crate::engine_state::voxels::block::{block_type::BlockType, Block};

use super::{Chunk, CHUNK_PLANE_SIZE, CHUNK_SIZE};

/// A builder for efficiently creating and populating chunks with optimized memory usage.
///
/// This struct maintains the relationship between:
/// 1. The bit vector tracking solid blocks (`solid_array`)
/// 2. The vector storing actual block data (`blocks`)
/// 3. The per-plane offsets into `blocks`
pub struct ChunkCreationIterator {
    /// The position of the chunk being created, in chunk coordinates
    position: Point3<i32>,
    /// One bit per cell, set for solid blocks
    solid_array: BitVec,
    /// Number of solid blocks preceding each z plane
    offsets_at_plane: Vec<u32>,
    /// Only the non-air blocks, in storage order
    blocks: Vec<Block>,
    /// Number of cells pushed so far
    cells_pushed: usize,
}

impl ChunkCreationIterator {
    /// Creates a new `ChunkCreationIterator` for building a chunk at the given position.
    pub fn new(position: Point3<i32>) -> Self {
        ChunkCreationIterator {
            position,
            solid_array: BitVec::with_capacity(CHUNK_SIZE as usize),
            offsets_at_plane: Vec::with_capacity(super::CHUNK_DIMENSION as usize),
            blocks: Vec::new(),
            cells_pushed: 0,
        }
    }

    /// Finalizes the chunk.
    ///
    /// Cells that were never pushed are filled with air, so a partially built chunk is
    /// still well formed.
    pub fn return_chunk(mut self) -> Chunk {
        while self.cells_pushed < CHUNK_SIZE as usize {
            self.push_block_type(BlockType::Air);
        }
        Chunk {
            position: self.position,
            solid_array: self.solid_array,
            offsets_at_plane: self.offsets_at_plane,
            blocks: self.blocks,
        }
    }

    /// Adds a block at the current cell and advances to the next one.
    ///
    /// Pushes beyond the last cell of the chunk are ignored.
    pub fn push_block_type(&mut self, block_type: BlockType) {
        if self.cells_pushed >= CHUNK_SIZE as usize {
            return;
        }

        if self.cells_pushed % CHUNK_PLANE_SIZE as usize == 0 {
            self.offsets_at_plane.push(self.blocks.len() as u32);
        }

        let is_solid = block_type.is_solid();
        self.solid_array.push(is_solid);

        // Only store non-air blocks to save memory
        if is_solid {
            self.blocks.push(Block::new(block_type));
        }

        self.cells_pushed += 1;
    }
}
