//! # Chunk Iteration Module
//!
//! This module provides an iterator over the solid blocks of a chunk. It walks the set
//! bits of the chunk's `solid_array` and pairs each one with the next entry of the
//! compact `blocks` vector, so air cells cost nothing beyond a bit scan.

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::{Chunk, CHUNK_DIMENSION, CHUNK_PLANE_SIZE};

/// An iterator over all non-air blocks in a chunk, in storage order.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next position in the solid array to inspect
    current_solid_offset: usize,
    /// Current position in the blocks vector
    current_block_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given chunk.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_solid_offset: 0,
            current_block_offset: 0,
        }
    }

    /// Gets the next non-air block in the chunk along with its local position.
    ///
    /// # Returns
    /// - `Some((position, block))` if another non-air block is found
    /// - `None` if there are no more blocks to iterate over
    pub fn get_next_block(&mut self) -> Option<(Point3<usize>, &'a Block)> {
        if self.current_block_offset >= self.chunk_ref.blocks.len() {
            return None;
        }

        let remaining = &self.chunk_ref.solid_array[self.current_solid_offset..];
        let index = self.current_solid_offset + remaining.first_one()?;

        let block = &self.chunk_ref.blocks[self.current_block_offset];
        let dimension = CHUNK_DIMENSION as usize;
        let plane = CHUNK_PLANE_SIZE as usize;
        let position = Point3::new(
            index % dimension,
            (index / dimension) % dimension,
            index / plane,
        );

        self.current_block_offset += 1;
        self.current_solid_offset = index + 1;

        Some((position, block))
    }
}

impl<'a> Iterator for ChunkBlockIterator<'a> {
    type Item = (Point3<usize>, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_block()
    }
}
