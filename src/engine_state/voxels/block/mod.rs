//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine:
//! block type definitions, block face geometry and the compact block record stored
//! in chunks.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Represents a single voxel block in the world.
///
/// This is a lightweight structure that stores only the essential block data.
/// The actual block properties are looked up from the block type.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute ensures a consistent memory layout.
/// The block type is stored as a compact `BlockTypeSize` for memory efficiency.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// Decodes the stored block type.
    ///
    /// Blocks are only ever built through [`Block::new`], so an unknown value is
    /// treated as air rather than trusted.
    pub fn get_block_type(&self) -> BlockType {
        BlockType::from_int(self.block_type).unwrap_or(BlockType::Air)
    }
}
