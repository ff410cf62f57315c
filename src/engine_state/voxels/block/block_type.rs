//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world and the
//! conversion between the compact storage integer and the rich enum.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminants are the values stored in [`super::Block`], so the order of the
/// variants is part of the storage format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Air is never stored in a chunk's block vector.
    Air = 0,

    /// Plain dirt on every face.
    Dirt = 1,

    /// Grass on top, dirt underneath, grass-on-dirt on the sides.
    Grass = 2,

    /// Stone on every face.
    Stone = 3,
}

impl BlockType {
    /// Converts a stored `BlockTypeSize` back into a `BlockType`.
    ///
    /// # Returns
    /// `None` if the value does not name a block type
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(btype)
    }

    /// Whether the block occupies its cell and hides the faces of its neighbours.
    pub fn is_solid(self) -> bool {
        self != BlockType::Air
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_storage_integer() {
        for block_type in [BlockType::Air, BlockType::Dirt, BlockType::Grass, BlockType::Stone] {
            assert_eq!(BlockType::from_int(block_type as BlockTypeSize), Some(block_type));
        }
        assert_eq!(BlockType::from_int(200), None);
    }

    #[test]
    fn only_air_is_not_solid() {
        assert!(!BlockType::Air.is_solid());
        assert!(BlockType::Dirt.is_solid());
        assert!(BlockType::Grass.is_solid());
        assert!(BlockType::Stone.is_solid());
    }
}
