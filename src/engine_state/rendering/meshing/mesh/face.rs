use cgmath::Point3;

use crate::engine_state::{
    rendering::Vertex,
    voxels::{
        atlas,
        block::{block_side::BlockSide, block_type::BlockType},
    },
};

/// A rectangular quad covering one or more coplanar block faces of the same type.
///
/// `origin` is the minimum cell covered by the quad, in chunk coordinates. The quad
/// extends `width` cells along the side's texture `u` axis and `height` cells along its
/// `v` axis (see [`BlockSide::texture_axes`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Minimum cell covered by the face
    pub origin: Point3<i32>,
    /// Which side of the blocks this face lies on
    pub side: BlockSide,
    /// Extent along the texture `u` axis, in blocks
    pub width: u32,
    /// Extent along the texture `v` axis, in blocks
    pub height: u32,
    /// Type of every block under the face
    pub block_type: BlockType,
}

impl Face {
    /// A face covering a single block.
    pub fn unit(origin: Point3<i32>, side: BlockSide, block_type: BlockType) -> Self {
        Face {
            origin,
            side,
            width: 1,
            height: 1,
            block_type,
        }
    }

    /// Builds the four corners of the face, offset by `chunk_origin` into world space.
    ///
    /// Corners are counter-clockwise seen from outside. Texture coordinates run
    /// `(0, h) (w, h) (w, 0) (0, 0)` so the tile repeats once per block and side
    /// faces stay upright.
    ///
    /// # Returns
    /// `None` if the block type has no texture (air)
    pub fn vertices(&self, chunk_origin: Point3<i32>) -> Option<[Vertex; 4]> {
        let tile = atlas::tile_for(self.block_type, self.side)?;
        let tile_origin = tile.uv_rect().min;
        let shade = self.side.shade();

        let (u_axis, v_axis) = self.side.texture_axes();
        let mut extent = [1i32; 3];
        extent[u_axis] = self.width as i32;
        extent[v_axis] = self.height as i32;

        let base = [
            chunk_origin.x + self.origin.x,
            chunk_origin.y + self.origin.y,
            chunk_origin.z + self.origin.z,
        ];
        let (w, h) = (self.width as f32, self.height as f32);
        let tex_coords = [[0.0, h], [w, h], [w, 0.0], [0.0, 0.0]];

        let corners = self.side.unit_corners();
        Some(std::array::from_fn(|i| {
            let position: [f32; 3] =
                std::array::from_fn(|axis| (base[axis] + corners[i][axis] * extent[axis]) as f32);
            Vertex {
                position,
                tex_coords: tex_coords[i],
                tile_origin,
                shade,
            }
        }))
    }
}
