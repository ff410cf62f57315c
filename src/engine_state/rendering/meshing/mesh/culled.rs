//! Naive face culling: one quad for every block face that touches a non-solid cell.

use cgmath::Point3;

use super::{face::Face, neighborhood::ChunkNeighborhood};
use crate::engine_state::voxels::block::block_side::BlockSide;

/// Collects one unit face per visible side of every solid block of the center chunk.
pub fn culled_faces(neighborhood: &ChunkNeighborhood) -> Vec<Face> {
    let mut faces = Vec::new();

    for (position, block) in neighborhood.center.iter_blocks() {
        let position = Point3::new(position.x as i32, position.y as i32, position.z as i32);
        let block_type = block.get_block_type();
        for side in BlockSide::all() {
            if neighborhood.is_face_visible(position, side) {
                faces.push(Face::unit(position, side, block_type));
            }
        }
    }

    faces
}
