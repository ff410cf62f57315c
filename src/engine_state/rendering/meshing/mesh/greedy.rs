//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent coplanar
//! faces with the same block type into larger quads, significantly reducing the number
//! of vertices needed to render a chunk.
//!
//! For every side and every slice of the chunk along that side's normal, a 16x16 mask
//! records which cells show a face and of which block type. The mask is then swept row
//! by row: each unclaimed cell grows as far as it can along `u`, then the whole run grows
//! along `v` while every cell of the next row matches.

use cgmath::Point3;

use super::{face::Face, neighborhood::ChunkNeighborhood};
use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::CHUNK_DIMENSION,
};

const DIM: usize = CHUNK_DIMENSION as usize;

type SliceMask = [[Option<BlockType>; DIM]; DIM];

/// Collects merged faces for every visible side of the center chunk.
pub fn greedy_faces(neighborhood: &ChunkNeighborhood) -> Vec<Face> {
    let mut faces = Vec::new();
    if neighborhood.center.is_empty() {
        return faces;
    }

    for side in BlockSide::all() {
        for slice in 0..CHUNK_DIMENSION {
            let mut mask = build_mask(neighborhood, side, slice);
            merge_mask(&mut mask, side, slice, &mut faces);
        }
    }

    faces
}

/// Chunk position of the cell at `(u, v)` within `slice` of `side`.
fn cell_position(side: BlockSide, slice: i32, u: usize, v: usize) -> Point3<i32> {
    let (u_axis, v_axis) = side.texture_axes();
    let mut position = [0i32; 3];
    position[side.normal_axis()] = slice;
    position[u_axis] = u as i32;
    position[v_axis] = v as i32;
    Point3::new(position[0], position[1], position[2])
}

fn build_mask(neighborhood: &ChunkNeighborhood, side: BlockSide, slice: i32) -> SliceMask {
    let mut mask = [[None; DIM]; DIM];
    for (v, row) in mask.iter_mut().enumerate() {
        for (u, cell) in row.iter_mut().enumerate() {
            let position = cell_position(side, slice, u, v);
            if !neighborhood.is_solid(position) {
                continue;
            }
            if neighborhood.is_face_visible(position, side) {
                *cell = Some(neighborhood.block_type_at(position));
            }
        }
    }
    mask
}

fn merge_mask(mask: &mut SliceMask, side: BlockSide, slice: i32, faces: &mut Vec<Face>) {
    for v in 0..DIM {
        let mut u = 0;
        while u < DIM {
            let Some(block_type) = mask[v][u] else {
                u += 1;
                continue;
            };

            let mut width = 1;
            while u + width < DIM && mask[v][u + width] == Some(block_type) {
                width += 1;
            }

            let mut height = 1;
            while v + height < DIM
                && mask[v + height][u..u + width]
                    .iter()
                    .all(|cell| *cell == Some(block_type))
            {
                height += 1;
            }

            for row in mask.iter_mut().skip(v).take(height) {
                for cell in row.iter_mut().skip(u).take(width) {
                    *cell = None;
                }
            }

            faces.push(Face {
                origin: cell_position(side, slice, u, v),
                side,
                width: width as u32,
                height: height as u32,
                block_type,
            });

            u += width;
        }
    }
}
