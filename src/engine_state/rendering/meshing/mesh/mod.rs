//! Mesh generation for voxel rendering.
//!
//! This module converts chunk data into GPU-friendly meshes. Hidden faces (those
//! touching a solid cell, possibly in a neighbouring chunk) are never emitted. Visible
//! faces are either emitted one quad per block face or merged into larger quads by the
//! greedy mesher.
//!
//! # Architecture
//! - [`Mesh`]: The vertex and index lists of one chunk
//! - [`Face`]: A quad of one or more coplanar block faces
//! - [`ChunkNeighborhood`]: The chunk being meshed plus its six neighbours

mod culled;
mod face;
mod greedy;
#[allow(clippy::module_inception)]
mod mesh;
mod neighborhood;

pub use face::Face;
pub use mesh::Mesh;
pub use neighborhood::{ChunkNeighborhood, Neighbor};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cgmath::Point3;

    use super::*;
    use crate::engine_state::{
        rendering::meshing::MeshingStrategy,
        voxels::{
            atlas,
            block::{block_side::BlockSide, block_type::BlockType},
            chunk::Chunk,
            generation::{GenerationMethod, TerrainGenerator},
        },
    };

    const BOTH: [MeshingStrategy; 2] = [MeshingStrategy::Culled, MeshingStrategy::Greedy];

    fn chunk_with(position: Point3<i32>, blocks: &[((i32, i32, i32), BlockType)]) -> Arc<Chunk> {
        Arc::new(Chunk::from_fn(position, |p| {
            blocks
                .iter()
                .find(|((x, y, z), _)| (p.x, p.y, p.z) == (*x, *y, *z))
                .map(|(_, block_type)| *block_type)
                .unwrap_or(BlockType::Air)
        }))
    }

    fn isolated(chunk: Arc<Chunk>, strategy: MeshingStrategy) -> Mesh {
        Mesh::build(&ChunkNeighborhood::isolated(chunk), strategy)
    }

    #[test]
    fn single_block_has_six_faces() {
        let chunk = chunk_with(Point3::new(0, 0, 0), &[((4, 4, 4), BlockType::Dirt)]);
        for strategy in BOTH {
            let mesh = isolated(chunk.clone(), strategy);
            assert_eq!(mesh.face_count(), 6, "{strategy:?}");
            assert_eq!(mesh.vertices.len(), 24);
            assert_eq!(mesh.indices.len(), 36);
        }
    }

    #[test]
    fn indices_form_two_triangles_per_quad() {
        let chunk = chunk_with(Point3::new(0, 0, 0), &[((0, 0, 0), BlockType::Stone)]);
        let mesh = isolated(chunk, MeshingStrategy::Culled);
        assert_eq!(&mesh.indices[..12], &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(Mesh::generate_face_indices(3), [12, 13, 14, 12, 14, 15]);
    }

    #[test]
    fn shared_faces_between_blocks_are_hidden() {
        let chunk = chunk_with(
            Point3::new(0, 0, 0),
            &[((3, 3, 3), BlockType::Dirt), ((4, 3, 3), BlockType::Dirt)],
        );
        assert_eq!(isolated(chunk.clone(), MeshingStrategy::Culled).face_count(), 10);
        assert_eq!(isolated(chunk, MeshingStrategy::Greedy).face_count(), 6);
    }

    #[test]
    fn different_block_types_never_merge() {
        let chunk = chunk_with(
            Point3::new(0, 0, 0),
            &[((3, 3, 3), BlockType::Grass), ((4, 3, 3), BlockType::Dirt)],
        );
        assert_eq!(isolated(chunk, MeshingStrategy::Greedy).face_count(), 10);
    }

    #[test]
    fn full_chunk_only_shows_its_shell() {
        let chunk = Arc::new(Chunk::filled(Point3::new(0, 0, 0), BlockType::Stone));
        assert_eq!(
            isolated(chunk.clone(), MeshingStrategy::Culled).face_count(),
            6 * 16 * 16
        );
        assert_eq!(isolated(chunk.clone(), MeshingStrategy::Greedy).face_count(), 6);

        let buried = ChunkNeighborhood::new(chunk, std::array::from_fn(|_| Neighbor::Solid));
        for strategy in BOTH {
            assert!(Mesh::build(&buried, strategy).is_empty());
        }
    }

    #[test]
    fn faces_against_a_solid_neighbor_are_culled() {
        let center = chunk_with(Point3::new(0, 0, 0), &[((15, 5, 5), BlockType::Dirt)]);
        let right = chunk_with(Point3::new(1, 0, 0), &[((0, 5, 5), BlockType::Dirt)]);

        let mut neighbors: [Neighbor; 6] = std::array::from_fn(|_| Neighbor::Empty);
        neighbors[BlockSide::Right as usize] = Neighbor::Chunk(right);
        let neighborhood = ChunkNeighborhood::new(center, neighbors);

        for strategy in BOTH {
            let mesh = Mesh::build(&neighborhood, strategy);
            assert_eq!(mesh.face_count(), 5, "{strategy:?}");
        }
    }

    #[test]
    fn solid_floor_hides_bottom_faces() {
        let center = chunk_with(Point3::new(0, 0, 0), &[((2, 0, 2), BlockType::Stone)]);
        let mut neighbors: [Neighbor; 6] = std::array::from_fn(|_| Neighbor::Empty);
        neighbors[BlockSide::Bottom as usize] = Neighbor::Solid;
        let mesh = Mesh::build(&ChunkNeighborhood::new(center, neighbors), MeshingStrategy::Culled);
        assert_eq!(mesh.face_count(), 5);
        assert!(mesh.vertices.iter().all(|v| v.shade != BlockSide::Bottom.shade()));
    }

    #[test]
    fn slab_top_merges_into_one_quad() {
        let chunk = Arc::new(Chunk::from_fn(Point3::new(0, 0, 0), |p| {
            if p.y == 0 {
                BlockType::Grass
            } else {
                BlockType::Air
            }
        }));
        let mesh = isolated(chunk, MeshingStrategy::Greedy);
        assert_eq!(mesh.face_count(), 6);

        let top: Vec<_> = mesh
            .vertices
            .chunks(4)
            .filter(|quad| quad[0].shade == BlockSide::Top.shade())
            .collect();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0][0].tex_coords, [0.0, 16.0]);
        assert_eq!(top[0][2].tex_coords, [16.0, 0.0]);
        assert!(top[0].iter().all(|v| v.position[1] == 1.0));
    }

    #[test]
    fn vertices_are_in_world_space_with_atlas_tiles() {
        let chunk = chunk_with(Point3::new(1, 2, -1), &[((0, 0, 0), BlockType::Grass)]);
        let mesh = isolated(chunk, MeshingStrategy::Culled);

        let top = mesh
            .vertices
            .chunks(4)
            .find(|quad| quad[0].shade == BlockSide::Top.shade())
            .unwrap();
        let positions: Vec<_> = top.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                [16.0, 33.0, -16.0],
                [16.0, 33.0, -15.0],
                [17.0, 33.0, -15.0],
                [17.0, 33.0, -16.0],
            ]
        );
        let grass_top = atlas::tile_for(BlockType::Grass, BlockSide::Top)
            .unwrap()
            .uv_rect()
            .min;
        assert!(top.iter().all(|v| v.tile_origin == grass_top));
        assert_eq!(top[0].tex_coords, [0.0, 1.0]);
        assert_eq!(top[1].tex_coords, [1.0, 1.0]);
        assert_eq!(top[2].tex_coords, [1.0, 0.0]);
        assert_eq!(top[3].tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn greedy_covers_exactly_the_culled_faces() {
        let generator = TerrainGenerator::new(11, GenerationMethod::default(), 4);
        let chunk = Arc::new(generator.generate_chunk(Point3::new(0, 1, 0)));
        let neighborhood = ChunkNeighborhood::isolated(chunk);

        let culled = Mesh::build(&neighborhood, MeshingStrategy::Culled);
        let greedy = Mesh::build(&neighborhood, MeshingStrategy::Greedy);

        let area: f32 = greedy
            .vertices
            .chunks(4)
            .map(|quad| quad[2].tex_coords[0] * quad[0].tex_coords[1])
            .sum();
        assert_eq!(area as usize, culled.face_count());
        assert!(greedy.face_count() <= culled.face_count());
    }

    #[test]
    fn empty_chunk_has_empty_mesh() {
        let chunk = Arc::new(Chunk::empty(Point3::new(0, 0, 0)));
        for strategy in BOTH {
            assert!(isolated(chunk.clone(), strategy).is_empty());
        }
    }
}
