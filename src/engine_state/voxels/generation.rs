//! # Terrain Generation
//!
//! Procedural block data for chunks. A [`TerrainGenerator`] is immutable once built and
//! is shared between worker threads behind an `Arc`; generating the same chunk twice
//! with the same seed and method always yields the same blocks.
//!
//! Heightmap terrain is layered from the surface down: one block of grass, three blocks
//! of dirt, then stone to the bottom of the world. The world spans chunk rows
//! `0..world_height_chunks`; anything above or below is air.

use cgmath::EuclideanSpace;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::config::{bounded_chunk_count, MAX_HEIGHT_CHUNKS};

use super::{
    block::block_type::BlockType,
    chunk::{chunk_origin, Chunk, ChunkPosition, CHUNK_DIMENSION},
};

/// Depth of the dirt layer below the grass.
const DIRT_DEPTH: i32 = 3;
/// Cave noise above this value is carved out.
const CAVE_THRESHOLD: f64 = 0.45;
/// Scale applied to block coordinates when sampling cave noise.
const CAVE_SCALE: f64 = 0.06;

/// How chunks are filled with blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationMethod {
    /// Rolling hills from layered Perlin noise, optionally with caves.
    Terrain {
        /// Average surface height in blocks
        base_height: i32,
        /// Maximum distance of the surface from `base_height`
        amplitude: f64,
        /// Carve caves with 3D noise below the dirt layer
        caves: bool,
    },
    /// Grass, dirt and stone layered under a constant surface height.
    Flat {
        /// Surface height in blocks
        height: i32,
    },
    /// Alternating dirt and air cells.
    Checkerboard,
    /// Randomly placed dirt blocks.
    Scattered {
        /// Probability that a cell is solid, in `0.0..=1.0`
        density: f64,
    },
    /// No blocks at all.
    Empty,
}

impl Default for GenerationMethod {
    fn default() -> Self {
        GenerationMethod::Terrain {
            base_height: 24,
            amplitude: 12.0,
            caves: true,
        }
    }
}

/// One octave of a layered noise sum.
struct NoiseLayer {
    scale: f64,
    weight: f64,
}

const HEIGHT_LAYERS: [NoiseLayer; 4] = [
    NoiseLayer { scale: 0.006, weight: 1.5 },
    NoiseLayer { scale: 0.02, weight: 0.9 },
    NoiseLayer { scale: 0.07, weight: 0.25 },
    NoiseLayer { scale: 0.2, weight: 0.05 },
];

trait LayeredNoise {
    /// Weighted sum of the octaves, normalized back into `-1.0..=1.0`.
    fn get_layered(&self, layers: &[NoiseLayer], point: [f64; 2]) -> f64;
}

impl LayeredNoise for Perlin {
    fn get_layered(&self, layers: &[NoiseLayer], point: [f64; 2]) -> f64 {
        let total_weight: f64 = layers.iter().map(|layer| layer.weight).sum();
        let sum: f64 = layers
            .iter()
            .map(|layer| layer.weight * self.get([point[0] * layer.scale, point[1] * layer.scale]))
            .sum();
        sum / total_weight
    }
}

/// Produces the block data of chunks.
pub struct TerrainGenerator {
    seed: u32,
    method: GenerationMethod,
    world_height_chunks: i32,
    height_noise: Perlin,
    cave_noise: Perlin,
}

impl TerrainGenerator {
    /// Creates a generator for a world `world_height_chunks` chunks tall.
    ///
    /// Heights above [`MAX_HEIGHT_CHUNKS`] are clamped.
    pub fn new(seed: u32, method: GenerationMethod, world_height_chunks: u32) -> Self {
        TerrainGenerator {
            seed,
            method,
            world_height_chunks: bounded_chunk_count(world_height_chunks, MAX_HEIGHT_CHUNKS),
            height_noise: Perlin::new(seed),
            cave_noise: Perlin::new(seed.wrapping_add(1)),
        }
    }

    /// Seed every noise field is derived from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The configured generation method.
    pub fn method(&self) -> &GenerationMethod {
        &self.method
    }

    /// Number of chunk rows in the world.
    pub fn world_height_chunks(&self) -> i32 {
        self.world_height_chunks
    }

    /// Height of the world in blocks.
    pub fn world_height_blocks(&self) -> i32 {
        self.world_height_chunks * CHUNK_DIMENSION
    }

    /// `true` when chunk row `chunk_y` lies inside the world.
    pub fn contains_row(&self, chunk_y: i32) -> bool {
        (0..self.world_height_chunks).contains(&chunk_y)
    }

    /// Generates the chunk at `position`.
    pub fn generate_chunk(&self, position: ChunkPosition) -> Chunk {
        if !self.contains_row(position.y) {
            return Chunk::empty(position);
        }

        let origin = chunk_origin(position);
        match &self.method {
            GenerationMethod::Empty => Chunk::empty(position),
            GenerationMethod::Checkerboard => Chunk::from_fn(position, |local| {
                let world = origin + local.to_vec();
                if (world.x + world.y + world.z).rem_euclid(2) == 0 {
                    BlockType::Dirt
                } else {
                    BlockType::Air
                }
            }),
            GenerationMethod::Scattered { density } => {
                let mut rng = fastrand::Rng::with_seed(self.chunk_seed(position));
                Chunk::from_fn(position, |_| {
                    if rng.f64() < *density {
                        BlockType::Dirt
                    } else {
                        BlockType::Air
                    }
                })
            }
            GenerationMethod::Flat { .. } | GenerationMethod::Terrain { .. } => {
                let mut heights = [[0i32; CHUNK_DIMENSION as usize]; CHUNK_DIMENSION as usize];
                for (x, column) in heights.iter_mut().enumerate() {
                    for (z, height) in column.iter_mut().enumerate() {
                        *height = self.surface_height(origin.x + x as i32, origin.z + z as i32);
                    }
                }

                Chunk::from_fn(position, |local| {
                    let world = origin + local.to_vec();
                    let height = heights[local.x as usize][local.z as usize];
                    self.layered_block(world.x, world.y, world.z, height)
                })
            }
        }
    }

    /// World y of the top solid block of column `(x, z)`.
    ///
    /// Patterned methods report the top of the world and `Empty` reports `-1`.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let top = self.world_height_blocks() - 1;
        match &self.method {
            GenerationMethod::Terrain {
                base_height,
                amplitude,
                ..
            } => {
                let noise = self
                    .height_noise
                    .get_layered(&HEIGHT_LAYERS, [x as f64, z as f64]);
                let height = *base_height as f64 + noise * amplitude;
                (height.round() as i32).clamp(0, top)
            }
            GenerationMethod::Flat { height } => (*height).clamp(0, top),
            GenerationMethod::Checkerboard | GenerationMethod::Scattered { .. } => top,
            GenerationMethod::Empty => -1,
        }
    }

    fn layered_block(&self, x: i32, y: i32, z: i32, height: i32) -> BlockType {
        if y > height {
            BlockType::Air
        } else if y == height {
            BlockType::Grass
        } else if y >= height - DIRT_DEPTH {
            BlockType::Dirt
        } else if self.is_cave(x, y, z) {
            BlockType::Air
        } else {
            BlockType::Stone
        }
    }

    fn is_cave(&self, x: i32, y: i32, z: i32) -> bool {
        let GenerationMethod::Terrain { caves: true, .. } = self.method else {
            return false;
        };
        if y <= 0 {
            return false;
        }
        let sample = self.cave_noise.get([
            x as f64 * CAVE_SCALE,
            y as f64 * CAVE_SCALE,
            z as f64 * CAVE_SCALE,
        ]);
        sample > CAVE_THRESHOLD
    }

    fn chunk_seed(&self, position: ChunkPosition) -> u64 {
        let mut seed = self.seed as u64;
        for coordinate in [position.x, position.y, position.z] {
            seed = seed
                .wrapping_mul(0x9E37_79B9_7F4A_7C15)
                .wrapping_add(coordinate as u32 as u64);
        }
        seed
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;
    use crate::engine_state::voxels::chunk::{block_to_chunk, world_to_local};

    fn block_at(chunk: &Chunk, y: i32) -> BlockType {
        chunk.get_block_type_at(5, y.rem_euclid(CHUNK_DIMENSION), 5)
    }

    #[test]
    fn flat_terrain_is_layered() {
        let generator = TerrainGenerator::new(0, GenerationMethod::Flat { height: 10 }, 4);
        let chunk = generator.generate_chunk(Point3::new(0, 0, 0));

        assert_eq!(block_at(&chunk, 11), BlockType::Air);
        assert_eq!(block_at(&chunk, 10), BlockType::Grass);
        for y in 7..10 {
            assert_eq!(block_at(&chunk, y), BlockType::Dirt);
        }
        for y in 0..7 {
            assert_eq!(block_at(&chunk, y), BlockType::Stone);
        }
        assert_eq!(generator.surface_height(-100, 42), 10);
    }

    #[test]
    fn chunks_outside_the_world_are_empty() {
        let generator = TerrainGenerator::new(0, GenerationMethod::Flat { height: 10 }, 2);
        assert!(generator.generate_chunk(Point3::new(0, -1, 0)).is_empty());
        assert!(generator.generate_chunk(Point3::new(0, 2, 0)).is_empty());
        assert!(generator.generate_chunk(Point3::new(0, 1, 0)).is_empty());
        assert!(!generator.generate_chunk(Point3::new(0, 0, 0)).is_empty());
    }

    #[test]
    fn oversized_heights_are_clamped() {
        let generator =
            TerrainGenerator::new(0, GenerationMethod::Flat { height: i32::MAX }, 200_000_000);
        assert_eq!(generator.world_height_chunks(), MAX_HEIGHT_CHUNKS as i32);
        assert_eq!(
            generator.surface_height(0, 0),
            MAX_HEIGHT_CHUNKS as i32 * CHUNK_DIMENSION - 1
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let method = GenerationMethod::default();
        let a = TerrainGenerator::new(9, method.clone(), 4);
        let b = TerrainGenerator::new(9, method, 4);
        let position = Point3::new(3, 1, -2);

        let first = a.generate_chunk(position);
        let second = b.generate_chunk(position);
        assert_eq!(first.solid_array, second.solid_array);
        assert_eq!(first.blocks, second.blocks);
    }

    #[test]
    fn terrain_surface_is_grass() {
        let generator = TerrainGenerator::new(3, GenerationMethod::default(), 4);
        for (x, z) in [(0, 0), (17, -5), (-40, 33)] {
            let height = generator.surface_height(x, z);
            assert!((0..64).contains(&height));

            let chunk = generator.generate_chunk(block_to_chunk(x, height, z));
            let local = world_to_local(x, height, z);
            assert_eq!(
                chunk.get_block_type_at(local.x, local.y, local.z),
                BlockType::Grass
            );
        }
    }

    #[test]
    fn caves_never_reach_the_floor() {
        let generator = TerrainGenerator::new(
            1,
            GenerationMethod::Terrain {
                base_height: 40,
                amplitude: 4.0,
                caves: true,
            },
            4,
        );
        for cx in -2..2 {
            for cz in -2..2 {
                let chunk = generator.generate_chunk(Point3::new(cx, 0, cz));
                for x in 0..CHUNK_DIMENSION {
                    for z in 0..CHUNK_DIMENSION {
                        assert_eq!(chunk.get_block_type_at(x, 0, z), BlockType::Stone);
                    }
                }
            }
        }
    }

    #[test]
    fn checkerboard_alternates() {
        let generator = TerrainGenerator::new(0, GenerationMethod::Checkerboard, 1);
        let chunk = generator.generate_chunk(Point3::new(0, 0, 0));
        assert_eq!(chunk.solid_count(), 16 * 16 * 8);
        assert!(chunk.is_block_solid(0, 0, 0));
        assert!(!chunk.is_block_solid(1, 0, 0));
        assert!(chunk.is_block_solid(1, 1, 0));
    }

    #[test]
    fn scattered_density_bounds() {
        let none = TerrainGenerator::new(0, GenerationMethod::Scattered { density: 0.0 }, 1);
        let all = TerrainGenerator::new(0, GenerationMethod::Scattered { density: 1.0 }, 1);
        assert!(none.generate_chunk(Point3::new(0, 0, 0)).is_empty());
        assert!(all.generate_chunk(Point3::new(0, 0, 0)).is_full());

        let some = TerrainGenerator::new(5, GenerationMethod::Scattered { density: 0.2 }, 1);
        let a = some.generate_chunk(Point3::new(1, 0, 1));
        let b = some.generate_chunk(Point3::new(1, 0, 1));
        assert_eq!(a.blocks.len(), b.blocks.len());
        assert_eq!(a.solid_array, b.solid_array);
    }

    #[test]
    fn empty_method_has_no_surface() {
        let generator = TerrainGenerator::new(0, GenerationMethod::Empty, 4);
        assert_eq!(generator.surface_height(0, 0), -1);
        assert!(generator.generate_chunk(Point3::new(0, 0, 0)).is_empty());
    }
}
