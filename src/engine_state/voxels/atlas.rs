//! # Texture Atlas
//!
//! Every block face samples from a single atlas texture split into a 16x16 grid of
//! tiles. This module owns the lookup from (block type, face) to a tile and the
//! conversion from a tile to a UV rectangle.
//!
//! Tiles are addressed with rows counted from the *bottom* of the image, so row 15 is
//! the top row of the PNG. UVs use wgpu's convention of `(0, 0)` at the top-left.
//!
//! When no atlas image is available, [`procedural_atlas`] paints a stand-in with the
//! same layout so the world remains readable.

use std::path::Path;

use image::{Rgba, RgbaImage};
use log::warn;

use crate::error::{EngineError, EngineResult};

use super::block::{block_side::BlockSide, block_type::BlockType};

/// Number of tiles along each edge of the atlas.
pub const ATLAS_TILES_PER_SIDE: u32 = 16;
/// Width or height of one tile in UV units.
pub const TILE_UV_SIZE: f32 = 1.0 / ATLAS_TILES_PER_SIDE as f32;
/// Tile edge length, in pixels, of the procedural atlas.
const PROCEDURAL_TILE_PIXELS: u32 = 16;

/// A tile of the atlas. `row` counts from the bottom of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasTile {
    pub column: u32,
    pub row: u32,
}

/// An axis-aligned rectangle in texture space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    /// Top-left corner
    pub min: [f32; 2],
    /// Bottom-right corner
    pub max: [f32; 2],
}

const DIRT: AtlasTile = AtlasTile::new(2, 15);
const GRASS_TOP: AtlasTile = AtlasTile::new(7, 13);
const GRASS_SIDE: AtlasTile = AtlasTile::new(3, 15);
const STONE: AtlasTile = AtlasTile::new(1, 15);

impl AtlasTile {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// UV rectangle covered by this tile.
    pub fn uv_rect(&self) -> UvRect {
        let u0 = self.column as f32 * TILE_UV_SIZE;
        let v0 = 1.0 - (self.row + 1) as f32 * TILE_UV_SIZE;
        UvRect {
            min: [u0, v0],
            max: [u0 + TILE_UV_SIZE, v0 + TILE_UV_SIZE],
        }
    }

    /// Top-left pixel of the tile in an image whose tiles are `tile_pixels` wide.
    pub fn pixel_origin(&self, tile_pixels: u32) -> (u32, u32) {
        (
            self.column * tile_pixels,
            (ATLAS_TILES_PER_SIDE - 1 - self.row) * tile_pixels,
        )
    }
}

/// Looks up the atlas tile drawn on `side` of a block of `block_type`.
///
/// # Returns
/// `None` for air, which has no faces
pub fn tile_for(block_type: BlockType, side: BlockSide) -> Option<AtlasTile> {
    match (block_type, side) {
        (BlockType::Air, _) => None,
        (BlockType::Dirt, _) => Some(DIRT),
        (BlockType::Grass, BlockSide::Top) => Some(GRASS_TOP),
        (BlockType::Grass, BlockSide::Bottom) => Some(DIRT),
        (BlockType::Grass, _) => Some(GRASS_SIDE),
        (BlockType::Stone, _) => Some(STONE),
    }
}

/// Loads the atlas image at `path`, falling back to [`procedural_atlas`] if the file
/// does not exist.
///
/// # Errors
/// Fails if the file exists but cannot be decoded, or if its dimensions cannot hold a
/// 16x16 tile grid.
pub fn load_atlas(path: &Path) -> EngineResult<RgbaImage> {
    if !path.exists() {
        warn!(
            "Texture atlas {} not found, using a procedural atlas",
            path.display()
        );
        return Ok(procedural_atlas());
    }

    let image = image::open(path)
        .map_err(|source| EngineError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    validate_atlas_shape(image.width(), image.height())?;
    Ok(image)
}

fn validate_atlas_shape(width: u32, height: u32) -> EngineResult<()> {
    if width != height || width == 0 || width % ATLAS_TILES_PER_SIDE != 0 {
        return Err(EngineError::AtlasShape { width, height });
    }
    Ok(())
}

/// Paints an atlas with flat, lightly speckled tiles at the positions the block table
/// uses. Every other tile is a magenta/black checker so a wrong lookup stands out.
pub fn procedural_atlas() -> RgbaImage {
    let side = ATLAS_TILES_PER_SIDE * PROCEDURAL_TILE_PIXELS;
    let mut atlas = RgbaImage::from_fn(side, side, |x, y| {
        let checker = ((x / 4) + (y / 4)) % 2 == 0;
        if checker {
            Rgba([255, 0, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    });

    let mut rng = fastrand::Rng::with_seed(0x5eed);
    paint_tile(&mut atlas, DIRT, [121, 85, 58], &mut rng);
    paint_tile(&mut atlas, STONE, [125, 125, 125], &mut rng);
    paint_tile(&mut atlas, GRASS_TOP, [95, 159, 53], &mut rng);
    paint_tile(&mut atlas, GRASS_SIDE, [121, 85, 58], &mut rng);

    // Grass side gets a green band along its top edge.
    let (x0, y0) = GRASS_SIDE.pixel_origin(PROCEDURAL_TILE_PIXELS);
    for y in 0..PROCEDURAL_TILE_PIXELS / 4 {
        for x in 0..PROCEDURAL_TILE_PIXELS {
            atlas.put_pixel(x0 + x, y0 + y, speckle([95, 159, 53], &mut rng));
        }
    }

    atlas
}

fn paint_tile(atlas: &mut RgbaImage, tile: AtlasTile, base: [u8; 3], rng: &mut fastrand::Rng) {
    let (x0, y0) = tile.pixel_origin(PROCEDURAL_TILE_PIXELS);
    for y in 0..PROCEDURAL_TILE_PIXELS {
        for x in 0..PROCEDURAL_TILE_PIXELS {
            atlas.put_pixel(x0 + x, y0 + y, speckle(base, rng));
        }
    }
}

fn speckle(base: [u8; 3], rng: &mut fastrand::Rng) -> Rgba<u8> {
    let offset = rng.i16(-12..=12);
    let [r, g, b] = base.map(|c| (c as i16 + offset).clamp(0, 255) as u8);
    Rgba([r, g, b, 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn grass_uses_three_tiles() {
        assert_eq!(tile_for(BlockType::Grass, BlockSide::Top), Some(AtlasTile::new(7, 13)));
        assert_eq!(tile_for(BlockType::Grass, BlockSide::Bottom), Some(AtlasTile::new(2, 15)));
        for side in [BlockSide::Front, BlockSide::Back, BlockSide::Left, BlockSide::Right] {
            assert_eq!(tile_for(BlockType::Grass, side), Some(AtlasTile::new(3, 15)));
        }
    }

    #[test]
    fn uniform_blocks_use_one_tile() {
        for side in BlockSide::all() {
            assert_eq!(tile_for(BlockType::Dirt, side), Some(AtlasTile::new(2, 15)));
            assert_eq!(tile_for(BlockType::Stone, side), Some(AtlasTile::new(1, 15)));
            assert_eq!(tile_for(BlockType::Air, side), None);
        }
    }

    #[test]
    fn rows_count_from_the_bottom() {
        let rect = AtlasTile::new(7, 13).uv_rect();
        assert!(approx(rect.min[0], 7.0 / 16.0));
        assert!(approx(rect.max[0], 8.0 / 16.0));
        assert!(approx(rect.min[1], 2.0 / 16.0));
        assert!(approx(rect.max[1], 3.0 / 16.0));

        let top_row = AtlasTile::new(0, 15).uv_rect();
        assert!(approx(top_row.min[1], 0.0));
        let bottom_row = AtlasTile::new(0, 0).uv_rect();
        assert!(approx(bottom_row.max[1], 1.0));
    }

    #[test]
    fn pixel_origin_matches_uv_rect() {
        let tile = AtlasTile::new(3, 15);
        assert_eq!(tile.pixel_origin(16), (48, 0));
        let rect = tile.uv_rect();
        assert!(approx(rect.min[0] * 256.0, 48.0));
        assert!(approx(rect.min[1] * 256.0, 0.0));
    }

    #[test]
    fn procedural_atlas_is_a_full_grid() {
        let atlas = procedural_atlas();
        assert_eq!(atlas.width(), 256);
        assert_eq!(atlas.height(), 256);
        assert!(validate_atlas_shape(atlas.width(), atlas.height()).is_ok());

        let (x, y) = STONE.pixel_origin(16);
        let pixel = atlas.get_pixel(x + 8, y + 8);
        assert!(pixel[0] > 100 && pixel[0] < 150);
    }

    #[test]
    fn rejects_atlases_that_do_not_split_into_tiles() {
        assert!(matches!(
            validate_atlas_shape(256, 128),
            Err(EngineError::AtlasShape { .. })
        ));
        assert!(matches!(
            validate_atlas_shape(100, 100),
            Err(EngineError::AtlasShape { .. })
        ));
    }

    #[test]
    fn missing_atlas_falls_back_to_procedural() {
        let atlas = load_atlas(Path::new("no/such/atlas.png")).unwrap();
        assert_eq!(atlas.dimensions(), (256, 256));
    }
}
