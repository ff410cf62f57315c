//! # Engine Configuration
//!
//! Runtime settings for the window, the world, the camera and asset locations.
//!
//! The configuration is read from a JSON file. Every field has a default, so a file only
//! needs to name the settings it changes, and a missing file means "all defaults":
//!
//! ```json
//! {
//!     "world": { "seed": 7, "render_distance": 8, "meshing": "culled" },
//!     "camera": { "speed": 20.0 }
//! }
//! ```
//!
//! The file is `config.json` in the working directory unless `VOXEL_WORLD_CONFIG` names
//! another path.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    engine_state::{rendering::meshing::MeshingStrategy, voxels::generation::GenerationMethod},
    error::{EngineError, EngineResult},
};

/// Environment variable that overrides the configuration file location
pub const CONFIG_PATH_ENV: &str = "VOXEL_WORLD_CONFIG";
/// Configuration file used when the environment variable is unset
pub const DEFAULT_CONFIG_PATH: &str = "config.json";
/// Largest accepted `world.render_distance`, in chunks
pub const MAX_RENDER_DISTANCE: u32 = 64;
/// Largest accepted `world.height_chunks`
pub const MAX_HEIGHT_CHUNKS: u32 = 64;

/// Converts a chunk count to the signed coordinate space, saturating at `max`.
pub(crate) fn bounded_chunk_count(count: u32, max: u32) -> i32 {
    i32::try_from(count.min(max)).unwrap_or(i32::MAX)
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Window creation settings
    pub window: WindowConfig,
    /// World generation and streaming settings
    pub world: WorldConfig,
    /// Camera movement and projection settings
    pub camera: CameraConfig,
    /// Asset file locations
    pub assets: AssetConfig,
    /// Number of worker threads; `None` picks one less than the available parallelism
    pub workers: Option<usize>,
    /// Background colour the frame is cleared to (RGBA)
    pub clear_color: ClearColor,
}

/// Window creation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial inner width in logical pixels
    pub width: u32,
    /// Initial inner height in logical pixels
    pub height: u32,
    /// Present with vertical sync (`Fifo`) instead of the lowest-latency mode
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("Voxel World"),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// World generation and streaming settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for every noise field and random pattern
    pub seed: u32,
    /// Horizontal radius, in chunks, of the visible area around the camera
    pub render_distance: u32,
    /// Number of chunks stacked vertically; the world spans `0..height_chunks`
    pub height_chunks: u32,
    /// Terrain shape
    pub generation: GenerationMethod,
    /// How block faces are turned into quads
    pub meshing: MeshingStrategy,
    /// Maximum chunk generation tasks requested per world update
    pub max_generation_requests_per_update: usize,
    /// Maximum chunk meshing tasks requested per world update
    pub max_mesh_requests_per_update: usize,
    /// Maximum chunk meshes uploaded to the GPU per frame
    pub max_uploads_per_frame: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            render_distance: 16,
            height_chunks: 4,
            generation: GenerationMethod::default(),
            meshing: MeshingStrategy::default(),
            max_generation_requests_per_update: 64,
            max_mesh_requests_per_update: 32,
            max_uploads_per_frame: 8,
        }
    }
}

/// Camera movement and projection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Movement speed in blocks per second
    pub speed: f32,
    /// Radians of rotation per pixel of mouse movement
    pub sensitivity: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub znear: f32,
    /// Far clipping plane distance
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            speed: 12.0,
            sensitivity: 0.003,
            fov_degrees: 70.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

/// Asset file locations, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// WGSL source for the chunk pipeline
    pub shader_path: PathBuf,
    /// PNG texture atlas; a procedural atlas is used when the file is missing
    pub atlas_path: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            shader_path: PathBuf::from("assets/shaders/voxel.wgsl"),
            atlas_path: PathBuf::from("assets/textures/atlas.png"),
        }
    }
}

/// An RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearColor(pub [f64; 4]);

impl Default for ClearColor {
    fn default() -> Self {
        Self([0.3, 0.3, 1.0, 1.0])
    }
}

impl From<ClearColor> for wgpu::Color {
    fn from(color: ClearColor) -> Self {
        let [r, g, b, a] = color.0;
        wgpu::Color { r, g, b, a }
    }
}

impl EngineConfig {
    /// Loads the configuration from the path in `VOXEL_WORLD_CONFIG`, or `config.json`.
    pub fn load() -> EngineResult<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    /// Loads and validates the configuration at `path`.
    ///
    /// A missing file is not an error: the defaults are returned instead.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, is not valid JSON, or
    /// fails [`EngineConfig::validate`].
    pub fn load_from(path: &Path) -> EngineResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("No configuration at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(EngineError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::from_json(&contents).map_err(|err| match err {
            EngineError::ConfigParse { source, .. } => EngineError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|source| EngineError::ConfigParse {
                path: PathBuf::new(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        let world = &self.world;
        if world.render_distance == 0 {
            return Err(EngineError::InvalidConfig(
                "world.render_distance must be at least 1".into(),
            ));
        }
        if world.render_distance > MAX_RENDER_DISTANCE {
            return Err(EngineError::InvalidConfig(format!(
                "world.render_distance must be at most {MAX_RENDER_DISTANCE}"
            )));
        }
        if world.height_chunks == 0 || world.height_chunks > MAX_HEIGHT_CHUNKS {
            return Err(EngineError::InvalidConfig(format!(
                "world.height_chunks must lie between 1 and {MAX_HEIGHT_CHUNKS}"
            )));
        }
        if let GenerationMethod::Scattered { density } = world.generation {
            if !(0.0..=1.0).contains(&density) {
                return Err(EngineError::InvalidConfig(
                    "world.generation.density must lie between 0 and 1".into(),
                ));
            }
        }
        if world.max_generation_requests_per_update == 0
            || world.max_mesh_requests_per_update == 0
            || world.max_uploads_per_frame == 0
        {
            return Err(EngineError::InvalidConfig(
                "per-update and per-frame limits must be at least 1".into(),
            ));
        }

        let camera = &self.camera;
        if camera.speed <= 0.0 || camera.sensitivity <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "camera.speed and camera.sensitivity must be positive".into(),
            ));
        }
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(EngineError::InvalidConfig(
                "camera.fov_degrees must lie between 0 and 180".into(),
            ));
        }
        if camera.znear <= 0.0 || camera.zfar <= camera.znear {
            return Err(EngineError::InvalidConfig(
                "camera planes must satisfy 0 < znear < zfar".into(),
            ));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(EngineError::InvalidConfig(
                "window dimensions must be non-zero".into(),
            ));
        }

        Ok(())
    }

    /// Number of worker threads to spawn for chunk generation and meshing.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1).max(1))
                .unwrap_or(2)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_world() {
        let config = EngineConfig::default();
        assert_eq!(config.world.render_distance, 16);
        assert_eq!(config.world.height_chunks, 4);
        assert_eq!(config.clear_color.0, [0.3, 0.3, 1.0, 1.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "world": { "seed": 42, "render_distance": 4 }, "workers": 3 }"#,
        )
        .unwrap();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.render_distance, 4);
        assert_eq!(config.world.height_chunks, 4);
        assert_eq!(config.worker_count(), 3);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn generation_and_meshing_are_tagged() {
        let config = EngineConfig::from_json(
            r#"{ "world": { "generation": { "type": "flat", "height": 10 }, "meshing": "culled" } }"#,
        )
        .unwrap();
        assert_eq!(config.world.generation, GenerationMethod::Flat { height: 10 });
        assert_eq!(config.world.meshing, MeshingStrategy::Culled);
    }

    #[test]
    fn rejects_zero_render_distance() {
        let err = EngineConfig::from_json(r#"{ "world": { "render_distance": 0 } }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_oversized_worlds() {
        for json in [
            r#"{ "world": { "render_distance": 46341 } }"#,
            r#"{ "world": { "height_chunks": 200000000 } }"#,
        ] {
            let err = EngineConfig::from_json(json).unwrap_err();
            assert!(matches!(err, EngineError::InvalidConfig(_)), "{json}");
        }

        let largest = format!(
            r#"{{ "world": {{ "render_distance": {MAX_RENDER_DISTANCE}, "height_chunks": {MAX_HEIGHT_CHUNKS} }} }}"#
        );
        assert!(EngineConfig::from_json(&largest).is_ok());
    }

    #[test]
    fn rejects_density_outside_unit_range() {
        let err = EngineConfig::from_json(
            r#"{ "world": { "generation": { "type": "scattered", "density": 1.5 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        assert!(EngineConfig::from_json(
            r#"{ "world": { "generation": { "type": "scattered", "density": 0.25 } } }"#,
        )
        .is_ok());
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let err = EngineConfig::from_json(r#"{ "camera": { "znear": 10.0, "zfar": 1.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = EngineConfig::from_json("{ world: ").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse { .. }));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config =
            EngineConfig::load_from(Path::new("this/path/does/not/exist.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
