//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Player input processing for camera control
//! - View frustum extraction for chunk culling
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `CameraController`: Handles player input and updates camera state
//! - `Projection`: Manages the camera's projection matrix
//! - `CameraUniform`: GPU representation of camera data for shaders
//! - `Frustum`: The visible volume, for skipping chunks off screen

use camera::{Camera, CameraController, CameraUniform, Projection};
use cgmath::{Deg, Point3};

use crate::{config::CameraConfig, error::EngineResult};

use super::{
    buffer_state::BufferState,
    voxels::{chunk::ChunkPosition, generation::TerrainGenerator},
    PlayerAction,
};

pub mod camera;
mod frustum;

pub use frustum::Frustum;

/// Name of the GPU buffer used for camera uniform data
pub const CAMERA_BUFFER_NAME: &str = "camera_buffer";

/// Lowest height the camera spawns at.
const MIN_SPAWN_HEIGHT: f32 = 25.0;

/// Manages the complete camera system including state, controls, and GPU resources.
///
/// This is the main interface for interacting with the camera system. It handles:
/// - Camera positioning and orientation
/// - Input processing
/// - GPU buffer updates
/// - Chunk-based position tracking
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// The perspective projection
    pub projection: Projection,
    /// GPU-optimized camera data for shaders
    pub camera_uniform: CameraUniform,
    /// Handles player input and camera movement
    pub camera_controller: CameraController,
}

impl CameraState {
    /// Creates the camera at `position` and its uniform buffer.
    ///
    /// # Arguments
    /// * `buffer_state` - Registry the camera uniform buffer is created in
    /// * `config` - Speed, sensitivity and projection settings
    /// * `position` - Spawn position
    /// * `width`, `height` - Initial viewport size in pixels
    pub fn new(
        buffer_state: &mut BufferState,
        config: &CameraConfig,
        position: Point3<f32>,
        width: u32,
        height: u32,
    ) -> Self {
        let camera = Camera::new(position, Deg(0.0), Deg(0.0));
        let projection = Projection::new(
            width,
            height,
            Deg(config.fov_degrees),
            config.znear,
            config.zfar,
        );
        let camera_controller = CameraController::new(config.speed, config.sensitivity);

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj_and_pos(&camera, &projection);

        buffer_state.create_buffer_init(
            CAMERA_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CAMERA_BUFFER_NAME),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        CameraState {
            camera,
            projection,
            camera_uniform,
            camera_controller,
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Applies pending movement and rewrites the camera uniform.
    ///
    /// # Returns
    /// - `Some(CameraUpdates)` if the camera position or orientation changed
    /// - `None` if no updates were needed
    pub fn update(
        &mut self,
        dt: web_time::Duration,
        buffer_state: &mut BufferState,
    ) -> EngineResult<Option<CameraUpdates>> {
        if !self.camera_controller.has_updates() {
            return Ok(None);
        }

        self.camera
            .get_controller_updates_and_reset_controller(&mut self.camera_controller, dt);
        self.write_uniform(buffer_state)?;

        Ok(Some(CameraUpdates {
            new_chunk_position: self.camera.chunk_position(),
        }))
    }

    /// Updates the projection for a new viewport size.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        buffer_state: &mut BufferState,
    ) -> EngineResult<()> {
        self.projection.resize(width, height);
        self.write_uniform(buffer_state)
    }

    /// The volume currently visible to the camera.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_proj(&self.camera_uniform.view_proj())
    }

    fn write_uniform(&mut self, buffer_state: &mut BufferState) -> EngineResult<()> {
        self.camera_uniform
            .update_view_proj_and_pos(&self.camera, &self.projection);
        buffer_state.write_buffer(
            CAMERA_BUFFER_NAME,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        )
    }
}

/// Represents updates to the camera's state that affect game world interaction.
///
/// This is returned by `CameraState::update()` when the camera's position or
/// orientation has changed.
pub struct CameraUpdates {
    /// The chunk the camera is now inside
    pub new_chunk_position: ChunkPosition,
}

/// Where the camera starts: above the column at the origin, clear of the terrain.
pub fn spawn_position(generator: &TerrainGenerator) -> Point3<f32> {
    let surface = generator.surface_height(0, 0) as f32;
    Point3::new(0.0, MIN_SPAWN_HEIGHT.max(surface + 2.0), 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::generation::GenerationMethod;

    #[test]
    fn spawn_clears_the_surface() {
        let low = TerrainGenerator::new(1, GenerationMethod::Flat { height: 4 }, 4);
        assert_eq!(spawn_position(&low), Point3::new(0.0, 25.0, 0.0));

        let high = TerrainGenerator::new(1, GenerationMethod::Flat { height: 40 }, 4);
        assert_eq!(spawn_position(&high), Point3::new(0.0, 42.0, 0.0));
    }

    #[test]
    fn spawn_is_above_generated_terrain() {
        let generator = TerrainGenerator::new(5, GenerationMethod::default(), 4);
        let spawn = spawn_position(&generator);
        assert!(spawn.y >= generator.surface_height(0, 0) as f32 + 2.0);
        assert!(spawn.y >= 25.0);
    }
}
