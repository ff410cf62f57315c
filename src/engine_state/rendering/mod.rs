//! Rendering system for the voxel engine.
//!
//! This module contains the core rendering functionality, including meshing, pipeline
//! setup and the per-frame render pass. It provides a high-level interface for drawing
//! the voxel world with WebGPU.

use std::rc::Rc;

use image::RgbaImage;
use pipeline_manager::PipelineManager;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use crate::error::EngineResult;

use super::{buffer_state::BufferState, camera_state::Frustum, voxels::world::MeshUpdate};

mod bind_group_state;
pub mod meshing;
mod pipeline_manager;
pub mod tasks;
mod texture;
mod vertex;

// Re-export commonly used types
pub use vertex::Vertex;

/// Manages the entire rendering pipeline for the voxel engine.
///
/// This struct is the main entry point for all rendering operations.
/// It owns the WebGPU surface and the render pipeline, and shares the device and queue
/// with the buffer registry.
pub struct RenderManager {
    /// The WebGPU surface being rendered to
    pub surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    pub surface_config: SurfaceConfiguration,
    /// The WebGPU device used for creating GPU resources
    pub device: Rc<Device>,
    /// The WebGPU queue for submitting command buffers
    pub queue: Rc<Queue>,
    /// Manages the rendering pipeline and shaders
    pub pipeline_manager: PipelineManager,
}

impl RenderManager {
    /// Creates a new `RenderManager` instance.
    ///
    /// The camera uniform buffer must already exist in `buffer_state`.
    ///
    /// # Arguments
    /// * `surface` - The WebGPU surface to render to, already configured
    /// * `surface_config` - Configuration for the surface
    /// * `device`, `queue` - The opened GPU device
    /// * `buffer_state` - Buffer registry holding the camera uniform
    /// * `shader_string` - WGSL source code for the chunk shader
    /// * `atlas` - The block atlas image
    /// * `clear_color` - Background colour
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Rc<Device>,
        queue: Rc<Queue>,
        buffer_state: &BufferState,
        shader_string: &str,
        atlas: &RgbaImage,
        clear_color: wgpu::Color,
    ) -> EngineResult<Self> {
        let atlas_texture =
            texture::Texture::create_atlas_texture(&device, &queue, atlas, "Block Atlas");

        let pipeline_manager = PipelineManager::new(
            &device,
            &surface_config,
            buffer_state,
            atlas_texture,
            shader_string,
            clear_color,
        )?;

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
        })
    }

    /// Handles window resize events.
    ///
    /// Updates the surface configuration and recreates the depth texture. Zero-sized
    /// windows (minimised) are ignored.
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }

        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.pipeline_manager
            .resize(&self.device, &self.surface_config);
    }

    /// Uploads new chunk meshes and frees removed ones.
    pub fn apply_mesh_updates(&mut self, updates: Vec<MeshUpdate>, buffer_state: &mut BufferState) {
        self.pipeline_manager.apply_mesh_updates(updates, buffer_state);
    }

    /// Renders a new frame of every chunk inside `frustum`.
    pub fn render(&mut self, frustum: &Frustum) {
        self.pipeline_manager.render(
            &self.surface,
            &self.surface_config,
            &self.device,
            &self.queue,
            frustum,
        );
    }
}
