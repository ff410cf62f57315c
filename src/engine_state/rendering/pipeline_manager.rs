//! Manages the WebGPU render pass and associated rendering resources.
//!
//! This module is responsible for coordinating the rendering process by managing
//! the chunk renderer, shared resources, and the render pass configuration.
//!
//! # Resource Management
//!
//! The pipeline manager initializes and maintains shared resources:
//!
//! - Bind groups for the camera and the block atlas
//! - The depth texture
//! - The chunk renderer and its per-chunk buffers

use log::{trace, warn};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use crate::{
    engine_state::{
        buffer_state::BufferState, camera_state::Frustum, rendering::meshing::ChunkRenderer,
        voxels::world::MeshUpdate,
    },
    error::EngineResult,
};

use super::{bind_group_state::BindGroupState, texture};

/// Manages the WebGPU rendering process and associated rendering resources.
pub struct PipelineManager {
    /// Manages all bind groups used in the pipeline
    pub bind_group_state: BindGroupState,
    /// Depth texture used for depth testing
    pub depth_texture: texture::Texture,
    /// Renderer for chunk meshes
    pub chunk_renderer: ChunkRenderer,
    /// Colour the frame is cleared to
    clear_color: wgpu::Color,
}

impl PipelineManager {
    /// Creates a new `PipelineManager` instance.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - Surface configuration containing size and format
    /// * `buffer_state` - Buffer registry holding the camera uniform
    /// * `atlas` - The uploaded block atlas
    /// * `shader_string` - The WGSL shader source code for chunk rendering
    /// * `clear_color` - Background colour
    pub fn new(
        device: &Device,
        config: &SurfaceConfiguration,
        buffer_state: &BufferState,
        atlas: texture::Texture,
        shader_string: &str,
        clear_color: wgpu::Color,
    ) -> EngineResult<Self> {
        let bind_group_state = BindGroupState::new(device, buffer_state, atlas)?;

        let depth_texture =
            texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");

        let depth_stencil = Some(wgpu::DepthStencilState {
            format: texture::Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let chunk_renderer = ChunkRenderer::new(
            device,
            shader_string,
            config.format,
            &bind_group_state,
            depth_stencil,
        );

        Ok(Self {
            bind_group_state,
            depth_texture,
            chunk_renderer,
            clear_color,
        })
    }

    /// Hands mesh updates to the chunk renderer.
    pub fn apply_mesh_updates(&mut self, updates: Vec<MeshUpdate>, buffer_state: &mut BufferState) {
        self.chunk_renderer.apply_updates(updates, buffer_state);
    }

    /// Renders a frame to the given surface.
    ///
    /// This method handles the complete rendering pipeline execution for a single frame:
    /// 1. Acquires the next frame from the surface
    /// 2. Clears colour and depth
    /// 3. Draws the chunks inside the frustum
    /// 4. Submits commands to the GPU and presents the frame
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped; other
    /// acquisition failures also skip the frame.
    pub fn render(
        &mut self,
        surface: &Surface,
        surface_config: &SurfaceConfiguration,
        device: &Device,
        queue: &Queue,
        frustum: &Frustum,
    ) {
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                surface.configure(device, surface_config);
                return;
            }
            Err(err) => {
                warn!("Error getting current frame: {err}");
                return;
            }
        };

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        {
            let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Chunk Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let drawn = self
                .chunk_renderer
                .render(&mut rpass, &self.bind_group_state, frustum);
            trace!(
                "Drew {drawn} of {} chunks",
                self.chunk_renderer.chunk_count()
            );
        }

        queue.submit([encoder.finish()]);
        frame.present();
    }

    /// Handles window resize events by recreating the depth texture.
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
    }
}
