//! Chunk renderer for the voxel engine.
//!
//! # Architecture
//!
//! The chunk renderer is responsible for:
//! 1. Creating and managing its own render pipeline
//! 2. Owning one vertex and index buffer pair per meshed chunk
//! 3. Issuing one indexed draw per chunk that intersects the view frustum

use std::collections::HashMap;

use cgmath::Point3;
use log::debug;
use wgpu::{Device, RenderPass, RenderPipeline, TextureFormat};

use crate::engine_state::{
    buffer_state::{BufferState, ChunkBuffers},
    camera_state::Frustum,
    rendering::{bind_group_state::BindGroupState, Vertex},
    voxels::{
        chunk::{chunk_origin, ChunkPosition, CHUNK_DIMENSION},
        world::MeshUpdate,
    },
};

/// Draws chunk meshes.
///
/// Buffers are keyed by chunk position; uploading a mesh for a chunk replaces the
/// buffers it had before.
pub struct ChunkRenderer {
    /// The WebGPU render pipeline for chunk rendering
    render_pipeline: RenderPipeline,
    /// GPU geometry of every chunk with a non-empty mesh
    chunk_buffers: HashMap<ChunkPosition, ChunkBuffers>,
}

impl ChunkRenderer {
    /// Creates a new `ChunkRenderer` instance.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `shader_string` - The WGSL shader source code
    /// * `texture_format` - The format of the surface being drawn to
    /// * `bind_group_state` - Provides the camera and atlas bind group layouts
    /// * `depth_stencil` - Depth test configuration
    pub fn new(
        device: &Device,
        shader_string: &str,
        texture_format: TextureFormat,
        bind_group_state: &BindGroupState,
        depth_stencil: Option<wgpu::DepthStencilState>,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chunk Render Pipeline Layout"),
            bind_group_layouts: &bind_group_state.layouts(),
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Chunk Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_string.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Chunk Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self {
            render_pipeline,
            chunk_buffers: HashMap::new(),
        }
    }

    /// Uploads new meshes and frees the buffers of removed chunks.
    pub fn apply_updates(&mut self, updates: Vec<MeshUpdate>, buffer_state: &mut BufferState) {
        if updates.is_empty() {
            return;
        }

        for update in updates {
            match update {
                MeshUpdate::Upload(position, mesh) => {
                    match buffer_state.create_chunk_buffers(position, &mesh) {
                        Some(buffers) => {
                            self.chunk_buffers.insert(position, buffers);
                        }
                        None => {
                            self.chunk_buffers.remove(&position);
                        }
                    }
                }
                MeshUpdate::Remove(position) => {
                    self.chunk_buffers.remove(&position);
                    buffer_state.release_chunk_buffers(position);
                }
            }
        }

        debug!("{} chunks with geometry on the GPU", self.chunk_buffers.len());
    }

    /// Number of chunks with geometry on the GPU.
    pub fn chunk_count(&self) -> usize {
        self.chunk_buffers.len()
    }

    /// Draws every chunk whose bounding box intersects `frustum`.
    ///
    /// # Returns
    /// The number of chunks drawn
    pub fn render(
        &self,
        render_pass: &mut RenderPass<'_>,
        bind_group_state: &BindGroupState,
        frustum: &Frustum,
    ) -> usize {
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, bind_group_state.camera_bind_group(), &[]);
        render_pass.set_bind_group(1, bind_group_state.texture_bind_group(), &[]);

        let mut drawn = 0;
        for (position, buffers) in &self.chunk_buffers {
            let (min, max) = chunk_bounds(*position);
            if !frustum.intersects_aabb(min, max) {
                continue;
            }

            render_pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
            render_pass.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..buffers.index_count, 0, 0..1);
            drawn += 1;
        }
        drawn
    }
}

/// World-space bounding box of a chunk.
pub fn chunk_bounds(position: ChunkPosition) -> (Point3<f32>, Point3<f32>) {
    let origin = chunk_origin(position);
    let min = Point3::new(origin.x as f32, origin.y as f32, origin.z as f32);
    let size = CHUNK_DIMENSION as f32;
    (min, Point3::new(min.x + size, min.y + size, min.z + size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_bounds_span_one_chunk() {
        let (min, max) = chunk_bounds(Point3::new(-1, 2, 0));
        assert_eq!(min, Point3::new(-16.0, 32.0, 0.0));
        assert_eq!(max, Point3::new(0.0, 48.0, 16.0));
    }
}
