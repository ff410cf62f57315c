//! Manages WebGPU bind groups and their layouts.
//!
//! This module handles the creation of the bind groups the chunk shader reads: the
//! camera uniform at group 0 and the block atlas with its sampler at group 1.

use wgpu::{BindGroup, BindGroupLayout, Device};

use crate::{
    engine_state::{buffer_state::BufferState, camera_state::CAMERA_BUFFER_NAME},
    error::EngineResult,
};

use super::texture::Texture;

/// Name of the camera bind group
pub const CAMERA_BIND_GROUP: &str = "camera_bind_group";
/// Name of the camera bind group layout
pub const CAMERA_BIND_GROUP_LAYOUT: &str = "camera_bind_group_layout";
/// Name of the texture bind group
pub const TEXTURE_BIND_GROUP: &str = "texture_bind_group";
/// Name of the texture bind group layout
pub const TEXTURE_BIND_GROUP_LAYOUT: &str = "texture_bind_group_layout";

/// Holds the bind groups and layouts shared by the chunk pipeline.
pub struct BindGroupState {
    camera_bind_group: BindGroup,
    camera_bind_group_layout: BindGroupLayout,
    texture_bind_group: BindGroup,
    texture_bind_group_layout: BindGroupLayout,
    /// Kept alive for as long as the texture bind group references it
    _atlas: Texture,
}

impl BindGroupState {
    /// Creates the camera and atlas bind groups.
    ///
    /// The camera uniform buffer must already exist in `buffer_state`.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Buffer registry holding the camera uniform
    /// * `atlas` - The uploaded block atlas
    pub fn new(device: &Device, buffer_state: &BufferState, atlas: Texture) -> EngineResult<Self> {
        let (camera_bind_group, camera_bind_group_layout) =
            Self::generate_camera_bindgroups(device, buffer_state)?;
        let (texture_bind_group, texture_bind_group_layout) =
            Self::generate_texture_bindgroups(device, &atlas);

        Ok(Self {
            camera_bind_group,
            camera_bind_group_layout,
            texture_bind_group,
            texture_bind_group_layout,
            _atlas: atlas,
        })
    }

    /// The camera uniform bind group (group 0).
    pub fn camera_bind_group(&self) -> &BindGroup {
        &self.camera_bind_group
    }

    /// The atlas bind group (group 1).
    pub fn texture_bind_group(&self) -> &BindGroup {
        &self.texture_bind_group
    }

    /// Layouts in bind group order, for building a pipeline layout.
    pub fn layouts(&self) -> [&BindGroupLayout; 2] {
        [&self.camera_bind_group_layout, &self.texture_bind_group_layout]
    }

    /// Creates bind groups for camera uniforms.
    ///
    /// This sets up the bind group layout and bind group for camera uniforms
    /// that will be used in the vertex and fragment shaders.
    fn generate_camera_bindgroups(
        device: &Device,
        buffer_state: &BufferState,
    ) -> EngineResult<(BindGroup, BindGroupLayout)> {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some(CAMERA_BIND_GROUP_LAYOUT),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer_state.get_entire_binding(CAMERA_BUFFER_NAME)?,
            }],
            label: Some(CAMERA_BIND_GROUP),
        });

        Ok((camera_bind_group, camera_bind_group_layout))
    }

    /// Creates the bind group for the atlas texture and its sampler.
    fn generate_texture_bindgroups(device: &Device, atlas: &Texture) -> (BindGroup, BindGroupLayout) {
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        // This should match the filterable field of the corresponding Texture entry above.
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some(TEXTURE_BIND_GROUP_LAYOUT),
            });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
            label: Some(TEXTURE_BIND_GROUP),
        });

        (texture_bind_group, texture_bind_group_layout)
    }
}
