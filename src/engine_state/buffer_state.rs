//! # Buffer State Module
//!
//! This module provides a centralized system for managing GPU buffers in the voxel engine.
//! It handles buffer creation, writing and analytics so GPU memory use stays visible.
//!
//! ## Key Features
//!
//! * Centralized buffer management with named references
//! * Per-chunk vertex and index buffers created from finished meshes
//! * Buffer usage analytics and memory tracking
//! * Bounds-checked buffer writes that report errors instead of panicking
//!
//! ## Architecture
//!
//! The `BufferState` struct serves as a registry for the long-lived GPU buffers used by
//! the engine (such as the camera uniform), referenced by static name. Chunk geometry
//! buffers are owned by the chunk renderer but created here so their memory shows up in
//! the same ledger. The bookkeeping itself lives in [`BufferLedger`], which never touches
//! the GPU.

use std::collections::HashMap;
use std::rc::Rc;

use log::info;
use wgpu::{util::DeviceExt, Buffer, Device, Queue};

use crate::{
    engine_state::{rendering::meshing::Mesh, voxels::chunk::ChunkPosition},
    error::{EngineError, EngineResult},
};

/// Analytics data for a GPU buffer
///
/// Tracks memory allocation, usage, and write operations for a buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    pub allocated_memory: u64,
    /// Highest byte written so far
    pub used_memory: u64,
    /// Number of times the buffer has been written to
    pub times_written: u64,
}

/// Memory bookkeeping for named buffers and chunk geometry.
#[derive(Debug, Default)]
pub struct BufferLedger {
    named: HashMap<&'static str, BufferAnalytics>,
    chunks: HashMap<ChunkPosition, u64>,
}

impl BufferLedger {
    /// Records a new named buffer, replacing any previous record under that name.
    pub fn register(&mut self, name: &'static str, allocated: u64, used: u64) {
        self.named.insert(
            name,
            BufferAnalytics {
                allocated_memory: allocated,
                used_memory: used,
                times_written: u64::from(used > 0),
            },
        );
    }

    /// Validates a write of `len` bytes at `offset` and records it.
    ///
    /// # Errors
    /// `UnknownBuffer` if `name` was never registered, `BufferOverflow` if the write
    /// would run past the end of the buffer. Nothing is recorded on error.
    pub fn record_write(&mut self, name: &'static str, offset: u64, len: u64) -> EngineResult<()> {
        let analytics = self
            .named
            .get_mut(name)
            .ok_or(EngineError::UnknownBuffer(name))?;

        let end = offset
            .checked_add(len)
            .filter(|end| *end <= analytics.allocated_memory)
            .ok_or(EngineError::BufferOverflow {
                name,
                offset,
                len,
                capacity: analytics.allocated_memory,
            })?;

        analytics.used_memory = analytics.used_memory.max(end);
        analytics.times_written += 1;
        Ok(())
    }

    /// Analytics of a named buffer.
    pub fn analytics(&self, name: &'static str) -> Option<BufferAnalytics> {
        self.named.get(name).copied()
    }

    /// Records the geometry bytes held for a chunk, replacing any previous record.
    pub fn record_chunk(&mut self, position: ChunkPosition, bytes: u64) {
        self.chunks.insert(position, bytes);
    }

    /// Forgets the geometry of a chunk.
    pub fn release_chunk(&mut self, position: ChunkPosition) {
        self.chunks.remove(&position);
    }

    /// Number of chunks with geometry on the GPU.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total allocated memory across named buffers and chunk geometry.
    pub fn total_allocated_memory(&self) -> u64 {
        self.named
            .values()
            .map(|analytics| analytics.allocated_memory)
            .chain(self.chunks.values().copied())
            .sum()
    }

    /// Total used memory across named buffers and chunk geometry.
    pub fn total_used_memory(&self) -> u64 {
        self.named
            .values()
            .map(|analytics| analytics.used_memory)
            .chain(self.chunks.values().copied())
            .sum()
    }
}

/// Vertex and index buffers holding the mesh of one chunk.
#[derive(Debug)]
pub struct ChunkBuffers {
    /// Vertex data
    pub vertex_buffer: Buffer,
    /// Index data (`u32`)
    pub index_buffer: Buffer,
    /// Number of indices to draw
    pub index_count: u32,
}

/// Central manager for GPU buffers in the voxel engine.
///
/// # Examples
///
/// ```ignore
/// let mut buffer_state = BufferState::new(device, queue);
///
/// buffer_state.create_buffer_init(
///     CAMERA_BUFFER,
///     wgpu::util::BufferInitDescriptor {
///         label: Some("Camera Buffer"),
///         contents: bytemuck::cast_slice(&[camera_uniform]),
///         usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
///     },
/// );
///
/// buffer_state.write_buffer(CAMERA_BUFFER, 0, bytemuck::cast_slice(&[camera_uniform]))?;
/// ```
pub struct BufferState {
    /// The GPU device buffers are created on
    device: Rc<Device>,
    /// The queue writes are submitted through
    queue: Rc<Queue>,
    /// Map of buffer names to buffer objects
    buffers: HashMap<&'static str, Buffer>,
    /// Memory bookkeeping
    ledger: BufferLedger,
}

impl BufferState {
    /// Creates a new buffer state manager with no buffers.
    pub fn new(device: Rc<Device>, queue: Rc<Queue>) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            ledger: BufferLedger::default(),
        }
    }

    /// Creates a buffer and initializes it with data.
    pub fn create_buffer_init(
        &mut self,
        buffer_name: &'static str,
        init_descriptor: wgpu::util::BufferInitDescriptor,
    ) {
        let size = init_descriptor.contents.len() as u64;
        let buffer = self.device.create_buffer_init(&init_descriptor);
        self.ledger.register(buffer_name, size, size);
        self.buffers.insert(buffer_name, buffer);
    }

    /// Writes raw byte data to a named buffer.
    ///
    /// # Errors
    /// Fails without writing if the buffer does not exist or the write would exceed its
    /// bounds.
    pub fn write_buffer(
        &mut self,
        buffer_name: &'static str,
        offset: wgpu::BufferAddress,
        data: &[u8],
    ) -> EngineResult<()> {
        let buffer = self
            .buffers
            .get(buffer_name)
            .ok_or(EngineError::UnknownBuffer(buffer_name))?;
        self.ledger
            .record_write(buffer_name, offset, data.len() as u64)?;
        self.queue.write_buffer(buffer, offset, data);
        Ok(())
    }

    /// Gets a reference to a buffer by name.
    pub fn get_buffer(&self, buffer_name: &'static str) -> EngineResult<&Buffer> {
        self.buffers
            .get(buffer_name)
            .ok_or(EngineError::UnknownBuffer(buffer_name))
    }

    /// Gets a binding resource for the entire buffer.
    pub fn get_entire_binding(
        &self,
        buffer_name: &'static str,
    ) -> EngineResult<wgpu::BindingResource<'_>> {
        Ok(self.get_buffer(buffer_name)?.as_entire_binding())
    }

    /// Uploads the mesh of a chunk into freshly allocated buffers.
    ///
    /// # Returns
    /// `None` for an empty mesh, which needs no buffers
    pub fn create_chunk_buffers(
        &mut self,
        position: ChunkPosition,
        mesh: &Mesh,
    ) -> Option<ChunkBuffers> {
        if mesh.is_empty() {
            self.ledger.release_chunk(position);
            return None;
        }

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Chunk Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Chunk Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        self.ledger
            .record_chunk(position, mesh.vertex_bytes() + mesh.index_bytes());
        Some(ChunkBuffers {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        })
    }

    /// Forgets the geometry of a chunk whose buffers were dropped.
    pub fn release_chunk_buffers(&mut self, position: ChunkPosition) {
        self.ledger.release_chunk(position);
    }

    /// The memory bookkeeping.
    pub fn ledger(&self) -> &BufferLedger {
        &self.ledger
    }

    /// Logs the memory held by all buffers.
    pub fn log_memory(&self) {
        info!(
            "GPU buffers: {} chunk meshes, {:.2} MiB allocated, {:.2} MiB used",
            self.ledger.chunk_count(),
            self.ledger.total_allocated_memory() as f64 / (1024.0 * 1024.0),
            self.ledger.total_used_memory() as f64 / (1024.0 * 1024.0),
        );
    }
}
