//! # Engine Errors
//!
//! Error types shared by the library half of the crate. Everything that can fail at
//! runtime (reading assets, parsing configuration, creating GPU resources) reports an
//! `EngineError`; the binary boundary wraps these in `anyhow` for context.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring, loading or running the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being read
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for `EngineConfig`
    #[error("failed to parse configuration {path}: {source}")]
    ConfigParse {
        /// The configuration file
        path: PathBuf,
        /// The underlying JSON error
        source: serde_json::Error,
    },

    /// The configuration parsed but holds unusable values
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The texture atlas image could not be decoded
    #[error("failed to decode atlas {path}: {source}")]
    Image {
        /// The atlas file
        path: PathBuf,
        /// The underlying decoder error
        source: image::ImageError,
    },

    /// The texture atlas cannot be split into a 16x16 tile grid
    #[error("atlas must be square with a side divisible by 16, got {width}x{height}")]
    AtlasShape {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },

    /// The window could not be created
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop could not be created or exited with an error
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The rendering surface could not be created
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// No adapter is compatible with the surface
    #[error("failed to find a graphics adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to open a device
    #[error("failed to open graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// The surface reports no usable texture format
    #[error("surface supports no texture formats on this adapter")]
    NoSurfaceFormat,

    /// A named GPU buffer does not exist
    #[error("unknown buffer '{0}'")]
    UnknownBuffer(&'static str),

    /// A write would run past the end of a GPU buffer
    #[error("write of {len} bytes at offset {offset} overflows buffer '{name}' ({capacity} bytes)")]
    BufferOverflow {
        /// The buffer being written
        name: &'static str,
        /// Byte offset of the write
        offset: u64,
        /// Length of the write in bytes
        len: u64,
        /// Allocated size of the buffer
        capacity: u64,
    },
}

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;
