//! # Voxel World
//!
//! Block definitions, chunk storage, procedural generation and the world manager that
//! streams chunks in and out around the camera.
//!
//! ## Data Flow
//!
//! 1. The world manager decides which chunks should exist around the camera
//! 2. Generation tasks fill chunks on worker threads
//! 3. Generated chunks with all six neighbours available are handed to the mesher
//! 4. Finished meshes are queued for upload to the renderer
//!
//! Chunks are immutable once generated and shared through `Arc`, so workers never need
//! a lock to read them.

pub mod atlas;
pub mod block;
pub mod chunk;
pub mod generation;
pub mod tasks;
pub mod world;
