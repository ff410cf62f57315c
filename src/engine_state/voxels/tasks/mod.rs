//! # Voxel Task System
//!
//! Tasks related to voxel world generation. These run on the task manager's workers so
//! terrain generation never stalls a frame.

pub mod chunk_generation_task;
