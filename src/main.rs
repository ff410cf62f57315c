//! # Voxel World Entry Point
//!
//! Calls into the library's `run()` function to initialize and start the engine.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --release
//! ```

fn main() -> anyhow::Result<()> {
    voxel_world::run()
}
