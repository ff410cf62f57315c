#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A voxel world renderer built with Rust and WGPU.
//!
//! The world is made of 16x16x16 chunks generated procedurally from a seed, streamed in
//! and out around a free-flying camera, meshed on worker threads and drawn with a
//! single texture atlas.
//!
//! ## Key Modules
//!
//! * `application_state` - Manages the application lifecycle and window management
//! * `config` - Runtime settings loaded from JSON
//! * `engine_state` - The main engine components including rendering, voxels, and task management
//! * `error` - The error type shared by the library
//!
//! ## Usage
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     voxel_world::run()
//! }
//! ```

use anyhow::Context;
use application_state::ApplicationState;
use log::info;
use winit::event_loop::EventLoop;

pub mod application_state;
pub mod config;
pub mod engine_state;
pub mod error;

use config::EngineConfig;

/// Initializes logging, loads the configuration and runs the event loop until the window
/// closes.
///
/// # Errors
/// Fails if the configuration is invalid, if the window or GPU cannot be set up, or if
/// the engine stops with an error.
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = EngineConfig::load().context("failed to load configuration")?;

    let event_loop = EventLoop::with_user_event()
        .build()
        .context("failed to create the event loop")?;

    let mut state = ApplicationState::new(event_loop.create_proxy(), config);
    event_loop
        .run_app(&mut state)
        .context("event loop stopped unexpectedly")?;

    if let Some(err) = state.take_exit_error() {
        return Err(err).context("engine stopped");
    }

    info!("Goodbye");
    Ok(())
}
