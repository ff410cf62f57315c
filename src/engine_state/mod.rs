//! # Engine State Module
//!
//! The core engine module that manages the state and functionality of the voxel engine.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `buffer_state` - Manages GPU buffers for rendering
//! * `camera_state` - Handles camera positioning and movement
//! * `rendering` - Contains meshing, the chunk pipeline and the render pass
//! * `task_management` - Runs chunk generation and meshing on worker threads
//! * `voxels` - Handles voxel data, chunks, and world streaming
//!
//! ## Architecture
//!
//! Each subsystem is responsible for a specific aspect of the engine. The `EngineState`
//! struct is the central coordinator: it owns every subsystem and passes them to one
//! another explicitly, so no subsystem holds a reference to another.

use std::rc::Rc;

use camera_state::{spawn_position, CameraState, CameraUpdates};
use frame_timer::FrameTimer;
use log::info;
use rendering::RenderManager;
use task_management::TaskManager;
use voxels::{chunk::ChunkPosition, generation::TerrainGenerator, world::WorldManager};
use winit::keyboard::KeyCode;

use crate::{
    application_state::{
        graphics_resources_builder::Graphics,
        input_state::ProcessedInputState,
    },
    config::EngineConfig,
    error::EngineResult,
};

pub mod buffer_state;
pub mod camera_state;
pub mod frame_timer;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel engine
///
/// This struct owns all major subsystems and coordinates their interactions. It
/// handles input processing, world streaming, task management and rendering.
///
/// # Examples
///
/// ```ignore
/// let mut engine_state = EngineState::new(graphics, config)?;
///
/// // Main game loop
/// loop {
///     engine_state.set_input_commands(processed_input);
///     engine_state.process_input(delta_time)?;
///     engine_state.process_tasks();
///     engine_state.render();
/// }
/// ```
pub struct EngineState {
    /// Runtime settings
    config: EngineConfig,
    /// Camera state managing position, orientation and movement
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// Buffer state for managing GPU buffers
    pub buffer_state: buffer_state::BufferState,
    /// Owns the surface and the render pipeline
    pub render_manager: RenderManager,
    /// Task manager for chunk generation and meshing
    pub task_manager: TaskManager,
    /// The voxel world containing all chunk data
    pub world: WorldManager,
    /// Current chunk position of the player
    current_player_chunk_position: ChunkPosition,
    /// Input is ignored and the cursor released while paused
    paused: bool,
    frame_timer: FrameTimer,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized
    ///
    /// Spawns the camera above the terrain at the origin and requests the initial world
    /// around it.
    ///
    /// # Arguments
    ///
    /// * `graphics` - The window surface, GPU device and loaded assets
    /// * `config` - Runtime settings
    pub fn new(graphics: Graphics, config: EngineConfig) -> EngineResult<Self> {
        let Graphics {
            surface,
            surface_config,
            device,
            queue,
            shader_source,
            atlas,
            ..
        } = graphics;

        let device = Rc::new(device);
        let queue = Rc::new(queue);
        let mut buffer_state = buffer_state::BufferState::new(device.clone(), queue.clone());

        let mut world = WorldManager::new(&config.world);
        let spawn = spawn_position(world.generator());
        info!("Spawning at ({:.1}, {:.1}, {:.1})", spawn.x, spawn.y, spawn.z);

        let camera_state = CameraState::new(
            &mut buffer_state,
            &config.camera,
            spawn,
            surface_config.width,
            surface_config.height,
        );

        let render_manager = RenderManager::new(
            surface,
            surface_config,
            device,
            queue,
            &buffer_state,
            &shader_source,
            &atlas,
            config.clear_color.into(),
        )?;

        let mut task_manager = TaskManager::new(config.worker_count());

        let current_player_chunk_position = camera_state.camera.chunk_position();
        world.generate_world(current_player_chunk_position, &mut task_manager);

        Ok(Self {
            config,
            camera_state,
            player_actions: PlayerAction::default(),
            buffer_state,
            render_manager,
            task_manager,
            world,
            current_player_chunk_position,
            paused: false,
            frame_timer: FrameTimer::new(web_time::Instant::now()),
        })
    }

    /// Whether input is currently ignored.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Resizes the rendering surface when the window size changes
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) -> EngineResult<()> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        self.render_manager.resize_surface(size);
        self.camera_state
            .resize(size.width, size.height, &mut self.buffer_state)
    }

    /// Uploads a capped number of finished meshes and renders the current frame
    pub fn render(&mut self) {
        let updates = self
            .world
            .drain_mesh_updates(self.config.world.max_uploads_per_frame);
        self.render_manager
            .apply_mesh_updates(updates, &mut self.buffer_state);

        self.render_manager.render(&self.camera_state.frustum());
        self.frame_timer.tick();
    }

    /// Streams the world around the camera and exchanges work with the task manager
    ///
    /// This method should be called each frame to ensure that chunk generation and
    /// meshing keep making progress.
    pub fn process_tasks(&mut self) {
        self.world
            .update(self.current_player_chunk_position, &mut self.task_manager);
        self.task_manager.process_completed_tasks(&mut self.world);
        self.task_manager.process_queued_tasks();
    }

    /// Applies the current player actions to the camera and the world
    ///
    /// # Arguments
    ///
    /// * `wait_duration` - The time elapsed since the last frame
    pub fn process_input(&mut self, wait_duration: web_time::Duration) -> EngineResult<()> {
        self.camera_state.intake_actions(&self.player_actions);

        if let Some(CameraUpdates { new_chunk_position }) = self
            .camera_state
            .update(wait_duration, &mut self.buffer_state)?
        {
            self.current_player_chunk_position = new_chunk_position;
        }

        if self.player_actions.regenerate_world {
            self.regenerate_world();
        }

        if self.player_actions.log_statistics {
            self.log_statistics();
        }

        Ok(())
    }

    /// Sets the input commands for the engine state.
    ///
    /// Escape toggles pause here so the caller can observe the change right away.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = translate_processed_input(&input, self.paused);
        if self.player_actions.toggle_pause {
            self.paused = !self.paused;
            info!("{}", if self.paused { "Paused" } else { "Resumed" });
        }
    }

    /// Throws the world away and rebuilds it with the next seed.
    fn regenerate_world(&mut self) {
        let current = self.world.generator();
        let generator = TerrainGenerator::new(
            current.seed().wrapping_add(1),
            current.method().clone(),
            self.config.world.height_chunks,
        );

        self.world.regenerate(generator);
        self.world
            .generate_world(self.current_player_chunk_position, &mut self.task_manager);
    }

    fn log_statistics(&self) {
        self.buffer_state.log_memory();
        let stats = self.world.stats();
        info!(
            "World: {} chunks loaded ({} generating, {} generated, {} meshing, {} meshed), {} mesh updates pending",
            stats.loaded(),
            stats.generating,
            stats.generated,
            stats.meshing,
            stats.meshed,
            stats.pending_updates,
        );
        info!(
            "Tasks: {} queued, {} workers, {} chunks drawn at most",
            self.task_manager.queued_len(),
            self.task_manager.worker_count(),
            self.render_manager.pipeline_manager.chunk_renderer.chunk_count(),
        );
    }
}

/// Translates the processed input state into player actions.
///
/// While paused only the pause toggle and the debug keys are honoured.
fn translate_processed_input(input: &ProcessedInputState, paused: bool) -> PlayerAction {
    let mut player_action = PlayerAction {
        toggle_pause: input.get_key_state(KeyCode::Escape).is_just_pressed(),
        regenerate_world: input.get_key_state(KeyCode::KeyR).is_just_pressed(),
        log_statistics: input.get_key_state(KeyCode::KeyI).is_just_pressed(),
        ..PlayerAction::default()
    };

    if paused {
        return player_action;
    }

    // Movement actions - active if key is pressed or held
    player_action.move_forward = input.get_key_state(KeyCode::KeyW).is_active();
    player_action.move_backward = input.get_key_state(KeyCode::KeyS).is_active();
    player_action.move_left = input.get_key_state(KeyCode::KeyA).is_active();
    player_action.move_right = input.get_key_state(KeyCode::KeyD).is_active();
    player_action.move_up = input.get_key_state(KeyCode::Space).is_active();
    player_action.move_down = input.get_key_state(KeyCode::ShiftLeft).is_active();
    player_action.rotate_view = input.get_mouse_delta();

    player_action
}

/// Represents player actions derived from input
///
/// This struct contains flags for the player actions that can be triggered by input,
/// such as movement, camera control, and debug actions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerAction {
    /// Movement actions - true if key is pressed or held
    move_forward: bool,
    move_backward: bool,
    move_left: bool,
    move_right: bool,
    move_up: bool,
    move_down: bool,

    /// View rotation - mouse movement since the last frame
    rotate_view: Option<(f64, f64)>,

    /// Actions that should only trigger on key press, not hold
    toggle_pause: bool,
    regenerate_world: bool,
    log_statistics: bool,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::application_state::input_state::RawInputState;

    fn input(keys: &[(KeyCode, RawInputState)], mouse_delta: Option<(f64, f64)>) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: keys.iter().copied().collect(),
            mouse_button_states: HashMap::new(),
            mouse_delta,
        }
    }

    #[test]
    fn held_keys_move_and_mouse_looks() {
        let actions = translate_processed_input(
            &input(
                &[
                    (KeyCode::KeyW, RawInputState::Held),
                    (KeyCode::Space, RawInputState::Pressed),
                    (KeyCode::KeyS, RawInputState::Released),
                ],
                Some((3.0, -2.0)),
            ),
            false,
        );

        assert!(actions.move_forward);
        assert!(actions.move_up);
        assert!(!actions.move_backward);
        assert_eq!(actions.rotate_view, Some((3.0, -2.0)));
        assert!(!actions.toggle_pause);
    }

    #[test]
    fn one_shot_actions_only_fire_on_press() {
        let pressed = translate_processed_input(
            &input(
                &[
                    (KeyCode::KeyR, RawInputState::Pressed),
                    (KeyCode::KeyI, RawInputState::Pressed),
                ],
                None,
            ),
            false,
        );
        assert!(pressed.regenerate_world);
        assert!(pressed.log_statistics);

        let held = translate_processed_input(
            &input(
                &[
                    (KeyCode::KeyR, RawInputState::Held),
                    (KeyCode::Escape, RawInputState::Held),
                ],
                None,
            ),
            false,
        );
        assert!(!held.regenerate_world);
        assert!(!held.toggle_pause);
    }

    #[test]
    fn paused_input_only_toggles_and_debugs() {
        let actions = translate_processed_input(
            &input(
                &[
                    (KeyCode::KeyW, RawInputState::Held),
                    (KeyCode::Escape, RawInputState::Pressed),
                    (KeyCode::KeyI, RawInputState::Pressed),
                ],
                Some((10.0, 10.0)),
            ),
            true,
        );

        assert!(!actions.move_forward);
        assert_eq!(actions.rotate_view, None);
        assert!(actions.toggle_pause);
        assert!(actions.log_statistics);
    }
}
