//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling
//! - Application lifecycle events
//! - State transitions between initialization and running states

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{GraphicsBuilder, GraphicsEvent, MaybeGraphics};
use input_manager::InputManager;
use log::{error, warn};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{config::EngineConfig, engine_state::EngineState, error::EngineError};

/// The main application state container that manages the application's lifecycle.
///
/// This struct holds the current state of the application, including graphics resources,
/// input handling, and window management. It implements `ApplicationHandler` to handle
/// window and device events.
pub struct ApplicationState {
    /// The graphics builder until the graphics have been handed to the engine
    pub graphics: MaybeGraphics,

    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,

    /// Runtime settings handed to the engine once graphics are ready
    config: EngineConfig,

    /// The error that stopped the event loop, if any
    exit_error: Option<EngineError>,
}

/// Represents the fully initialized and running state of the application.
///
/// This struct contains all the necessary components for the running application,
/// including the game engine state, window handle, and input management.
pub struct InitializedApplicationState {
    /// The core game engine state and logic
    pub engine_state: EngineState,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

impl ApplicationState {
    /// Creates the application; graphics are built on the first `resumed` event.
    pub fn new(event_loop_proxy: EventLoopProxy<GraphicsEvent>, config: EngineConfig) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(
                event_loop_proxy,
                config.clone(),
            )),
            state: None,
            config,
            exit_error: None,
        }
    }

    /// Takes the error that stopped the event loop, if any.
    pub fn take_exit_error(&mut self) -> Option<EngineError> {
        self.exit_error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        error!("{err}");
        self.exit_error = Some(err);
        event_loop.exit();
    }
}

/// Grabs and hides the cursor for mouse look, or releases and shows it.
fn set_cursor_captured(window: &Window, captured: bool) {
    let grab = if captured {
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };
    if let Err(err) = grab {
        warn!("Could not change cursor grab: {err}");
    }
    window.set_cursor_visible(!captured);
}

impl ApplicationHandler<GraphicsEvent> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        state.input_manager.intake_input(&event);

        let result = match event {
            WindowEvent::Resized(size) => state.engine_state.resize_surface(size),
            WindowEvent::Focused(false) => {
                state.input_manager.release_all();
                Ok(())
            }
            WindowEvent::RedrawRequested => {
                state.engine_state.render();
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            self.fail(event_loop, err);
        }
    }

    /// Handles device-level input events such as mouse motion.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Called when the application is resumed; builds the graphics on the first call.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    /// Receives the graphics initialization result and starts the engine.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: GraphicsEvent) {
        self.graphics = MaybeGraphics::Moved;

        let graphics = match graphics {
            Ok(graphics) => graphics,
            Err(err) => return self.fail(event_loop, err),
        };

        let window = graphics.window.clone();
        let engine_state = match EngineState::new(graphics, self.config.clone()) {
            Ok(engine_state) => engine_state,
            Err(err) => return self.fail(event_loop, err),
        };

        set_cursor_captured(&window, true);
        window.request_redraw();

        self.state = Some(InitializedApplicationState {
            engine_state,
            window,
            input_manager: InputManager::new(),
            last_wait_time: web_time::Instant::now(),
        });
    }

    /// Called before the event loop goes to sleep.
    ///
    /// This method handles frame timing, input processing, world streaming and task
    /// exchange, then requests the next frame.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };

        let now = web_time::Instant::now();
        let wait_dt = now - state.last_wait_time;
        state.last_wait_time = now;

        let was_paused = state.engine_state.is_paused();
        let processed_input = state.input_manager.get_and_reset_processed_input();
        state.engine_state.set_input_commands(processed_input);
        if state.engine_state.is_paused() != was_paused {
            set_cursor_captured(&state.window, !state.engine_state.is_paused());
        }

        if let Err(err) = state.engine_state.process_input(wait_dt) {
            return self.fail(event_loop, err);
        }

        state.engine_state.process_tasks();
        state.window.request_redraw();
    }
}
