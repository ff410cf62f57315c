//! # Input Manager
//!
//! This module handles input processing for the application, including:
//! - Keyboard input state tracking
//! - Mouse input state tracking
//! - Input event processing
//! - Input state management

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{MouseInput, ProcessedInputState, RawInputState};

const KEY_CODES: [KeyCode; 9] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::KeyR,
    KeyCode::KeyI,
    KeyCode::Escape,
    KeyCode::Space,
    KeyCode::ShiftLeft,
];

const MOUSE_BUTTONS: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

/// Manages the state of all input devices and processes input events.
///
/// This struct maintains the current state of keyboard and mouse inputs
/// and provides methods to process input events from the windowing system.
#[derive(Debug)]
pub struct InputManager {
    /// Previous state of all tracked keyboard keys
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,

    /// Current state of mouse inputs
    pub mouse_inputs: MouseInput,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a new InputManager with every tracked key and button released.
    pub fn new() -> Self {
        let keyboard_inputs_old: HashMap<_, _> = KEY_CODES.iter().map(|key| (*key, false)).collect();
        let mouse_button_inputs_old: HashMap<_, _> =
            MOUSE_BUTTONS.iter().map(|button| (*button, false)).collect();

        Self {
            keyboard_inputs_new: keyboard_inputs_old.clone(),
            keyboard_inputs_old,
            mouse_inputs: MouseInput {
                mouse_button_inputs_new: mouse_button_inputs_old.clone(),
                mouse_button_inputs_old,
                mouse_delta: None,
            },
        }
    }

    /// Updates the old state with the current state to prepare for the next frame.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }

        for (button, new_state) in self.mouse_inputs.mouse_button_inputs_new.iter() {
            if let Some(old_state) = self.mouse_inputs.mouse_button_inputs_old.get_mut(button) {
                *old_state = *new_state;
            }
        }
    }

    /// Processes a window event and updates internal input state.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => self.intake_key(*key, *state == ElementState::Pressed),
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button_state) = self.mouse_inputs.mouse_button_inputs_new.get_mut(button) {
                    *button_state = *state == ElementState::Pressed;
                }
            }
            _ => {}
        }
    }

    /// Records the state of a key. Untracked keys are ignored.
    pub fn intake_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = pressed;
        }
    }

    /// Adds mouse movement to the delta of the current frame.
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_inputs.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_inputs.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Creates a processed input state from the current raw boolean states.
    ///
    /// This translates the raw boolean states into RawInputState enum values
    /// that represent the state transitions (pressed, held, released, not pressed).
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        let mouse_button_states = self
            .mouse_inputs
            .mouse_button_inputs_new
            .iter()
            .map(|(button, &new_state)| {
                let old_state = self
                    .mouse_inputs
                    .mouse_button_inputs_old
                    .get(button)
                    .copied()
                    .unwrap_or(false);
                (*button, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_button_states,
            mouse_delta: self.mouse_inputs.mouse_delta,
        }
    }

    /// Returns the processed input state and prepares for the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Rolls the current states into the previous ones and clears the mouse delta.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();
        self.mouse_inputs.mouse_delta = None;
    }

    /// Releases every key and button, as when the window loses focus.
    ///
    /// Keys held at that point report `Released` on the next frame instead of staying
    /// stuck down.
    pub fn release_all(&mut self) {
        self.keyboard_inputs_new.values_mut().for_each(|state| *state = false);
        self.mouse_inputs
            .mouse_button_inputs_new
            .values_mut()
            .for_each(|state| *state = false);
        self.mouse_inputs.mouse_delta = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_goes_through_press_hold_release() {
        let mut manager = InputManager::new();

        manager.intake_key(KeyCode::KeyW, true);
        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_key_state(KeyCode::KeyW), RawInputState::Pressed);

        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_key_state(KeyCode::KeyW), RawInputState::Held);

        manager.intake_key(KeyCode::KeyW, false);
        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_key_state(KeyCode::KeyW), RawInputState::Released);

        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_key_state(KeyCode::KeyW), RawInputState::NotPressed);
    }

    #[test]
    fn untracked_keys_are_ignored() {
        let mut manager = InputManager::new();
        manager.intake_key(KeyCode::KeyQ, true);
        assert!(!manager.keyboard_inputs_new.contains_key(&KeyCode::KeyQ));
    }

    #[test]
    fn mouse_motion_accumulates_within_a_frame() {
        let mut manager = InputManager::new();
        manager.intake_mouse_motion((2.0, 1.0));
        manager.intake_mouse_motion((3.0, -4.0));

        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_mouse_delta(), Some((5.0, -3.0)));
        assert_eq!(manager.get_and_reset_processed_input().get_mouse_delta(), None);
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut manager = InputManager::new();
        manager.intake_key(KeyCode::Space, true);
        manager.intake_mouse_motion((1.0, 1.0));
        manager.get_and_reset_processed_input();

        manager.release_all();
        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_key_state(KeyCode::Space), RawInputState::Released);
        assert_eq!(frame.get_mouse_delta(), None);
    }
}
