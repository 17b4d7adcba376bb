//! Input handling for the client.
//!
//! Converts platform key events to viewer actions and held camera moves.

use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

use yardview_core::{Action, Movement};

/// Key bound to each discrete action.
pub fn action_for_key(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Escape => Some(Action::Quit),
        KeyCode::KeyM => Some(Action::ResetCamera),
        KeyCode::Space => Some(Action::StartRoll),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Action::StartBounce),
        KeyCode::KeyS => Some(Action::StartSession),
        KeyCode::F1 => Some(Action::ToggleUi),
        _ => None,
    }
}

fn movement_for_key(key: KeyCode) -> Option<Movement> {
    match key {
        KeyCode::ArrowUp => Some(Movement::Forward),
        KeyCode::ArrowDown => Some(Movement::Backward),
        KeyCode::ArrowLeft => Some(Movement::Left),
        KeyCode::ArrowRight => Some(Movement::Right),
        _ => None,
    }
}

/// Tracks held movement keys and turns presses into actions.
#[derive(Debug, Default)]
pub struct InputHandler {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a key event. Returns the action for a fresh press, if any.
    pub fn process_key(
        &mut self,
        key: PhysicalKey,
        state: ElementState,
        repeat: bool,
    ) -> Option<Action> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        let pressed = state == ElementState::Pressed;

        if let Some(movement) = movement_for_key(code) {
            *self.held_mut(movement) = pressed;
            return None;
        }

        if pressed && !repeat {
            action_for_key(code)
        } else {
            None
        }
    }

    /// Movement keys currently held.
    pub fn held(&self) -> impl Iterator<Item = Movement> + '_ {
        [
            (self.forward, Movement::Forward),
            (self.backward, Movement::Backward),
            (self.left, Movement::Left),
            (self.right, Movement::Right),
        ]
        .into_iter()
        .filter_map(|(held, movement)| held.then_some(movement))
    }

    /// Release everything (e.g., on focus loss).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn held_mut(&mut self, movement: Movement) -> &mut bool {
        match movement {
            Movement::Forward => &mut self.forward,
            Movement::Backward => &mut self.backward,
            Movement::Left => &mut self.left,
            Movement::Right => &mut self.right,
        }
    }
}
