//! Keyboard input tracking.

use std::collections::HashSet;

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Tracks the set of currently pressed keys.
///
/// Fed from the event loop and read each frame by camera controllers.
#[derive(Default)]
pub struct InputState {
    pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the state from a key event.
    pub fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed.insert(key);
            }
            ElementState::Released => {
                self.pressed.remove(&key);
            }
        }
    }

    /// Whether the given key is currently held down.
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Clear all pressed keys, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut input = InputState::new();
        assert!(!input.is_pressed(KeyCode::KeyW));

        input.handle_key(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.is_pressed(KeyCode::KeyW));

        input.handle_key(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_pressed(KeyCode::KeyW));
    }

    #[test]
    fn clear_drops_all_keys() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::KeyA, ElementState::Pressed);
        input.handle_key(KeyCode::KeyD, ElementState::Pressed);

        input.clear();

        assert!(!input.is_pressed(KeyCode::KeyA));
        assert!(!input.is_pressed(KeyCode::KeyD));
    }
}
