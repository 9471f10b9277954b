use glam::Vec2;
use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Input snapshot consumed by one physics tick. Movement is expressed in the
/// player's local frame: `x` strafes right, `y` moves forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub move_dir: Vec2,
    pub sprint_held: bool,
    pub jump_pressed: bool,
}

pub struct InputState {
    pressed_keys: HashSet<KeyCode>,
    mouse_delta: (f32, f32),
    jump_was_down: bool,
    pub cursor_grabbed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            mouse_delta: (0.0, 0.0),
            jump_was_down: false,
            cursor_grabbed: false,
        }
    }

    pub fn handle_key_press(&mut self, key: KeyCode) {
        self.pressed_keys.insert(key);
    }

    pub fn handle_key_release(&mut self, key: KeyCode) {
        self.pressed_keys.remove(&key);
    }

    pub fn handle_mouse_move(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    pub fn consume_mouse_delta(&mut self) -> (f32, f32) {
        let delta = self.mouse_delta;
        self.mouse_delta = (0.0, 0.0);
        delta
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Snapshot the current key state for one physics tick. Jump is
    /// edge-triggered: it reads true only on the first sample after the key
    /// went down.
    pub fn sample(&mut self) -> TickInput {
        let mut move_dir = Vec2::ZERO;
        if self.is_pressed(KeyCode::KeyW) {
            move_dir.y += 1.0;
        }
        if self.is_pressed(KeyCode::KeyS) {
            move_dir.y -= 1.0;
        }
        if self.is_pressed(KeyCode::KeyD) {
            move_dir.x += 1.0;
        }
        if self.is_pressed(KeyCode::KeyA) {
            move_dir.x -= 1.0;
        }
        let move_dir = move_dir.normalize_or_zero();

        let jump_down = self.is_pressed(KeyCode::Space);
        let jump_pressed = jump_down && !self.jump_was_down;
        self.jump_was_down = jump_down;

        TickInput {
            move_dir,
            sprint_held: self.is_pressed(KeyCode::ShiftLeft),
            jump_pressed,
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
