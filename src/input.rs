//! Keyboard, cursor and scroll state for the demo window.
//!
//! The `Input` struct tracks both instantaneous events (key just pressed) and
//! continuous state (key held down), plus the cursor position in normalized
//! device coordinates. [`Input::commands`] turns this frame's key presses into
//! demo [`Command`]s.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Keys the demo reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    F,
    M,
    Q,
    W,
    S,
    R,
    Escape,
    Other,
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::KeyF => KeyCode::F,
            WinitKeyCode::KeyM => KeyCode::M,
            WinitKeyCode::KeyQ => KeyCode::Q,
            WinitKeyCode::KeyW => KeyCode::W,
            WinitKeyCode::KeyS => KeyCode::S,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other,
        }
    }
}

/// Actions triggered from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleFullscreen,
    ToggleMirror,
    /// Re-centre the hand in depth.
    ResetDepth,
    Quit,
}

/// Input state for the current frame.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    /// Cursor position in pixels.
    cursor: Vec2,
    mouse_ndc: Vec2,
    scroll_delta: f32,
    window_size: (u32, u32),
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Was this key pressed this frame? Key repeat counts as a new press.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Cursor position in NDC, `(-1, -1)` bottom left to `(1, 1)` top right.
    pub fn mouse_ndc(&self) -> Vec2 {
        self.mouse_ndc
    }

    /// Scroll wheel lines this frame, positive away from the user.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Demo commands requested this frame.
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.key_pressed(KeyCode::Escape) || self.key_pressed(KeyCode::Q) {
            commands.push(Command::Quit);
        }
        if self.key_pressed(KeyCode::F) {
            commands.push(Command::ToggleFullscreen);
        }
        if self.key_pressed(KeyCode::M) {
            commands.push(Command::ToggleMirror);
        }
        if self.key_pressed(KeyCode::R) {
            commands.push(Command::ResetDepth);
        }
        commands
    }

    /// Clear per-frame events. Call after the frame has consumed them.
    pub(crate) fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.scroll_delta = 0.0;
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        self.update_ndc();
    }

    fn update_ndc(&mut self) {
        let (w, h) = self.window_size;
        if w > 0 && h > 0 {
            self.mouse_ndc = Vec2::new(
                (self.cursor.x / w as f32) * 2.0 - 1.0,
                1.0 - (self.cursor.y / h as f32) * 2.0, // Y flipped
            );
        }
    }

    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    let key = KeyCode::from(keycode);
                    match event.state {
                        ElementState::Pressed => {
                            self.keys_pressed.insert(key);
                            self.keys_held.insert(key);
                        }
                        ElementState::Released => {
                            self.keys_held.remove(&key);
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.update_ndc();
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => *y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }

            WindowEvent::Focused(false) => {
                self.keys_held.clear();
            }

            _ => {}
        }
    }
}
