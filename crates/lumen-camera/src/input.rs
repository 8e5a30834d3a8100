//! Frame-coherent keyboard and pointer state.
//!
//! Forward winit events during event collection, query during the frame,
//! then call `clear_transients` at the end of it. Physical key codes are
//! used so movement keys work the same on every keyboard layout.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Minimal description of a key event.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    pub repeat: bool,
}

impl RawKeyEvent {
    pub fn pressed(code: KeyCode) -> Self {
        Self {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        }
    }

    pub fn released(code: KeyCode) -> Self {
        Self {
            key: PhysicalKey::Code(code),
            state: ElementState::Released,
            repeat: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<PhysicalKey>,
    just_pressed: HashSet<PhysicalKey>,
    just_released: HashSet<PhysicalKey>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Repeat events are ignored.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                self.pressed.insert(event.key);
                self.just_pressed.insert(event.key);
            }
            ElementState::Released => {
                self.pressed.remove(&event.key);
                self.just_released.insert(event.key);
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&PhysicalKey::Code(code))
    }

    #[must_use]
    pub fn just_pressed(&self, code: KeyCode) -> bool {
        self.just_pressed.contains(&PhysicalKey::Code(code))
    }

    #[must_use]
    pub fn just_released(&self, code: KeyCode) -> bool {
        self.just_released.contains(&PhysicalKey::Code(code))
    }

    /// Forget held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.just_released.extend(self.pressed.drain());
    }

    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

/// Pointer lock, motion and wheel accumulated over one frame.
///
/// The pointer is locked while the right button is held; motion and wheel
/// input outside the lock are dropped.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    locked: bool,
    delta: Vec2,
    scroll: f32,
}

impl PointerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Right {
            self.set_locked(state == ElementState::Pressed);
        }
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if !locked {
            self.delta = Vec2::ZERO;
            self.scroll = 0.0;
        }
    }

    /// Raw device motion, in pixels.
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.locked {
            self.delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        if !self.locked {
            return;
        }
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            // ~40 pixels per line
            MouseScrollDelta::PixelDelta(pos) => (pos.y / 40.0) as f32,
        };
    }

    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Wheel lines this frame; positive is away from the user.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
    }
}
