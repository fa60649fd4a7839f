//! Keyboard and touch input folded into `TickInput`
//!
//! The host forwards raw DOM-style events; the engine reads one `TickInput`
//! per frame. Dash and ultimate are pulses: they fire once per press.

use std::collections::BTreeSet;

use glam::Vec2;

use crate::sim::TickInput;

/// Virtual joystick travel in CSS pixels
pub const JOYSTICK_RADIUS: f32 = 60.0;

/// Touch buttons live right of this fraction of the screen width...
const BUTTON_MIN_X: f32 = 0.7;
/// ...and below this fraction of the height
const BUTTON_MIN_Y: f32 = 0.6;
/// Below this the button is ultimate, above it dash
const ULTIMATE_MIN_Y: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Dash,
    Ultimate,
}

impl Key {
    /// Map a `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Key> {
        match key.to_ascii_lowercase().as_str() {
            "w" | "arrowup" => Some(Key::Up),
            "s" | "arrowdown" => Some(Key::Down),
            "a" | "arrowleft" => Some(Key::Left),
            "d" | "arrowright" => Some(Key::Right),
            "shift" => Some(Key::Dash),
            " " | "spacebar" => Some(Key::Ultimate),
            _ => None,
        }
    }
}

/// The active joystick touch, for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joystick {
    pub touch_id: i32,
    pub center: Vec2,
    /// Knob position, clamped to the ring
    pub knob: Vec2,
    /// Output vector, magnitude <= 1
    pub vector: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct InputContext {
    held: BTreeSet<Key>,
    joystick: Option<Joystick>,
    dash_pulse: bool,
    ultimate_pulse: bool,
}

impl InputContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the key is one of ours (the host should then
    /// suppress the browser default, e.g. arrow-key scrolling)
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(key) = Key::from_dom(key) else {
            return false;
        };
        // Auto-repeat must not re-fire a pulse
        if self.held.insert(key) {
            match key {
                Key::Dash => self.dash_pulse = true,
                Key::Ultimate => self.ultimate_pulse = true,
                _ => {}
            }
        }
        true
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(key) = Key::from_dom(key) {
            self.held.remove(&key);
        }
    }

    /// Focus loss: forget everything held so the player doesn't keep walking
    pub fn release_all(&mut self) {
        self.held.clear();
        self.joystick = None;
    }

    /// A touch landed at `pos` on a `screen`-sized surface
    pub fn touch_start(&mut self, id: i32, pos: Vec2, screen: Vec2) {
        if !pos.is_finite() || !(screen.x > 0.0 && screen.y > 0.0) {
            return;
        }
        if pos.x < screen.x * 0.5 {
            self.joystick = Some(Joystick {
                touch_id: id,
                center: pos,
                knob: pos,
                vector: Vec2::ZERO,
            });
        }
        if pos.x > screen.x * BUTTON_MIN_X && pos.y > screen.y * BUTTON_MIN_Y {
            if pos.y > screen.y * ULTIMATE_MIN_Y {
                self.ultimate_pulse = true;
            } else {
                self.dash_pulse = true;
            }
        }
    }

    pub fn touch_move(&mut self, id: i32, pos: Vec2) {
        let Some(stick) = self.joystick.as_mut().filter(|s| s.touch_id == id) else {
            return;
        };
        if !pos.is_finite() {
            return;
        }
        let offset = pos - stick.center;
        let dist = offset.length();
        if dist <= 0.0 {
            return;
        }
        let dir = offset / dist;
        let reach = dist.min(JOYSTICK_RADIUS);
        stick.vector = dir * (reach / JOYSTICK_RADIUS);
        stick.knob = stick.center + dir * reach;
    }

    pub fn touch_end(&mut self, id: i32) {
        if self.joystick.is_some_and(|s| s.touch_id == id) {
            self.joystick = None;
        }
    }

    pub fn joystick(&self) -> Option<&Joystick> {
        self.joystick.as_ref()
    }

    /// Joystick first, then keyboard with the diagonal normalised
    pub fn movement(&self) -> Vec2 {
        if let Some(stick) = &self.joystick {
            return stick.vector;
        }
        let axis = |neg: Key, pos: Key| {
            self.held.contains(&pos) as i32 as f32 - self.held.contains(&neg) as i32 as f32
        };
        Vec2::new(axis(Key::Left, Key::Right), axis(Key::Up, Key::Down)).normalize_or_zero()
    }

    pub fn consume_dash(&mut self) -> bool {
        std::mem::take(&mut self.dash_pulse)
    }

    pub fn consume_ultimate(&mut self) -> bool {
        std::mem::take(&mut self.ultimate_pulse)
    }

    /// Snapshot for one engine frame; pulses are consumed
    pub fn take_tick_input(&mut self) -> TickInput {
        TickInput {
            movement: self.movement(),
            dash: self.consume_dash(),
            ultimate: self.consume_ultimate(),
        }
    }
}
