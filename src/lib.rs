//! Survivor Arena - a real-time survival action game core
//!
//! Core modules:
//! - `sim`: Simulation (entities, spawning, weapons, collisions, engine loop)
//! - `tuning`: Data-driven game balance (characters, enemies, weapons, upgrades)
//! - `platform`: Browser/native platform abstraction (input, viewport, wasm binding)
//! - `highscores`, `progression`, `settings`, `achievements`: data owned by the
//!   menu/storage layer that the core consumes or produces

pub mod achievements;
pub mod highscores;
pub mod platform;
pub mod progression;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;
pub use sim::{Engine, TickInput};
pub use tuning::Tuning;

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep when running in fixed-step mode
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame deltas above this are treated as a stall (tab hidden, debugger)
    pub const MAX_FRAME_DELTA: f32 = 0.1;
    /// Delta substituted for a stalled frame
    pub const STALLED_FRAME_DELTA: f32 = 0.016;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 4000.0;
    pub const WORLD_HEIGHT: f32 = 4000.0;
    /// Default viewport until the host reports a size
    pub const DEFAULT_VIEW_WIDTH: f32 = 1600.0;
    pub const DEFAULT_VIEW_HEIGHT: f32 = 900.0;

    /// Enemy population
    pub const MAX_ENEMIES: usize = 200;
    pub const SPAWN_CHECK_INTERVAL: f32 = 0.5;
    /// Distance outside the viewport edge where enemies appear
    pub const SPAWN_PADDING: f32 = 60.0;
    /// Slack around the viewport used for visibility tests
    pub const RENDER_BUFFER: f32 = 100.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const PLAYER_BASE_HP: f32 = 100.0;
    pub const PLAYER_BASE_SPEED: f32 = 150.0;
    pub const PLAYER_BASE_PICKUP_RANGE: f32 = 80.0;
    pub const PLAYER_MAX_SPEED: f32 = 400.0;
    /// Invulnerability window after taking a hit (seconds)
    pub const INVULN_DURATION: f32 = 0.5;
    pub const MAX_WEAPONS: usize = 6;

    /// Dash
    pub const DASH_DURATION: f32 = 0.2;
    pub const DASH_COOLDOWN: f32 = 3.0;
    pub const DASH_SPEED_MULT: f32 = 3.0;

    /// XP curve: floor(BASE * level^EXPONENT + level * LINEAR)
    pub const XP_BASE: f32 = 10.0;
    pub const XP_EXPONENT: f32 = 1.8;
    pub const XP_LINEAR: f32 = 5.0;

    /// Combo
    pub const COMBO_TIMEOUT: f32 = 2.0;
    pub const COMBO_STEP: f32 = 0.1;
    pub const COMBO_MAX_BONUS: f32 = 3.0;

    /// Ultimate
    pub const ULTIMATE_MAX: f32 = 100.0;
    pub const ULTIMATE_DURATION: f32 = 0.5;
    pub const ULTIMATE_DAMAGE: f32 = 80.0;
    pub const ULTIMATE_CHARGE_PER_KILL: f32 = 5.0;
    pub const ULTIMATE_CHARGE_PER_BOSS: f32 = 30.0;
    pub const ULTIMATE_CHARGE_ON_HIT: f32 = 10.0;

    /// Pickups
    pub const CRYSTAL_LIFETIME: f32 = 30.0;
    pub const CHEST_INTERVAL: f32 = 90.0;
    pub const CHEST_RADIUS: f32 = 20.0;
    pub const CHEST_GOLD: u32 = 500;
    pub const BOSS_WARNING_DURATION: f32 = 3.0;

    /// Cosmetic caps
    pub const MAX_PARTICLES: usize = 512;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp that never panics on an inverted range (min wins)
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// Angle (radians) of the vector from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle
#[inline]
pub fn from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Unit direction from `from` to `to`, or `None` when the points coincide.
///
/// Callers must treat `None` as "no movement this tick" so a NaN never reaches
/// an entity position.
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Option<Vec2> {
    let d = to - from;
    let len = d.length();
    if len > f32::EPSILON && len.is_finite() {
        Some(d / len)
    } else {
        None
    }
}

/// Uniform float in `[min, max)`; returns `min` for an empty range
#[inline]
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..max)
}

/// Pick an index with probability proportional to its weight.
///
/// Non-positive and non-finite weights are never chosen. Returns `None` when
/// nothing is selectable.
pub fn weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[f32]) -> Option<usize> {
    let total: f32 = weights
        .iter()
        .filter(|w| w.is_finite() && **w > 0.0)
        .sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.random::<f32>() * total;
    let mut last = None;
    for (i, &w) in weights.iter().enumerate() {
        if !(w.is_finite() && w > 0.0) {
            continue;
        }
        last = Some(i);
        roll -= w;
        if roll <= 0.0 {
            return Some(i);
        }
    }
    last
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{}:{:02}", total / 60, total % 60)
}
