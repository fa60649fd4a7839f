//! Platform layer
//!
//! - `input`: keyboard/touch events folded into `TickInput` (all targets)
//! - `web`: `wasm-bindgen` handle for browser hosts (wasm32 only)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{InputContext, Joystick, Key};
