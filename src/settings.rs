//! User preferences
//!
//! Stored by the host next to the leaderboard. The engine reads them once at
//! run start.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
    /// Floating damage numbers over enemies
    pub show_damage_numbers: bool,
    /// On-screen joystick on touch devices
    pub show_joystick: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: 0.5,
            show_damage_numbers: true,
            show_joystick: true,
        }
    }
}

impl Settings {
    /// Volume clamped to the valid range; NaN counts as muted
    pub fn effective_volume(&self) -> f32 {
        if self.volume.is_nan() {
            0.0
        } else {
            self.volume.clamp(0.0, 1.0)
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.volume = self.effective_volume();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse stored settings, keeping defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.volume, 0.5);
        assert!(s.show_damage_numbers);
        assert!(s.show_joystick);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{"show_damage_numbers":false}"#).unwrap();
        assert!(!s.show_damage_numbers);
        assert_eq!(s.volume, 0.5);
    }

    #[test]
    fn test_volume_clamped() {
        let mut s = Settings::default();
        s.set_volume(3.0);
        assert_eq!(s.volume, 1.0);
        s.volume = f32::NAN;
        assert_eq!(s.effective_volume(), 0.0);
    }
}
