//! Kill-streak combo

use crate::consts::*;

/// Call-out shown when a streak crosses a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboCallout {
    pub text: &'static str,
    /// Display time in milliseconds
    pub duration_ms: u32,
}

const CALLOUTS: [(u32, ComboCallout); 4] = [
    (
        50,
        ComboCallout {
            text: "GODLIKE!",
            duration_ms: 2000,
        },
    ),
    (
        25,
        ComboCallout {
            text: "UNSTOPPABLE!",
            duration_ms: 2000,
        },
    ),
    (
        10,
        ComboCallout {
            text: "MEGA KILL!",
            duration_ms: 1500,
        },
    ),
    (
        5,
        ComboCallout {
            text: "KILLING SPREE!",
            duration_ms: 1000,
        },
    ),
];

#[derive(Debug, Clone, Default)]
pub struct Combo {
    pub count: u32,
    pub timer: f32,
    pub max_count: u32,
}

/// `1 + min(count * 0.1, 3.0)`
pub fn combo_multiplier(count: u32) -> f32 {
    1.0 + (count as f32 * COMBO_STEP).min(COMBO_MAX_BONUS)
}

impl Combo {
    pub fn multiplier(&self) -> f32 {
        combo_multiplier(self.count)
    }

    /// Count a kill and restart the timeout. Returns the call-out for the
    /// highest threshold the streak now meets.
    pub fn register_kill(&mut self) -> Option<ComboCallout> {
        self.count += 1;
        self.timer = COMBO_TIMEOUT;
        self.max_count = self.max_count.max(self.count);
        CALLOUTS
            .iter()
            .find(|(threshold, _)| self.count >= *threshold)
            .map(|(_, callout)| *callout)
    }

    /// Decay the timer; the streak drops to zero when it lapses
    pub fn update(&mut self, dt: f32) {
        if self.count == 0 {
            return;
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.timer = 0.0;
            self.count = 0;
        }
    }
}
