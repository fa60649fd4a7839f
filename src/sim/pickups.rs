//! XP crystals and treasure chests

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{clamp, direction_to, lerp};

/// Attraction speed at the edge of pickup range and at the player
pub const CRYSTAL_MIN_PULL: f32 = 200.0;
pub const CRYSTAL_MAX_PULL: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrystalTier {
    Small,
    Medium,
    Large,
}

impl CrystalTier {
    pub fn for_value(value: f32) -> Self {
        if value >= 20.0 {
            CrystalTier::Large
        } else if value >= 5.0 {
            CrystalTier::Medium
        } else {
            CrystalTier::Small
        }
    }
}

#[derive(Debug, Clone)]
pub struct XpCrystal {
    pub id: u32,
    pub pos: Vec2,
    pub value: f32,
    pub tier: CrystalTier,
    pub radius: f32,
    pub lifetime: f32,
    pub attracted: bool,
    /// Picked up this tick (by the player or the pet); grants XP
    pub collected: bool,
    /// Timed out; removed without granting XP
    pub expired: bool,
}

impl XpCrystal {
    pub fn new(id: u32, pos: Vec2, value: f32) -> Self {
        Self {
            id,
            pos,
            value,
            tier: CrystalTier::for_value(value),
            radius: clamp(5.0 + value * 0.5, 5.0, 15.0),
            lifetime: CRYSTAL_LIFETIME,
            attracted: false,
            collected: false,
            expired: false,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.collected && !self.expired
    }

    /// Age, attract and collect
    pub fn update(&mut self, dt: f32, player_pos: Vec2, player_radius: f32, pickup_range: f32) {
        if !self.is_live() {
            return;
        }
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.expired = true;
            return;
        }

        let dist = self.pos.distance(player_pos);
        if dist < pickup_range {
            self.attracted = true;
        }
        if self.attracted {
            if let Some(dir) = direction_to(self.pos, player_pos) {
                let t = if pickup_range > 0.0 { (1.0 - dist / pickup_range).max(0.0) } else { 1.0 };
                let step = (lerp(CRYSTAL_MIN_PULL, CRYSTAL_MAX_PULL, t) * dt).min(dist);
                self.pos += dir * step;
            }
        }
        if self.pos.distance(player_pos) < player_radius + self.radius {
            self.collected = true;
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreasureChest {
    pub id: u32,
    pub pos: Vec2,
    pub spawn_time: f32,
    pub collected: bool,
}

impl TreasureChest {
    pub fn new(id: u32, pos: Vec2, spawn_time: f32) -> Self {
        Self {
            id,
            pos,
            spawn_time,
            collected: false,
        }
    }

    /// Returns true on the tick the player touches it
    pub fn update(&mut self, player_pos: Vec2, player_radius: f32) -> bool {
        if self.collected {
            return false;
        }
        if self.pos.distance(player_pos) < CHEST_RADIUS + player_radius {
            self.collected = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_and_radius() {
        assert_eq!(CrystalTier::for_value(1.0), CrystalTier::Small);
        assert_eq!(CrystalTier::for_value(5.0), CrystalTier::Medium);
        assert_eq!(CrystalTier::for_value(25.0), CrystalTier::Large);
        assert_eq!(XpCrystal::new(1, Vec2::ZERO, 1.0).radius, 5.5);
        assert_eq!(XpCrystal::new(1, Vec2::ZERO, 100.0).radius, 15.0);
    }

    #[test]
    fn test_attracted_then_collected() {
        let mut c = XpCrystal::new(1, Vec2::new(60.0, 0.0), 1.0);
        c.update(0.05, Vec2::ZERO, 15.0, 80.0);
        assert!(c.attracted);
        assert!(c.pos.x < 60.0);
        for _ in 0..30 {
            c.update(1.0 / 60.0, Vec2::ZERO, 15.0, 80.0);
        }
        assert!(c.collected);
    }

    #[test]
    fn test_out_of_range_stays_put_and_expires() {
        let mut c = XpCrystal::new(1, Vec2::new(500.0, 0.0), 1.0);
        c.update(1.0, Vec2::ZERO, 15.0, 80.0);
        assert_eq!(c.pos, Vec2::new(500.0, 0.0));
        c.update(CRYSTAL_LIFETIME, Vec2::ZERO, 15.0, 80.0);
        assert!(c.expired);
        assert!(!c.collected);
    }

    #[test]
    fn test_chest_pickup_once() {
        let mut chest = TreasureChest::new(1, Vec2::new(30.0, 0.0), 90.0);
        assert!(chest.update(Vec2::ZERO, 15.0));
        assert!(!chest.update(Vec2::ZERO, 15.0));
    }
}
