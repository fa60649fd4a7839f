//! Playable character archetypes

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Base stats an archetype starts a run with (before permanent upgrades)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub max_hp: f32,
    pub speed: f32,
    pub armor: f32,
    pub hp_regen: f32,
    pub damage_mult: f32,
    pub cooldown_mult: f32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_hp: PLAYER_BASE_HP,
            speed: PLAYER_BASE_SPEED,
            armor: 0.0,
            hp_regen: 0.0,
            damage_mult: 1.0,
            cooldown_mult: 1.0,
        }
    }
}

impl BaseStats {
    /// Replace non-finite or non-positive core stats with the defaults
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let pick = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        Self {
            max_hp: pick(self.max_hp, d.max_hp),
            speed: pick(self.speed, d.speed),
            armor: if self.armor.is_finite() { self.armor.max(0.0) } else { 0.0 },
            hp_regen: if self.hp_regen.is_finite() { self.hp_regen.max(0.0) } else { 0.0 },
            damage_mult: pick(self.damage_mult, d.damage_mult),
            cooldown_mult: pick(self.cooldown_mult, d.cooldown_mult),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub stats: BaseStats,
    pub starting_weapon: String,
}

impl CharacterConfig {
    /// The archetype used when nothing else resolves
    pub fn fallback() -> Self {
        Self {
            id: "mage".into(),
            name: "Pyromancer".into(),
            description: "Balanced stats. Starts with Fireball.".into(),
            icon: "🧙".into(),
            stats: BaseStats::default(),
            starting_weapon: "fireball".into(),
        }
    }
}

pub fn default_characters() -> Vec<CharacterConfig> {
    vec![
        CharacterConfig::fallback(),
        CharacterConfig {
            id: "cleric".into(),
            name: "Cleric".into(),
            description: "High HP & Regen. Starts with Holy Beam.".into(),
            icon: "🧝".into(),
            stats: BaseStats {
                max_hp: 150.0,
                speed: 130.0,
                armor: 2.0,
                hp_regen: 0.5,
                damage_mult: 0.9,
                cooldown_mult: 1.0,
            },
            starting_weapon: "holy_beam".into(),
        },
    ]
}
